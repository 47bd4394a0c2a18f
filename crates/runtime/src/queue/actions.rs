//! Logical execution order for one round.

use std::collections::BTreeMap;

use battle_core::{Action, TurnOrder, UnitId};

/// Forward cursor over the round's declared actions in turn order.
#[derive(Clone, Debug, Default)]
pub struct UnitActionQueue {
    entries: Vec<Action>,
    cursor: usize,
}

impl UnitActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the queue from the round's turn order.
    ///
    /// Units without a stored action are left out.
    pub fn initialize(&mut self, turn_order: &TurnOrder, actions: &BTreeMap<UnitId, Action>) {
        self.entries = turn_order
            .active()
            .iter()
            .filter_map(|id| actions.get(id).cloned())
            .collect();
        self.cursor = 0;
    }

    /// The action under the cursor, if any.
    pub fn next(&self) -> Option<&Action> {
        self.entries.get(self.cursor)
    }

    pub fn mark_current_processed(&mut self) {
        if self.cursor < self.entries.len() {
            self.cursor += 1;
        }
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn remaining(&self) -> usize {
        self.entries.len() - self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}
