use std::collections::BTreeMap;

use battle_core::{Action, ActionOutcome, TurnOrder, UnitId};
use tracing::trace;

use super::{AnimationPlayQueue, PlayReport, UnitActionQueue};
use crate::config::AnimationTimings;
use crate::events::EventBus;

/// Couples the logical action queue with the animation queue.
///
/// Each step resolves one action through the caller's callback, then plays
/// the resulting animation sequence before the next action is touched.
#[derive(Debug)]
pub struct BattleQueueManager {
    actions: UnitActionQueue,
    animations: AnimationPlayQueue,
    last_report: PlayReport,
}

impl BattleQueueManager {
    pub fn new(timings: AnimationTimings) -> Self {
        Self {
            actions: UnitActionQueue::new(),
            animations: AnimationPlayQueue::new(timings),
            last_report: PlayReport::default(),
        }
    }

    pub fn load_round(&mut self, turn_order: &TurnOrder, actions: &BTreeMap<UnitId, Action>) {
        self.actions.initialize(turn_order, actions);
    }

    pub fn has_next(&self) -> bool {
        self.actions.has_next()
    }

    pub fn actions(&self) -> &UnitActionQueue {
        &self.actions
    }

    pub fn last_report(&self) -> PlayReport {
        self.last_report
    }

    /// Runs the next queued action.
    ///
    /// `process` resolves the action and commits its effects; its outcome is
    /// animated and awaited. Returns whether more actions remain. A failing
    /// `process` leaves the cursor on the failed action.
    pub async fn execute_next<F, E>(&mut self, bus: &EventBus, process: F) -> Result<bool, E>
    where
        F: FnOnce(&Action) -> Result<ActionOutcome, E>,
    {
        let Some(action) = self.actions.next() else {
            return Ok(false);
        };
        let outcome = process(action)?;

        let sequence = self.animations.generate_sequence(&outcome);
        trace!(
            target: "battle::queue",
            unit = %outcome.unit_id,
            steps = sequence.len(),
            "playing animation sequence"
        );
        self.animations.enqueue(sequence);
        self.last_report = self.animations.play_all(bus).await;

        self.actions.mark_current_processed();
        Ok(self.actions.has_next())
    }

    /// Drops any remaining actions, e.g. when a side is wiped mid-round.
    pub fn abort_round(&mut self) {
        self.actions.clear();
    }
}
