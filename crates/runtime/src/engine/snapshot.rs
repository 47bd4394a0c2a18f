use battle_core::{Action, BattleResult, BattleUnit, TurnOrder, UnitId};
use serde::{Deserialize, Serialize};

use super::{BattlePhase, LogEntry};

/// Read-only copy of everything the engine knows about the battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub phase: BattlePhase,
    pub round: u32,
    pub seed: u64,
    pub units: Vec<BattleUnit>,
    /// Actions stored for the current round.
    pub actions: Vec<Action>,
    pub turn_order: TurnOrder,
    /// Units expected to act this round.
    pub active_units: Vec<UnitId>,
    /// Active units that have not declared an action yet.
    pub pending_units: Vec<UnitId>,
    pub log: Vec<LogEntry>,
    pub result: Option<BattleResult>,
}

impl BattleSnapshot {
    pub fn unit(&self, id: &UnitId) -> Option<&BattleUnit> {
        self.units.iter().find(|u| &u.id == id)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Summary of one `advance` call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvanceReport {
    /// Phase the call started in.
    pub from: BattlePhase,
    /// Phase the call stopped in.
    pub phase: BattlePhase,
    pub round: u32,
    /// Phase steps taken.
    pub steps: u32,
    /// Units whose actions are needed before the battle can continue.
    pub awaiting: Vec<UnitId>,
    pub result: Option<BattleResult>,
}

impl AdvanceReport {
    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }
}
