//! Battle event payloads.

use battle_core::{ActionKind, ActionOutcome, BattleResult, BuffId, SkillId, UnitId};
use serde::{Deserialize, Serialize};
use strum::EnumDiscriminants;

use crate::engine::BattlePhase;

/// Presentation event kinds the animation queue asks a presenter to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AnimationKind {
    Attack,
    Hit,
    Death,
    Skill,
    Heal,
    Defend,
}

/// Details a presenter needs to render one animation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimationData {
    #[default]
    None,
    Strike {
        target: UnitId,
    },
    Damage {
        source: UnitId,
        amount: u32,
        critical: bool,
        missed: bool,
    },
    Heal {
        source: UnitId,
        amount: u32,
    },
    Cast {
        skill_id: SkillId,
        targets: Vec<UnitId>,
    },
}

/// Everything the engine announces.
///
/// [`EventKind`] is the payload-free discriminant used for subscriptions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[strum_discriminants(name(EventKind), derive(Hash, strum::Display))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleEvent {
    BattleInitialized {
        players: Vec<UnitId>,
        enemies: Vec<UnitId>,
    },
    PhaseChanged {
        from: BattlePhase,
        to: BattlePhase,
        round: u32,
    },
    RoundStarted {
        round: u32,
        turn_order: Vec<UnitId>,
    },
    ActionSubmitted {
        round: u32,
        unit_id: UnitId,
        kind: ActionKind,
    },
    ActionExecuted {
        round: u32,
        outcome: ActionOutcome,
    },
    UnitDamaged {
        unit_id: UnitId,
        /// `None` for damage over time.
        source: Option<UnitId>,
        amount: u32,
        absorbed: u32,
        critical: bool,
        remaining_hp: u32,
    },
    UnitHealed {
        unit_id: UnitId,
        source: Option<UnitId>,
        amount: u32,
        current_hp: u32,
    },
    UnitDefeated {
        unit_id: UnitId,
    },
    BuffApplied {
        unit_id: UnitId,
        buff_id: BuffId,
        stacks: u32,
    },
    BuffRemoved {
        unit_id: UnitId,
        buff_id: BuffId,
    },
    BuffExpired {
        unit_id: UnitId,
        buff_id: BuffId,
    },
    AnimationStarted {
        anim_id: u64,
        kind: AnimationKind,
        unit_id: UnitId,
        duration_ms: u64,
        delay_ms: u64,
        data: AnimationData,
    },
    AnimationCompleted {
        anim_id: u64,
    },
    RoundEnded {
        round: u32,
    },
    BattleCompleted {
        result: BattleResult,
    },
    EngineFailed {
        message: String,
    },
}

impl BattleEvent {
    pub fn kind(&self) -> EventKind {
        EventKind::from(self)
    }

    /// Key identifying near-duplicate emissions, for event kinds that are
    /// only meaningful once per occurrence.
    pub fn dedup_key(&self) -> Option<String> {
        match self {
            BattleEvent::BattleInitialized { players, enemies } => Some(format!(
                "init:{}|{}",
                join(players),
                join(enemies)
            )),
            BattleEvent::PhaseChanged { from, to, round } => {
                Some(format!("phase:{from}:{to}:{round}"))
            }
            BattleEvent::RoundStarted { round, .. } => Some(format!("round:{round}")),
            BattleEvent::ActionSubmitted { round, unit_id, .. } => {
                Some(format!("submit:{round}:{unit_id}"))
            }
            BattleEvent::AnimationStarted { anim_id, .. } => Some(format!("anim:{anim_id}")),
            BattleEvent::AnimationCompleted { anim_id } => Some(format!("anim_done:{anim_id}")),
            _ => None,
        }
    }
}

fn join(ids: &[UnitId]) -> String {
    ids.iter().map(UnitId::as_str).collect::<Vec<_>>().join(",")
}

/// An emitted event with its bus-assigned id and timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub timestamp_ms: u64,
    pub payload: BattleEvent,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}
