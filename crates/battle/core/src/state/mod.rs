//! Battle state: units, grids, status effects, actions and results.
//!
//! Everything here is plain data plus invariant-preserving helpers. Rules that
//! read or change this data live in [`combat`](crate::combat),
//! [`buff`](crate::buff) and [`skill`](crate::skill).

mod action;
mod grid;
mod ids;
mod result;
mod roster;
mod stats;
mod status;
mod unit;

pub use action::{
    Action, ActionKind, ActionOutcome, BuffChange, HealRecord, HitRecord, SkipReason,
};
pub use grid::{Formation, GridCell, GridPosition, Team};
pub use ids::{BuffId, SkillId, UnitId};
pub use result::{
    BattleResult, EndReason, LevelScaledRewards, ResultKind, RewardPolicy, Rewards, decide_outcome,
};
pub use roster::{BattleSetup, Roster, SetupError};
pub use stats::{StatKind, Stats};
pub use status::{
    BuffCategory, ControlFlags, EffectType, MAX_STATUS_EFFECTS, PERMANENT, StackPolicy,
    StatusEffect, StatusEffects,
};
pub use unit::{BattleUnit, UnitSpec};
