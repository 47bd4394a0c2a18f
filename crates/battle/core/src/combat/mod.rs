//! Combat math: damage, healing and hit application.
//!
//! Formulas are pure functions over unit snapshots; [`strike`] is the only
//! entry point that mutates units, and it works on a roster draft owned by the
//! caller.

mod damage;
mod heal;
mod hit;

pub use damage::{
    DamageInput, DamageRoll, DamageType, base_damage, calculate_damage, defense_reduction_ratio,
    pre_random_damage,
};
pub use heal::heal_amount;
pub use hit::{DamageTaken, StrikeResult, hit_chance, strike, take_damage};

use crate::error::{BattleError, ErrorSeverity};
use crate::state::{BuffId, SkillId, UnitId};

/// Content or roster lookups that failed while resolving an action.
///
/// These indicate a bug or inconsistent content: actions are validated before
/// they reach resolution.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    #[error("unit {0} is not part of this battle")]
    UnitNotFound(UnitId),

    #[error("skill {0} is not defined")]
    UnknownSkill(SkillId),

    #[error("skill action of {0} names no skill")]
    MissingSkill(UnitId),

    #[error("buff {0} is not defined")]
    UnknownBuff(BuffId),
}

impl BattleError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            CombatError::UnitNotFound(_) => "COMBAT_UNIT_NOT_FOUND",
            CombatError::UnknownSkill(_) => "COMBAT_UNKNOWN_SKILL",
            CombatError::MissingSkill(_) => "COMBAT_MISSING_SKILL",
            CombatError::UnknownBuff(_) => "COMBAT_UNKNOWN_BUFF",
        }
    }
}
