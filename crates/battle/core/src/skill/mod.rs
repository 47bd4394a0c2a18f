//! Skills: area expansion, targeting rules and the execution pipeline.

mod area;
mod execute;
mod targeting;

pub use area::{AreaCells, expand_area};
pub use execute::{check_castable, execute_skill};
pub(crate) use execute::record_strike;
pub use targeting::{
    TargetError, in_range, resolve_skill_targets, valid_attack_targets, valid_skill_targets,
    validate_attack_target, validate_skill_target,
};

use crate::combat::CombatError;
use crate::error::{BattleError, ErrorSeverity};
use crate::state::{SkillId, UnitId};

/// Why a skill cast was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SkillError {
    #[error("unit {unit} does not know skill {skill}")]
    NotKnown { unit: UnitId, skill: SkillId },

    #[error("unit {0} is silenced")]
    Silenced(UnitId),

    #[error("insufficient MP: need {required}, have {available}")]
    InsufficientMp { required: u32, available: u32 },

    #[error("no valid targets remain")]
    NoValidTargets,

    #[error(transparent)]
    Combat(#[from] CombatError),
}

impl BattleError for SkillError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotKnown { .. } => ErrorSeverity::Validation,
            Self::Silenced(_) | Self::InsufficientMp { .. } | Self::NoValidTargets => {
                ErrorSeverity::Recoverable
            }
            Self::Combat(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotKnown { .. } => "SKILL_NOT_KNOWN",
            Self::Silenced(_) => "SKILL_SILENCED",
            Self::InsufficientMp { .. } => "SKILL_INSUFFICIENT_MP",
            Self::NoValidTargets => "SKILL_NO_VALID_TARGETS",
            Self::Combat(err) => err.error_code(),
        }
    }
}
