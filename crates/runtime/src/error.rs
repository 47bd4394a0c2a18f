//! Errors surfaced by the engine API and the event bus.
//!
//! Validation failures leave the engine untouched; [`EngineError::Runtime`] is
//! the only variant that moves the engine to its terminal error phase.
use battle_core::{BattleError, CombatError, ErrorSeverity, SetupError, UnitId};
use thiserror::Error;

use crate::engine::BattlePhase;
use crate::events::EventKind;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid battle setup: {0}")]
    ConfigValidation(#[from] SetupError),

    #[error("invalid action: {0}")]
    ActionValidation(#[from] ActionRejection),

    #[error("{operation} is not allowed in phase {phase}")]
    EngineState {
        operation: &'static str,
        phase: BattlePhase,
    },

    #[error("waiting for actions from {}", format_units(.pending))]
    ActionsPending { pending: Vec<UnitId> },

    #[error("battle engine failed: {0}")]
    Runtime(#[from] RuntimeFailure),
}

impl BattleError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            EngineError::ConfigValidation(_) | EngineError::ActionValidation(_) => {
                ErrorSeverity::Validation
            }
            EngineError::EngineState { .. } | EngineError::ActionsPending { .. } => {
                ErrorSeverity::Recoverable
            }
            EngineError::Runtime(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            EngineError::ConfigValidation(inner) => inner.error_code(),
            EngineError::ActionValidation(inner) => inner.error_code(),
            EngineError::EngineState { .. } => "ENGINE_WRONG_PHASE",
            EngineError::ActionsPending { .. } => "ENGINE_ACTIONS_PENDING",
            EngineError::Runtime(_) => "ENGINE_RUNTIME_FAILURE",
        }
    }
}

fn format_units(units: &[UnitId]) -> String {
    units
        .iter()
        .map(UnitId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reasons a submitted action is refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionRejection {
    #[error("unit {0} is not part of this battle")]
    UnknownUnit(UnitId),

    #[error("action unit {declared} does not match submitting unit {submitter}")]
    ActorMismatch { submitter: UnitId, declared: UnitId },

    #[error("unit {0} is defeated")]
    UnitDefeated(UnitId),

    #[error("unit {0} cannot act this round")]
    CannotAct(UnitId),

    #[error("unit {0} already submitted an action this round")]
    Duplicate(UnitId),

    #[error("skill action of {0} names no skill")]
    MissingSkill(UnitId),

    #[error("skill {0} is not defined")]
    UnknownSkill(battle_core::SkillId),

    #[error("unit {unit} does not know skill {skill}")]
    SkillNotKnown {
        unit: UnitId,
        skill: battle_core::SkillId,
    },

    #[error("target {0} is not part of this battle")]
    UnknownTarget(UnitId),

    #[error("attack of {0} names no target")]
    MissingTarget(UnitId),
}

impl BattleError for ActionRejection {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownUnit(_) => "ACTION_UNKNOWN_UNIT",
            Self::ActorMismatch { .. } => "ACTION_ACTOR_MISMATCH",
            Self::UnitDefeated(_) => "ACTION_UNIT_DEFEATED",
            Self::CannotAct(_) => "ACTION_UNIT_CANNOT_ACT",
            Self::Duplicate(_) => "ACTION_DUPLICATE",
            Self::MissingSkill(_) => "ACTION_MISSING_SKILL",
            Self::UnknownSkill(_) => "ACTION_UNKNOWN_SKILL",
            Self::SkillNotKnown { .. } => "ACTION_SKILL_NOT_KNOWN",
            Self::UnknownTarget(_) => "ACTION_UNKNOWN_TARGET",
            Self::MissingTarget(_) => "ACTION_MISSING_TARGET",
        }
    }
}

/// Internal failure inside phase logic.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuntimeFailure {
    #[error(transparent)]
    Combat(#[from] CombatError),

    #[error("turn order names unit {0} missing from the roster")]
    MissingUnit(UnitId),

    #[error("illegal phase transition {from} -> {to}")]
    IllegalTransition { from: BattlePhase, to: BattlePhase },

    #[error("{0}")]
    Other(String),
}

/// Failures reported by the event bus.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("no {kind} event within {waited_ms} ms")]
    Timeout { kind: EventKind, waited_ms: u64 },

    #[error("event bus closed")]
    Closed,
}
