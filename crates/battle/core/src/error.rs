//! Common error infrastructure for battle-core.
//!
//! Domain-specific errors (e.g. [`SkillError`](crate::skill::SkillError),
//! [`TargetError`](crate::skill::TargetError)) live next to the operations
//! that produce them. This module provides the shared classification used by
//! the runtime to decide whether a failure is a rejected command or a fault.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the command may succeed with different input (e.g. pick another target)
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistency; indicates a bug
/// - **Fatal**: battle state corrupted, the engine cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all battle-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for the Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
