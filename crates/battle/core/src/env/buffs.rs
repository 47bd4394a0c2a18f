//! Buff definitions and the oracle that serves them.

use crate::state::{BuffCategory, BuffId, EffectType, StackPolicy};

/// Oracle providing buff / status effect definitions by id.
pub trait BuffOracle: Send + Sync {
    fn buff(&self, id: &BuffId) -> Option<&BuffDefinition>;
}

/// Static description of a buff or debuff.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffDefinition {
    pub id: BuffId,
    pub name: String,
    pub effect_type: EffectType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: BuffCategory,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stack_policy: StackPolicy,
    #[cfg_attr(feature = "serde", serde(default = "single_stack"))]
    pub max_stacks: u32,
    /// Round-end ticks before expiry; `-1` for permanent.
    pub duration: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: f64,
    #[cfg_attr(feature = "serde", serde(default = "dispellable"))]
    pub dispellable: bool,
}

#[cfg(feature = "serde")]
fn single_stack() -> u32 {
    1
}

#[cfg(feature = "serde")]
fn dispellable() -> bool {
    true
}

impl BuffDefinition {
    pub fn new(
        id: impl Into<BuffId>,
        name: impl Into<String>,
        effect_type: EffectType,
        duration: i32,
        value: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            effect_type,
            category: BuffCategory::Buff,
            stack_policy: StackPolicy::Refresh,
            max_stacks: 1,
            duration,
            value,
            dispellable: true,
        }
    }

    #[must_use]
    pub fn debuff(mut self) -> Self {
        self.category = BuffCategory::Debuff;
        self
    }

    #[must_use]
    pub fn stacking(mut self, policy: StackPolicy, max_stacks: u32) -> Self {
        self.stack_policy = policy;
        self.max_stacks = max_stacks.max(1);
        self
    }
}
