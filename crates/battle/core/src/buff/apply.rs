use crate::config::BattleConfig;
use crate::env::BuffDefinition;
use crate::state::{BattleUnit, EffectType, StackPolicy, StatusEffect, UnitId};

/// What happened when a buff was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A new instance was attached.
    Added { stacks: u32 },
    /// The existing instance gained a stack (or stayed at max) and was refreshed.
    Stacked { stacks: u32 },
    /// The existing instance had its duration reset.
    Refreshed { stacks: u32 },
    /// The old instance was discarded in favour of the new one.
    Replaced { stacks: u32 },
    /// The existing instance was stronger and stays.
    KeptExisting { stacks: u32 },
    /// The unit carries the maximum number of effects.
    CapacityReached,
    /// Defeated units do not receive effects.
    TargetDefeated,
}

impl ApplyOutcome {
    /// Stack count after application, or `None` when nothing changed on the unit.
    pub fn stacks(&self) -> Option<u32> {
        match *self {
            Self::Added { stacks }
            | Self::Stacked { stacks }
            | Self::Refreshed { stacks }
            | Self::Replaced { stacks } => Some(stacks),
            Self::KeptExisting { .. } | Self::CapacityReached | Self::TargetDefeated => None,
        }
    }
}

/// Per-level scaling applied to buff values: `1 + (level − 1) × 0.1`.
pub fn level_multiplier(level: u32) -> f64 {
    1.0 + f64::from(level.max(1) - 1) * BattleConfig::BUFF_LEVEL_SCALING
}

/// Builds a fresh effect instance from a definition.
pub fn instantiate(
    definition: &BuffDefinition,
    source: &UnitId,
    level: u32,
    duration: Option<i32>,
) -> StatusEffect {
    let mut effect = StatusEffect {
        buff_id: definition.id.clone(),
        source_unit_id: source.clone(),
        level: level.max(1),
        stacks: 1,
        remaining_rounds: duration.unwrap_or(definition.duration),
        effect_type: definition.effect_type,
        category: definition.category,
        dispellable: definition.dispellable,
        value: definition.value,
        value_multiplier: level_multiplier(level),
        shield_remaining: 0,
        is_active: true,
    };
    refill_shield(&mut effect);
    effect
}

fn refill_shield(effect: &mut StatusEffect) {
    if effect.effect_type == EffectType::Shield {
        effect.shield_remaining = effect.magnitude().round().max(0.0) as u32;
    }
}

/// Applies `definition` to `unit`, honouring its stack policy.
pub fn apply_buff(
    unit: &mut BattleUnit,
    definition: &BuffDefinition,
    source: &UnitId,
    level: u32,
    duration: Option<i32>,
) -> ApplyOutcome {
    if unit.is_defeated() {
        return ApplyOutcome::TargetDefeated;
    }

    let incoming = instantiate(definition, source, level, duration);
    let Some(existing) = unit.status_effects.get_mut(&definition.id) else {
        return if unit.status_effects.push(incoming) {
            ApplyOutcome::Added { stacks: 1 }
        } else {
            ApplyOutcome::CapacityReached
        };
    };

    match definition.stack_policy {
        StackPolicy::Stack => {
            existing.stacks = (existing.stacks + 1).min(definition.max_stacks.max(1));
            existing.remaining_rounds = incoming.remaining_rounds;
            existing.is_active = true;
            refill_shield(existing);
            ApplyOutcome::Stacked {
                stacks: existing.stacks,
            }
        }
        StackPolicy::Refresh => {
            existing.remaining_rounds = incoming.remaining_rounds;
            existing.is_active = true;
            refill_shield(existing);
            ApplyOutcome::Refreshed {
                stacks: existing.stacks,
            }
        }
        StackPolicy::Replace => {
            *existing = incoming;
            ApplyOutcome::Replaced { stacks: 1 }
        }
        StackPolicy::Highest => {
            if incoming.magnitude().abs() > existing.magnitude().abs() {
                *existing = incoming;
                ApplyOutcome::Replaced { stacks: 1 }
            } else {
                ApplyOutcome::KeptExisting {
                    stacks: existing.stacks,
                }
            }
        }
    }
}
