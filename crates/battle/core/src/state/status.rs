//! Status effect instances carried by units.
//!
//! A [`StatusEffect`] is the runtime instance of a buff definition: it knows
//! who applied it, how many stacks it has and how many round-end ticks remain.
//! `remaining_rounds == -1` marks a permanent effect that never auto-expires.

use arrayvec::ArrayVec;
use bitflags::bitflags;

use super::{BuffId, StatKind, UnitId};

/// Maximum number of simultaneous status effects on one unit.
pub const MAX_STATUS_EFFECTS: usize = 16;

/// Marker for effects that never expire on their own.
pub const PERMANENT: i32 = -1;

/// What a status effect does while active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectType {
    // ========================================================================
    // Modifiers
    // ========================================================================
    /// Scales a stat by `1 + magnitude` (negative magnitude for debuffs).
    StatBoost(StatKind),
    /// Outgoing damage multiplied by `1 + magnitude`.
    DamageBoost,
    /// Incoming damage multiplied by `1 + magnitude`.
    Vulnerability,
    /// Flat amount removed from incoming damage.
    FlatReduction,
    /// Incoming damage multiplied by `1 + magnitude` while the holder is frozen.
    FreezeVulnerability,
    /// Healing received multiplied by `1 + magnitude`.
    HealBonus,

    // ========================================================================
    // Damage interaction
    // ========================================================================
    /// Absorbs incoming damage from a finite pool.
    Shield,
    /// Returns `magnitude` × damage taken to the attacker.
    ReflectDamage,

    // ========================================================================
    // Periodic
    // ========================================================================
    /// Loses `magnitude` HP at each round end.
    DamageOverTime,
    /// Restores `magnitude` HP at each round start.
    HealOverTime,

    // ========================================================================
    // Control
    // ========================================================================
    Stun,
    Freeze,
    /// Like stun, but broken when the holder takes HP damage.
    Sleep,
    Silence,
    Invisible,
    Untargetable,
    /// Holder can target invisible units.
    TrueSight,
    /// Holder must attack the effect's source unit while it lives.
    Taunt,
}

impl EffectType {
    /// Control flag contributed by this effect type, if any.
    pub fn control_flag(&self) -> ControlFlags {
        match self {
            EffectType::Stun => ControlFlags::STUNNED,
            EffectType::Freeze => ControlFlags::FROZEN,
            EffectType::Sleep => ControlFlags::ASLEEP,
            EffectType::Silence => ControlFlags::SILENCED,
            EffectType::Invisible => ControlFlags::INVISIBLE,
            EffectType::Untargetable => ControlFlags::UNTARGETABLE,
            EffectType::TrueSight => ControlFlags::TRUE_SIGHT,
            EffectType::Taunt => ControlFlags::TAUNTED,
            _ => ControlFlags::empty(),
        }
    }
}

bitflags! {
    /// Aggregated control state of a unit, derived from its active effects.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ControlFlags: u16 {
        const STUNNED      = 1 << 0;
        const FROZEN       = 1 << 1;
        const ASLEEP       = 1 << 2;
        const SILENCED     = 1 << 3;
        const INVISIBLE    = 1 << 4;
        const UNTARGETABLE = 1 << 5;
        const TRUE_SIGHT   = 1 << 6;
        const TAUNTED      = 1 << 7;

        /// Any flag that prevents acting at all.
        const INCAPACITATED = Self::STUNNED.bits() | Self::FROZEN.bits() | Self::ASLEEP.bits();
    }
}

/// Policy for applying a buff the unit already carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum StackPolicy {
    /// Add a stack (up to `max_stacks`) and refresh the duration.
    Stack,
    /// Reset the duration, keep the existing magnitude.
    #[default]
    Refresh,
    /// Discard the old instance and apply the new one.
    Replace,
    /// Keep whichever instance has the larger magnitude.
    Highest,
}

/// Whether an effect helps or hinders its holder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum BuffCategory {
    #[default]
    Buff,
    Debuff,
}

/// A status effect instance on a unit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub buff_id: BuffId,
    pub source_unit_id: UnitId,
    pub level: u32,
    pub stacks: u32,
    /// Round-end ticks left; [`PERMANENT`] never expires.
    pub remaining_rounds: i32,
    pub effect_type: EffectType,
    pub category: BuffCategory,
    pub dispellable: bool,
    pub value: f64,
    pub value_multiplier: f64,
    /// Remaining absorb pool for [`EffectType::Shield`].
    pub shield_remaining: u32,
    pub is_active: bool,
}

impl StatusEffect {
    pub fn is_permanent(&self) -> bool {
        self.remaining_rounds == PERMANENT
    }

    /// Effective strength: `value × value_multiplier × stacks`.
    pub fn magnitude(&self) -> f64 {
        self.value * self.value_multiplier * f64::from(self.stacks.max(1))
    }
}

/// Status effects currently attached to a unit.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, MAX_STATUS_EFFECTS>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StatusEffect> {
        self.effects.iter_mut()
    }

    /// Active effects only.
    pub fn active(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter().filter(|e| e.is_active)
    }

    pub fn get(&self, buff_id: &BuffId) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| &e.buff_id == buff_id)
    }

    pub fn get_mut(&mut self, buff_id: &BuffId) -> Option<&mut StatusEffect> {
        self.effects.iter_mut().find(|e| &e.buff_id == buff_id)
    }

    pub fn contains(&self, buff_id: &BuffId) -> bool {
        self.get(buff_id).is_some()
    }

    /// Adds an effect. Returns false when the unit is already at capacity.
    pub fn push(&mut self, effect: StatusEffect) -> bool {
        self.effects.try_push(effect).is_ok()
    }

    /// Removes and returns the effect with the given buff id.
    pub fn remove(&mut self, buff_id: &BuffId) -> Option<StatusEffect> {
        let index = self.effects.iter().position(|e| &e.buff_id == buff_id)?;
        Some(self.effects.remove(index))
    }

    /// Removes every effect matching `remove`, returning the removed ones in order.
    pub fn drain_where(&mut self, mut remove: impl FnMut(&StatusEffect) -> bool) -> Vec<StatusEffect> {
        let mut removed = Vec::new();
        let mut index = 0;
        while index < self.effects.len() {
            if remove(&self.effects[index]) {
                removed.push(self.effects.remove(index));
            } else {
                index += 1;
            }
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Union of the control flags of all active effects.
    pub fn control_flags(&self) -> ControlFlags {
        self.active()
            .fold(ControlFlags::empty(), |flags, e| flags | e.effect_type.control_flag())
    }
}
