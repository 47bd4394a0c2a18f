use crate::state::{BattleUnit, BuffId, EffectType, StatusEffect, UnitId};

/// HP change produced by a periodic effect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeriodicTick {
    pub unit_id: UnitId,
    pub buff_id: BuffId,
    /// Positive for healing, negative for damage.
    pub delta: i64,
}

/// Result of the round-end pass on one unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoundEndTick {
    pub periodic: Vec<PeriodicTick>,
    pub expired: Vec<StatusEffect>,
    /// The unit was defeated by damage over time.
    pub defeated: bool,
}

fn periodic_amount(effect: &StatusEffect) -> u32 {
    effect.magnitude().round().max(0.0) as u32
}

/// Round-start hook: heal-over-time effects restore HP.
pub fn tick_round_start(unit: &mut BattleUnit) -> Vec<PeriodicTick> {
    if unit.is_defeated() {
        return Vec::new();
    }

    let heals: Vec<(BuffId, u32)> = unit
        .status_effects
        .active()
        .filter(|e| e.effect_type == EffectType::HealOverTime)
        .map(|e| (e.buff_id.clone(), periodic_amount(e)))
        .collect();

    let mut ticks = Vec::new();
    for (buff_id, amount) in heals {
        let restored = unit.restore_hp(amount);
        if restored > 0 {
            ticks.push(PeriodicTick {
                unit_id: unit.id.clone(),
                buff_id,
                delta: i64::from(restored),
            });
        }
    }
    ticks
}

/// Round-end hook: damage over time, then duration decrement and expiry.
///
/// Damage over time bypasses shields. An effect with `remaining_rounds == 1`
/// still applies during this pass and is removed at its end. Permanent
/// effects are never decremented.
pub fn tick_round_end(unit: &mut BattleUnit) -> RoundEndTick {
    let mut tick = RoundEndTick::default();
    if unit.is_defeated() {
        return tick;
    }

    let dots: Vec<(BuffId, u32)> = unit
        .status_effects
        .active()
        .filter(|e| e.effect_type == EffectType::DamageOverTime)
        .map(|e| (e.buff_id.clone(), periodic_amount(e)))
        .collect();

    let mut lost_hp = false;
    for (buff_id, amount) in dots {
        if unit.is_defeated() {
            break;
        }
        let lost = unit.lose_hp(amount);
        if lost > 0 {
            lost_hp = true;
            tick.periodic.push(PeriodicTick {
                unit_id: unit.id.clone(),
                buff_id,
                delta: -i64::from(lost),
            });
        }
    }
    tick.defeated = unit.is_defeated();

    for effect in unit.status_effects.iter_mut() {
        if !effect.is_permanent() && effect.remaining_rounds > 0 {
            effect.remaining_rounds -= 1;
        }
    }
    tick.expired = unit
        .status_effects
        .drain_where(|e| !e.is_permanent() && e.remaining_rounds <= 0);

    if lost_hp {
        tick.expired.extend(
            unit.status_effects
                .drain_where(|e| e.effect_type == EffectType::Sleep),
        );
    }
    tick
}
