//! Healing calculation.

use crate::buff;
use crate::env::{HealEntry, RandomSource};
use crate::state::BattleUnit;

/// Rolls the amount a heal restores before the max-HP cap.
///
/// `caster[scaling] × power × heal_bonus(target)`, then the heal variance band,
/// then rounding.
pub fn heal_amount(
    caster: &BattleUnit,
    target: &BattleUnit,
    entry: &HealEntry,
    variance: f64,
    rng: &mut (impl RandomSource + ?Sized),
) -> u32 {
    let base = buff::effective_stat(caster, entry.scaling) * entry.power.max(0.0);
    let mut amount = base * buff::heal_bonus(target);

    let spread = variance.clamp(0.0, 1.0);
    if spread > 0.0 {
        amount *= rng.range_f64(1.0 - spread, 1.0 + spread);
    }
    amount.round().max(0.0) as u32
}
