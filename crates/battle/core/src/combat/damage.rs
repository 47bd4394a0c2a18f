//! Damage calculation.

use crate::buff;
use crate::env::{CombatTables, RandomSource};
use crate::state::{BattleUnit, StatKind};

/// Damage type, selecting which attack/defense pair and curve constant apply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum DamageType {
    /// `p_atk` against `p_def`.
    #[default]
    Physical,
    /// `m_atk` against `m_def`.
    Magical,
    /// Ignores defense and flat/percent reductions.
    #[strum(serialize = "true_damage")]
    #[cfg_attr(feature = "serde", serde(rename = "true_damage"))]
    True,
}

impl DamageType {
    pub const fn attack_stat(self) -> StatKind {
        match self {
            DamageType::Physical | DamageType::True => StatKind::PhysicalAttack,
            DamageType::Magical => StatKind::MagicAttack,
        }
    }

    pub const fn defense_stat(self) -> Option<StatKind> {
        match self {
            DamageType::Physical => Some(StatKind::PhysicalDefense),
            DamageType::Magical => Some(StatKind::MagicDefense),
            DamageType::True => None,
        }
    }

    /// Curve constant `K` from the balance tables.
    pub fn curve_constant(self, tables: &CombatTables) -> f64 {
        match self {
            DamageType::Physical | DamageType::True => tables.physical_k,
            DamageType::Magical => tables.magical_k,
        }
    }
}

/// Fraction of damage removed by `defense`: `defense / (defense + K)`.
///
/// Diminishing returns: 0 at zero defense, approaching (never reaching) 1 as
/// defense grows.
pub fn defense_reduction_ratio(defense: f64, k: f64) -> f64 {
    let defense = defense.max(0.0);
    if defense == 0.0 {
        return 0.0;
    }
    defense / (defense + k.max(f64::MIN_POSITIVE))
}

/// `attack × (1 − defense/(defense+K))`.
pub fn base_damage(attack: f64, defense: f64, k: f64) -> f64 {
    attack.max(0.0) * (1.0 - defense_reduction_ratio(defense, k))
}

/// Everything needed to compute one hit, gathered from both units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageInput {
    pub attack: f64,
    pub defense: f64,
    pub k: f64,
    /// Skill power coefficient (1.0 for normal attacks).
    pub power: f64,
    pub crit_rate: f64,
    pub crit_damage: f64,
    /// Defender flat reduction (stat + buffs).
    pub flat_reduction: f64,
    pub percent_reduction: f64,
    /// Attacker buff multiplier (damage boost).
    pub attacker_multiplier: f64,
    /// Defender buff multiplier (vulnerability, freeze-vulnerability, defend stance).
    pub defender_multiplier: f64,
    pub variance: f64,
}

impl DamageInput {
    /// Collects attacker/defender stats and buff modifiers for one hit.
    pub fn between(
        attacker: &BattleUnit,
        defender: &BattleUnit,
        damage_type: DamageType,
        power: f64,
        tables: &CombatTables,
    ) -> Self {
        let attack = buff::effective_stat(attacker, damage_type.attack_stat());
        let defense = damage_type
            .defense_stat()
            .map(|stat| buff::effective_stat(defender, stat))
            .unwrap_or(0.0);

        let ignores_mitigation = damage_type == DamageType::True;
        let mut defender_multiplier = buff::incoming_damage_multiplier(defender);
        if defender.is_defending && damage_type == DamageType::Physical {
            defender_multiplier *= 1.0 - tables.defend_reduction.clamp(0.0, 1.0);
        }

        Self {
            attack,
            defense,
            k: damage_type.curve_constant(tables),
            power,
            crit_rate: buff::effective_stat(attacker, StatKind::CritRate),
            crit_damage: attacker.stats.crit_damage,
            flat_reduction: if ignores_mitigation {
                0.0
            } else {
                f64::from(defender.stats.fixed_reduction) + buff::flat_reduction_bonus(defender)
            },
            percent_reduction: if ignores_mitigation {
                0.0
            } else {
                defender.stats.percent_reduction
            },
            attacker_multiplier: buff::outgoing_damage_multiplier(attacker),
            defender_multiplier,
            variance: tables.damage_variance,
        }
    }
}

/// Result of a damage roll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageRoll {
    pub amount: u32,
    pub critical: bool,
    /// Value before variance and rounding, for diagnostics.
    pub pre_variance: f64,
}

/// Damage before the crit trial and variance: `base × power`.
pub fn pre_random_damage(attack: f64, defense: f64, k: f64, power: f64) -> f64 {
    base_damage(attack, defense, k) * power.max(0.0)
}

/// Rolls one hit.
///
/// Pipeline: defense curve → crit trial → power coefficient → flat reduction
/// (floored at 0) → percent reduction → attacker buffs → defender buffs →
/// variance band → round.
pub fn calculate_damage(input: &DamageInput, rng: &mut (impl RandomSource + ?Sized)) -> DamageRoll {
    let mut damage = base_damage(input.attack, input.defense, input.k);

    let critical = rng.chance(input.crit_rate);
    if critical {
        damage *= input.crit_damage.max(1.0);
    }

    damage *= input.power.max(0.0);
    damage = (damage - input.flat_reduction.max(0.0)).max(0.0);
    damage *= 1.0 - input.percent_reduction.clamp(0.0, 1.0);
    damage *= input.attacker_multiplier.max(0.0);
    damage *= input.defender_multiplier.max(0.0);

    let pre_variance = damage;
    let spread = input.variance.clamp(0.0, 1.0);
    if spread > 0.0 {
        damage *= rng.range_f64(1.0 - spread, 1.0 + spread);
    }

    DamageRoll {
        amount: damage.round().max(0.0) as u32,
        critical,
        pre_variance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{PcgRng, ScriptedRng};

    fn input(attack: f64, defense: f64) -> DamageInput {
        DamageInput {
            attack,
            defense,
            k: 100.0,
            power: 1.0,
            crit_rate: 0.0,
            crit_damage: 1.5,
            flat_reduction: 0.0,
            percent_reduction: 0.0,
            attacker_multiplier: 1.0,
            defender_multiplier: 1.0,
            variance: 0.0,
        }
    }

    #[test]
    fn zero_defense_keeps_full_attack_times_power() {
        assert_eq!(pre_random_damage(50.0, 0.0, 100.0, 1.0), 50.0);
        assert_eq!(pre_random_damage(50.0, 0.0, 100.0, 1.8), 90.0);
    }

    #[test]
    fn reduction_ratio_never_reaches_one() {
        let mut previous = 0.0;
        for defense in [1.0, 10.0, 100.0, 1e4, 1e8, 1e12] {
            let ratio = defense_reduction_ratio(defense, 100.0);
            assert!(ratio > previous);
            assert!(ratio < 1.0);
            previous = ratio;
        }
    }

    #[test]
    fn defense_equal_to_k_halves_damage() {
        assert_eq!(base_damage(80.0, 100.0, 100.0), 40.0);
    }

    #[test]
    fn flat_reduction_floors_at_zero() {
        let mut i = input(10.0, 0.0);
        i.flat_reduction = 50.0;
        let roll = calculate_damage(&i, &mut PcgRng::seeded(1));
        assert_eq!(roll.amount, 0);
    }

    #[test]
    fn percent_reduction_applies_after_flat() {
        let mut i = input(100.0, 0.0);
        i.flat_reduction = 20.0;
        i.percent_reduction = 0.5;
        let roll = calculate_damage(&i, &mut PcgRng::seeded(1));
        assert_eq!(roll.amount, 40);
    }

    #[test]
    fn critical_hits_multiply_damage() {
        let mut i = input(100.0, 0.0);
        i.crit_rate = 0.5;
        let crit = calculate_damage(&i, &mut ScriptedRng::new(vec![0.1]));
        assert!(crit.critical);
        assert_eq!(crit.amount, 150);

        let normal = calculate_damage(&i, &mut ScriptedRng::new(vec![0.9]));
        assert!(!normal.critical);
        assert_eq!(normal.amount, 100);
    }

    #[test]
    fn variance_stays_within_band() {
        let mut i = input(100.0, 0.0);
        i.variance = 0.1;
        let mut rng = PcgRng::seeded(99);
        for _ in 0..200 {
            let roll = calculate_damage(&i, &mut rng);
            assert!((90..=110).contains(&roll.amount), "{}", roll.amount);
        }
    }

    #[test]
    fn buff_multipliers_compose() {
        let mut i = input(100.0, 0.0);
        i.attacker_multiplier = 1.2;
        i.defender_multiplier = 1.5;
        let roll = calculate_damage(&i, &mut PcgRng::seeded(1));
        assert_eq!(roll.amount, 180);
    }
}
