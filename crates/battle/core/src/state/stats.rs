//! Unit stat block.

/// Base stats of a unit as supplied by the host.
///
/// Integer stats are absolute values; rate stats are fractions in `[0, 1]`
/// except `crit_damage`, which is a damage multiplier (1.5 = +50%).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Stats {
    /// Maximum HP.
    pub hp: u32,
    /// Maximum MP.
    pub mp: u32,
    pub p_atk: u32,
    pub m_atk: u32,
    pub p_def: u32,
    pub m_def: u32,
    pub speed: u32,
    pub crit_rate: f64,
    pub crit_damage: f64,
    pub dodge_rate: f64,
    pub hit_rate: f64,
    /// Flat amount subtracted from every incoming hit.
    pub fixed_reduction: u32,
    /// Fraction removed from every incoming hit after flat reduction.
    pub percent_reduction: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            hp: 100,
            mp: 0,
            p_atk: 10,
            m_atk: 10,
            p_def: 0,
            m_def: 0,
            speed: 10,
            crit_rate: 0.0,
            crit_damage: 1.5,
            dodge_rate: 0.0,
            hit_rate: 1.0,
            fixed_reduction: 0,
            percent_reduction: 0.0,
        }
    }
}

impl Stats {
    /// Returns the base value of a stat as a float.
    pub fn get(&self, kind: StatKind) -> f64 {
        match kind {
            StatKind::PhysicalAttack => f64::from(self.p_atk),
            StatKind::MagicAttack => f64::from(self.m_atk),
            StatKind::PhysicalDefense => f64::from(self.p_def),
            StatKind::MagicDefense => f64::from(self.m_def),
            StatKind::Speed => f64::from(self.speed),
            StatKind::CritRate => self.crit_rate,
            StatKind::DodgeRate => self.dodge_rate,
            StatKind::HitRate => self.hit_rate,
        }
    }
}

/// Stats that buffs can scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatKind {
    PhysicalAttack,
    MagicAttack,
    PhysicalDefense,
    MagicDefense,
    Speed,
    CritRate,
    DodgeRate,
    HitRate,
}
