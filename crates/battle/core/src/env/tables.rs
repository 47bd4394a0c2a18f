/// Oracle providing combat balance tables.
///
/// Defines the constants of the damage curve, variance bands, accuracy
/// floors and AI weights. Unit and content data come from other oracles.
pub trait TablesOracle: Send + Sync {
    fn combat(&self) -> CombatTables;
    fn ai(&self) -> AiTables;
}

/// Positional gate for normal attacks.
///
/// Column 0 is each team's front line; the distance between two units is the
/// sum of their column indices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum RangePolicy {
    /// Any living enemy can be attacked.
    #[default]
    Unrestricted,
    /// Attack only enemies within `max` combined columns.
    ColumnDistance { max: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatTables {
    /// Defense curve constant `K` for physical damage.
    pub physical_k: f64,
    /// Defense curve constant `K` for magical damage.
    pub magical_k: f64,
    /// Half-width of the final damage variance band (0.1 = ±10%).
    pub damage_variance: f64,
    /// Half-width of the healing variance band.
    pub heal_variance: f64,
    /// Lowest possible hit chance after dodge.
    pub min_hit_chance: f64,
    /// Fraction of incoming physical damage removed while defending.
    pub defend_reduction: f64,
    pub range_policy: RangePolicy,
}

impl CombatTables {
    pub const DEFAULT: Self = Self {
        physical_k: 100.0,
        magical_k: 120.0,
        damage_variance: 0.1,
        heal_variance: 0.05,
        min_hit_chance: 0.05,
        defend_reduction: 0.5,
        range_policy: RangePolicy::Unrestricted,
    };
}

impl Default for CombatTables {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Weights for the heuristic enemy AI.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AiTables {
    /// HP ratio under which the unit considers defending.
    pub low_hp_ratio: f64,
    pub defend_chance: f64,
    pub skill_chance: f64,
    /// MP required before the unit considers casting.
    pub min_skill_mp: u32,
    /// Chance to attack the weakest target instead of a random one.
    pub focus_weakest_chance: f64,
}

impl AiTables {
    pub const DEFAULT: Self = Self {
        low_hp_ratio: 0.3,
        defend_chance: 0.5,
        skill_chance: 0.3,
        min_skill_mp: 10,
        focus_weakest_chance: 0.7,
    };
}

impl Default for AiTables {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Plain-data [`TablesOracle`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BalanceTables {
    pub combat: CombatTables,
    pub ai: AiTables,
}

impl BalanceTables {
    #[must_use]
    pub fn with_range_policy(mut self, policy: RangePolicy) -> Self {
        self.combat.range_policy = policy;
        self
    }

    /// Tables with every random band collapsed, for exact-value tests.
    pub fn deterministic() -> Self {
        let mut tables = Self::default();
        tables.combat.damage_variance = 0.0;
        tables.combat.heal_variance = 0.0;
        tables
    }
}

impl TablesOracle for BalanceTables {
    fn combat(&self) -> CombatTables {
        self.combat
    }

    fn ai(&self) -> AiTables {
        self.ai
    }
}
