//! Battle units.

use super::{GridCell, GridPosition, SkillId, Stats, StatusEffects, Team, UnitId};

/// Host-supplied description of a unit entering battle.
///
/// `current_hp`/`current_mp` default to the maxima; `position` is used when no
/// formation entry exists for the unit.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct UnitSpec {
    /// Identifier of the progression-side record this unit was built from.
    pub source_id: String,
    pub name: String,
    pub level: u32,
    pub stats: Stats,
    pub skills: Vec<SkillId>,
    pub position: Option<GridCell>,
    pub current_hp: Option<u32>,
    pub current_mp: Option<u32>,
}

impl UnitSpec {
    pub fn new(name: impl Into<String>, stats: Stats) -> Self {
        let name = name.into();
        Self {
            source_id: name.clone(),
            name,
            level: 1,
            stats,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_skills(mut self, skills: impl IntoIterator<Item = SkillId>) -> Self {
        self.skills = skills.into_iter().collect();
        self
    }

    #[must_use]
    pub fn at(mut self, cell: GridCell) -> Self {
        self.position = Some(cell);
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }
}

/// A unit taking part in a battle.
///
/// HP is only changed through [`BattleUnit::set_hp`] and the helpers built on
/// it so that `is_defeated == (current_hp == 0)` always holds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleUnit {
    pub id: UnitId,
    pub source_id: String,
    pub is_player_unit: bool,
    pub name: String,
    pub level: u32,
    pub stats: Stats,
    current_hp: u32,
    pub current_mp: u32,
    pub skill_set: Vec<SkillId>,
    pub status_effects: StatusEffects,
    pub grid_position: GridPosition,
    is_defeated: bool,
    /// Set for the round in which the unit chose to defend.
    pub is_defending: bool,
}

impl BattleUnit {
    pub fn from_spec(id: UnitId, spec: UnitSpec, team: Team, cell: GridCell) -> Self {
        let max_hp = spec.stats.hp;
        let max_mp = spec.stats.mp;
        let current_hp = spec.current_hp.unwrap_or(max_hp).min(max_hp);
        Self {
            id,
            source_id: spec.source_id,
            is_player_unit: team == Team::Player,
            name: spec.name,
            level: spec.level.max(1),
            stats: spec.stats,
            current_hp,
            current_mp: spec.current_mp.unwrap_or(max_mp).min(max_mp),
            skill_set: spec.skills,
            status_effects: StatusEffects::new(),
            grid_position: GridPosition::from_cell(team, cell),
            is_defeated: current_hp == 0,
            is_defending: false,
        }
    }

    pub fn team(&self) -> Team {
        self.grid_position.team
    }

    pub fn current_hp(&self) -> u32 {
        self.current_hp
    }

    pub fn max_hp(&self) -> u32 {
        self.stats.hp
    }

    pub fn is_defeated(&self) -> bool {
        self.is_defeated
    }

    pub fn is_alive(&self) -> bool {
        !self.is_defeated
    }

    /// Current HP as a fraction of max HP.
    pub fn hp_ratio(&self) -> f64 {
        if self.stats.hp == 0 {
            return 0.0;
        }
        f64::from(self.current_hp) / f64::from(self.stats.hp)
    }

    /// Sets HP clamped to `[0, max_hp]` and updates the defeat flag.
    pub fn set_hp(&mut self, hp: u32) {
        self.current_hp = hp.min(self.stats.hp);
        self.is_defeated = self.current_hp == 0;
        if self.is_defeated {
            self.is_defending = false;
        }
    }

    /// Removes up to `amount` HP. Returns the HP actually lost.
    pub fn lose_hp(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.current_hp);
        self.set_hp(self.current_hp - lost);
        lost
    }

    /// Restores up to `amount` HP, capped at max HP. Defeated units are not healed.
    pub fn restore_hp(&mut self, amount: u32) -> u32 {
        if self.is_defeated {
            return 0;
        }
        let missing = self.stats.hp - self.current_hp;
        let restored = amount.min(missing);
        self.set_hp(self.current_hp + restored);
        restored
    }

    /// Deducts MP if enough is available.
    pub fn spend_mp(&mut self, amount: u32) -> bool {
        if self.current_mp < amount {
            return false;
        }
        self.current_mp -= amount;
        true
    }

    pub fn knows_skill(&self, skill: &SkillId) -> bool {
        self.skill_set.contains(skill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(hp: u32) -> BattleUnit {
        let stats = Stats {
            hp,
            ..Stats::default()
        };
        BattleUnit::from_spec(
            UnitId::new("u"),
            UnitSpec::new("Unit", stats),
            Team::Player,
            GridCell::new(0, 0),
        )
    }

    #[test]
    fn hp_never_exceeds_bounds() {
        let mut u = unit(50);
        u.set_hp(500);
        assert_eq!(u.current_hp(), 50);
        assert_eq!(u.lose_hp(80), 50);
        assert_eq!(u.current_hp(), 0);
        assert!(u.is_defeated());
    }

    #[test]
    fn defeated_units_are_not_healed() {
        let mut u = unit(50);
        u.lose_hp(50);
        assert_eq!(u.restore_hp(20), 0);
        assert!(u.is_defeated());
    }

    #[test]
    fn restore_is_capped_at_missing_hp() {
        let mut u = unit(50);
        u.lose_hp(10);
        assert_eq!(u.restore_hp(30), 10);
        assert_eq!(u.current_hp(), 50);
    }

    #[test]
    fn zero_hp_spec_starts_defeated() {
        let mut spec = UnitSpec::new("Ghost", Stats::default());
        spec.current_hp = Some(0);
        let u = BattleUnit::from_spec(UnitId::new("g"), spec, Team::Enemy, GridCell::new(0, 0));
        assert!(u.is_defeated());
    }
}
