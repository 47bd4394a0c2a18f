//! Battle setup validation and the unit roster.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::BattleConfig;
use crate::error::{BattleError, ErrorSeverity};

use super::{BattleUnit, Formation, GridCell, GridPosition, Team, UnitId, UnitSpec};

/// Host-provided description of a battle.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BattleSetup {
    pub player_units: BTreeMap<UnitId, UnitSpec>,
    pub enemy_units: BTreeMap<UnitId, UnitSpec>,
    pub player_formation: Option<Formation>,
    pub enemy_formation: Option<Formation>,
}

impl BattleSetup {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn player(mut self, id: impl Into<UnitId>, spec: UnitSpec) -> Self {
        self.player_units.insert(id.into(), spec);
        self
    }

    #[must_use]
    pub fn enemy(mut self, id: impl Into<UnitId>, spec: UnitSpec) -> Self {
        self.enemy_units.insert(id.into(), spec);
        self
    }

    #[must_use]
    pub fn with_formations(mut self, player: Formation, enemy: Formation) -> Self {
        self.player_formation = Some(player);
        self.enemy_formation = Some(enemy);
        self
    }
}

/// Errors raised while validating a [`BattleSetup`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("player unit map is empty")]
    NoPlayerUnits,

    #[error("enemy unit map is empty")]
    NoEnemyUnits,

    #[error("unit id {0} is used on both teams")]
    DuplicateUnitId(UnitId),

    #[error("team {team} has {count} units but the grid holds {max}")]
    TooManyUnits { team: Team, count: usize, max: usize },

    #[error("unit {unit} placed outside the grid at ({row},{col})")]
    CellOutOfBounds { unit: UnitId, row: u8, col: u8 },

    #[error("unit {unit} placed on occupied cell ({row},{col})")]
    CellOccupied { unit: UnitId, row: u8, col: u8 },

    #[error("formation references unknown unit {0}")]
    FormationUnknownUnit(UnitId),

    #[error("unit {0} has zero max HP")]
    ZeroMaxHp(UnitId),
}

impl BattleError for SetupError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoPlayerUnits => "SETUP_NO_PLAYER_UNITS",
            Self::NoEnemyUnits => "SETUP_NO_ENEMY_UNITS",
            Self::DuplicateUnitId(_) => "SETUP_DUPLICATE_UNIT_ID",
            Self::TooManyUnits { .. } => "SETUP_TOO_MANY_UNITS",
            Self::CellOutOfBounds { .. } => "SETUP_CELL_OUT_OF_BOUNDS",
            Self::CellOccupied { .. } => "SETUP_CELL_OCCUPIED",
            Self::FormationUnknownUnit(_) => "SETUP_FORMATION_UNKNOWN_UNIT",
            Self::ZeroMaxHp(_) => "SETUP_ZERO_MAX_HP",
        }
    }
}

/// Every unit in the battle, keyed by id.
///
/// Units are never removed; defeat is recorded on the unit itself.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Roster {
    units: BTreeMap<UnitId, BattleUnit>,
}

impl Roster {
    /// Validates a setup and places every unit on its team grid.
    ///
    /// Placement priority: formation entry, then the spec's own position,
    /// then the first free cell in row-major order.
    pub fn from_setup(setup: BattleSetup) -> Result<Self, SetupError> {
        if setup.player_units.is_empty() {
            return Err(SetupError::NoPlayerUnits);
        }
        if setup.enemy_units.is_empty() {
            return Err(SetupError::NoEnemyUnits);
        }
        if let Some(id) = setup
            .player_units
            .keys()
            .find(|id| setup.enemy_units.contains_key(*id))
        {
            return Err(SetupError::DuplicateUnitId(id.clone()));
        }

        let mut roster = Self::default();
        roster.place_team(
            Team::Player,
            setup.player_units,
            setup.player_formation.unwrap_or_default(),
        )?;
        roster.place_team(
            Team::Enemy,
            setup.enemy_units,
            setup.enemy_formation.unwrap_or_default(),
        )?;
        Ok(roster)
    }

    fn place_team(
        &mut self,
        team: Team,
        specs: BTreeMap<UnitId, UnitSpec>,
        formation: Formation,
    ) -> Result<(), SetupError> {
        if specs.len() > BattleConfig::GRID_CELLS {
            return Err(SetupError::TooManyUnits {
                team,
                count: specs.len(),
                max: BattleConfig::GRID_CELLS,
            });
        }
        if let Some((unknown, _)) = formation.iter().find(|(id, _)| !specs.contains_key(*id)) {
            return Err(SetupError::FormationUnknownUnit(unknown.clone()));
        }

        let mut occupied = BTreeSet::new();
        let mut unplaced = Vec::new();
        let mut placed = Vec::new();

        for (id, spec) in specs {
            if spec.stats.hp == 0 {
                return Err(SetupError::ZeroMaxHp(id));
            }
            match formation.cell_of(&id).or(spec.position) {
                Some(cell) => {
                    if !cell.is_in_bounds() {
                        return Err(SetupError::CellOutOfBounds {
                            unit: id,
                            row: cell.row,
                            col: cell.col,
                        });
                    }
                    if !occupied.insert(cell) {
                        return Err(SetupError::CellOccupied {
                            unit: id,
                            row: cell.row,
                            col: cell.col,
                        });
                    }
                    placed.push((id, spec, cell));
                }
                None => unplaced.push((id, spec)),
            }
        }

        let mut free = (0..BattleConfig::GRID_CELLS)
            .map(GridCell::nth)
            .filter(|cell| !occupied.contains(cell));
        for (id, spec) in unplaced {
            // Capacity was checked above, so a free cell always exists.
            let Some(cell) = free.next() else {
                return Err(SetupError::TooManyUnits {
                    team,
                    count: BattleConfig::GRID_CELLS + 1,
                    max: BattleConfig::GRID_CELLS,
                });
            };
            placed.push((id, spec, cell));
        }

        for (id, spec, cell) in placed {
            let unit = BattleUnit::from_spec(id.clone(), spec, team, cell);
            self.units.insert(id, unit);
        }
        Ok(())
    }

    pub fn get(&self, id: &UnitId) -> Option<&BattleUnit> {
        self.units.get(id)
    }

    pub fn get_mut(&mut self, id: &UnitId) -> Option<&mut BattleUnit> {
        self.units.get_mut(id)
    }

    pub fn contains(&self, id: &UnitId) -> bool {
        self.units.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleUnit> {
        self.units.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BattleUnit> {
        self.units.values_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = &UnitId> {
        self.units.keys()
    }

    pub fn team(&self, team: Team) -> impl Iterator<Item = &BattleUnit> {
        self.units.values().filter(move |u| u.team() == team)
    }

    pub fn living(&self, team: Team) -> impl Iterator<Item = &BattleUnit> {
        self.team(team).filter(|u| u.is_alive())
    }

    pub fn is_team_alive(&self, team: Team) -> bool {
        self.living(team).next().is_some()
    }

    /// The living or defeated unit standing on a grid position.
    pub fn unit_at(&self, position: GridPosition) -> Option<&BattleUnit> {
        self.units.values().find(|u| u.grid_position == position)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
