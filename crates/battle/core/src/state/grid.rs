//! Team grids and formations.
//!
//! Each team occupies its own 3×3 grid. Positions never cross teams: a
//! [`GridPosition`] always names the team whose grid it lives on.

use std::collections::BTreeMap;

use crate::config::BattleConfig;

use super::UnitId;

/// Side of the battle a unit fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Team {
    Player,
    Enemy,
}

impl Team {
    pub const fn opponent(self) -> Self {
        match self {
            Team::Player => Team::Enemy,
            Team::Enemy => Team::Player,
        }
    }
}

/// A cell on a team grid without the team component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCell {
    pub row: u8,
    pub col: u8,
}

impl GridCell {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub const fn is_in_bounds(&self) -> bool {
        self.row < BattleConfig::GRID_ROWS && self.col < BattleConfig::GRID_COLS
    }

    /// Default cell for the `index`-th unit of a team when no formation is given.
    ///
    /// Fills the grid row by row; wraps after nine units.
    pub fn nth(index: usize) -> Self {
        let index = index % BattleConfig::GRID_CELLS;
        let cols = BattleConfig::GRID_COLS as usize;
        Self::new((index / cols) as u8, (index % cols) as u8)
    }
}

/// Absolute position of a unit: team grid plus cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPosition {
    pub team: Team,
    pub row: u8,
    pub col: u8,
}

impl GridPosition {
    pub const fn new(team: Team, row: u8, col: u8) -> Self {
        Self { team, row, col }
    }

    pub const fn from_cell(team: Team, cell: GridCell) -> Self {
        Self::new(team, cell.row, cell.col)
    }

    pub const fn cell(&self) -> GridCell {
        GridCell::new(self.row, self.col)
    }

    pub const fn is_in_bounds(&self) -> bool {
        self.cell().is_in_bounds()
    }

    /// Returns the neighbouring position shifted by `(d_row, d_col)`, or
    /// `None` when it falls off the grid.
    pub fn offset(&self, d_row: i8, d_col: i8) -> Option<Self> {
        let row = i16::from(self.row) + i16::from(d_row);
        let col = i16::from(self.col) + i16::from(d_col);
        if row < 0
            || col < 0
            || row >= i16::from(BattleConfig::GRID_ROWS)
            || col >= i16::from(BattleConfig::GRID_COLS)
        {
            return None;
        }
        Some(Self::new(self.team, row as u8, col as u8))
    }
}

impl core::fmt::Display for GridPosition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}({},{})", self.team, self.row, self.col)
    }
}

/// Explicit placement of units on one team grid.
///
/// Overrides any position carried by the unit specs themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Formation {
    slots: BTreeMap<UnitId, GridCell>,
}

impl Formation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a unit (builder style).
    #[must_use]
    pub fn with(mut self, unit: impl Into<UnitId>, cell: GridCell) -> Self {
        self.slots.insert(unit.into(), cell);
        self
    }

    pub fn cell_of(&self, unit: &UnitId) -> Option<GridCell> {
        self.slots.get(unit).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UnitId, &GridCell)> {
        self.slots.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
