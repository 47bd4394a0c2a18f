/// Battle-wide constants and tunable defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    /// Rounds after which the battle ends in a draw.
    pub max_rounds: u32,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    /// Rows per team grid.
    pub const GRID_ROWS: u8 = 3;
    /// Columns per team grid.
    pub const GRID_COLS: u8 = 3;
    /// Cells per team grid (upper bound for any AoE expansion).
    pub const GRID_CELLS: usize = (Self::GRID_ROWS as usize) * (Self::GRID_COLS as usize);

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_ROUNDS: u32 = 30;
    /// Level scaling applied to buff values: `1 + (level - 1) * BUFF_LEVEL_SCALING`.
    pub const BUFF_LEVEL_SCALING: f64 = 0.1;

    pub fn new() -> Self {
        Self {
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn with_max_rounds(max_rounds: u32) -> Self {
        Self { max_rounds }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
