//! Area-of-effect expansion on a team grid.

use arrayvec::ArrayVec;

use crate::config::BattleConfig;
use crate::env::{AreaShape, GroupShape};
use crate::state::GridPosition;

/// Cells covered by an area, at most one full grid.
pub type AreaCells = ArrayVec<GridPosition, { BattleConfig::GRID_CELLS }>;

const CROSS: [(i8, i8); 5] = [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)];

fn push_unique(cells: &mut AreaCells, position: GridPosition) {
    if position.is_in_bounds() && !cells.contains(&position) {
        // Capacity equals the grid size and cells are unique, so this cannot overflow.
        let _ = cells.try_push(position);
    }
}

/// Expands `shape` around `center` (or around `caster` for [`AreaShape::CasterCell`]).
///
/// Cells are clamped to the grid and de-duplicated by `(team, row, col)`;
/// the first cell is always the anchor.
pub fn expand_area(center: GridPosition, shape: AreaShape, caster: GridPosition) -> AreaCells {
    let mut cells = AreaCells::new();
    match shape {
        AreaShape::Single => push_unique(&mut cells, center),
        AreaShape::CasterCell => push_unique(&mut cells, caster),
        AreaShape::Group(GroupShape::Cross | GroupShape::Adjacent) => {
            for (d_row, d_col) in CROSS {
                if let Some(position) = center.offset(d_row, d_col) {
                    push_unique(&mut cells, position);
                }
            }
        }
        AreaShape::Group(GroupShape::Row) => {
            push_unique(&mut cells, center);
            for col in 0..BattleConfig::GRID_COLS {
                push_unique(&mut cells, GridPosition::new(center.team, center.row, col));
            }
        }
        AreaShape::Group(GroupShape::Column) => {
            push_unique(&mut cells, center);
            for row in 0..BattleConfig::GRID_ROWS {
                push_unique(&mut cells, GridPosition::new(center.team, row, center.col));
            }
        }
        AreaShape::Group(GroupShape::Square) => {
            push_unique(&mut cells, center);
            for d_row in -1..=1 {
                for d_col in -1..=1 {
                    if let Some(position) = center.offset(d_row, d_col) {
                        push_unique(&mut cells, position);
                    }
                }
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::state::Team;

    fn cells(list: &[(u8, u8)]) -> BTreeSet<GridPosition> {
        list.iter()
            .map(|&(row, col)| GridPosition::new(Team::Enemy, row, col))
            .collect()
    }

    fn expand(shape: AreaShape, row: u8, col: u8) -> BTreeSet<GridPosition> {
        let caster = GridPosition::new(Team::Player, 0, 0);
        expand_area(GridPosition::new(Team::Enemy, row, col), shape, caster)
            .into_iter()
            .collect()
    }

    #[test]
    fn cross_at_center_covers_five_cells() {
        assert_eq!(
            expand(AreaShape::Group(GroupShape::Cross), 1, 1),
            cells(&[(1, 1), (0, 1), (2, 1), (1, 0), (1, 2)])
        );
    }

    #[test]
    fn cross_in_corner_is_clamped() {
        assert_eq!(
            expand(AreaShape::Group(GroupShape::Cross), 0, 0),
            cells(&[(0, 0), (1, 0), (0, 1)])
        );
    }

    #[test]
    fn adjacent_matches_cross() {
        assert_eq!(
            expand(AreaShape::Group(GroupShape::Adjacent), 2, 1),
            expand(AreaShape::Group(GroupShape::Cross), 2, 1)
        );
    }

    #[test]
    fn row_and_column_span_the_grid() {
        assert_eq!(
            expand(AreaShape::Group(GroupShape::Row), 2, 0),
            cells(&[(2, 0), (2, 1), (2, 2)])
        );
        assert_eq!(
            expand(AreaShape::Group(GroupShape::Column), 0, 2),
            cells(&[(0, 2), (1, 2), (2, 2)])
        );
    }

    #[test]
    fn square_clamps_and_fills() {
        assert_eq!(expand(AreaShape::Group(GroupShape::Square), 1, 1).len(), 9);
        assert_eq!(expand(AreaShape::Group(GroupShape::Square), 0, 0).len(), 4);
    }

    #[test]
    fn caster_cell_ignores_center() {
        let caster = GridPosition::new(Team::Player, 2, 2);
        let area = expand_area(GridPosition::new(Team::Enemy, 0, 0), AreaShape::CasterCell, caster);
        assert_eq!(area.as_slice(), &[caster]);
    }

    #[test]
    fn anchor_is_first() {
        let center = GridPosition::new(Team::Enemy, 1, 2);
        let caster = GridPosition::new(Team::Player, 0, 0);
        let area = expand_area(center, AreaShape::Group(GroupShape::Row), caster);
        assert_eq!(area[0], center);
    }
}
