use tracing::debug;

use crate::config::LayoutMode;
use crate::grid::Cell;

/// Fixed cross-axis size of the day grid: seven weekday lanes per line.
/// Every consumer of the grid geometry (month positions, terminal layout,
/// SVG export) goes through this constant and the two helpers below, so the
/// auto-flow math cannot drift apart.
pub const CELLS_PER_LINE: u32 = 7;

/// Line index along the primary axis: the column in horizontal flow, the
/// row in vertical flow.
pub fn grid_line(grid_index: u32) -> u32 {
    grid_index / CELLS_PER_LINE
}

/// Lane index across the primary axis: the weekday row in horizontal flow,
/// the weekday column in vertical flow.
pub fn grid_lane(grid_index: u32) -> u32 {
    grid_index % CELLS_PER_LINE
}

/// Number of lines the day grid occupies, leading offset included.
pub fn line_count(cell_count: usize, leading_offset: u32) -> u32 {
    (leading_offset + cell_count as u32).div_ceil(CELLS_PER_LINE)
}

/// Pixel offset of each month's first appearance along the primary axis.
///
/// Scans the cells in order and records, per month, the offset of the line
/// holding that month's first day. The line index is the same floor
/// division in both flow directions; `mode` only decides which axis the
/// offset applies to. Cells without month data (week and month granularity)
/// leave the table at zero.
pub fn resolve_month_positions(
    cells: &[Cell],
    leading_offset: u32,
    mode: LayoutMode,
    cell_size: u32,
    gap: u32,
) -> [u32; 12] {
    let mut positions = [0u32; 12];
    let mut seen = [false; 12];
    let step = cell_size + gap;

    for cell in cells {
        let Some(month) = cell.month else { continue };
        let slot = month as usize;
        if slot >= positions.len() || seen[slot] {
            continue;
        }
        seen[slot] = true;
        let grid_index = cell.index as u32 + leading_offset;
        positions[slot] = grid_line(grid_index) * step;
    }

    debug!(?mode, resolved = seen.iter().filter(|s| **s).count(), "resolved month positions");
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Granularity, GridConfig, LayoutMode};
    use crate::grid;

    fn day_grid(date: &str) -> grid::YearGrid {
        grid::build(&GridConfig {
            date: date.to_string(),
            granularity: Granularity::Day,
            ..GridConfig::default()
        })
    }

    #[test]
    fn lines_and_lanes_partition_the_grid() {
        assert_eq!(grid_line(0), 0);
        assert_eq!(grid_lane(0), 0);
        assert_eq!(grid_line(6), 0);
        assert_eq!(grid_line(7), 1);
        assert_eq!(grid_lane(7), 0);
        assert_eq!(grid_lane(13), 6);
    }

    #[test]
    fn line_count_includes_the_leading_offset() {
        // 366 days starting one lane in: indices 1..=366, last line 52.
        assert_eq!(line_count(366, 1), 53);
        assert_eq!(line_count(365, 0), 53);
        assert_eq!(line_count(366, 6), 54);
        assert_eq!(line_count(0, 0), 0);
    }

    #[test]
    fn january_sits_at_the_origin() {
        let g = day_grid("2024-03-15");
        let positions =
            resolve_month_positions(&g.cells, g.leading_offset, LayoutMode::Horizontal, 14, 4);
        assert_eq!(positions[0], 0);
    }

    #[test]
    fn known_month_offsets_for_2024() {
        // Leading offset 1 (Sunday-first): Feb 1 is day index 31, grid index
        // 32, line 4; Mar 1 is day index 60, grid index 61, line 8.
        let g = day_grid("2024-03-15");
        let positions =
            resolve_month_positions(&g.cells, g.leading_offset, LayoutMode::Horizontal, 14, 4);
        assert_eq!(positions[1], 4 * 18);
        assert_eq!(positions[2], 8 * 18);
        assert_eq!(positions[11], 48 * 18);
    }

    #[test]
    fn positions_are_non_decreasing() {
        for date in ["2024-03-15", "2023-01-01", "2021-12-31"] {
            let g = day_grid(date);
            let positions =
                resolve_month_positions(&g.cells, g.leading_offset, LayoutMode::Horizontal, 14, 4);
            for pair in positions.windows(2) {
                assert!(pair[0] <= pair[1], "{date}: {positions:?}");
            }
        }
    }

    #[test]
    fn both_flow_directions_share_the_formula() {
        let g = day_grid("2024-03-15");
        let horizontal =
            resolve_month_positions(&g.cells, g.leading_offset, LayoutMode::Horizontal, 14, 4);
        let vertical =
            resolve_month_positions(&g.cells, g.leading_offset, LayoutMode::Vertical, 14, 4);
        assert_eq!(horizontal, vertical);
    }

    #[test]
    fn non_day_grids_resolve_to_zero() {
        let g = grid::build(&GridConfig {
            date: "2024-03-15".to_string(),
            granularity: Granularity::Week,
            ..GridConfig::default()
        });
        let positions =
            resolve_month_positions(&g.cells, g.leading_offset, LayoutMode::Horizontal, 14, 4);
        assert_eq!(positions, [0; 12]);
    }

    #[test]
    fn zero_metrics_collapse_the_table() {
        let g = day_grid("2024-03-15");
        let positions =
            resolve_month_positions(&g.cells, g.leading_offset, LayoutMode::Horizontal, 0, 0);
        assert_eq!(positions, [0; 12]);
    }
}
