use chrono::Datelike;

use crate::calendar::{DAY_NAMES_SHORT, MONTH_NAMES_SHORT};
use crate::config::{ActiveLabelFormat, Granularity, GridConfig};
use crate::grid::Cell;

/// Below this cell size multi-part labels collapse to a single value.
pub const STACKED_MIN_CELL: u32 = 30;
/// Below this cell size week numbers are omitted entirely.
pub const WEEK_LABEL_MIN_CELL: u32 = 20;

/// Display content for one cell. This is what gets drawn inside the cell;
/// the tooltip string on [`Cell`] stays fully descriptive regardless of
/// size constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    /// Nothing to draw.
    Empty,
    /// A single short value.
    Text(String),
    /// Weekday, day number and week number stacked on three lines.
    Stacked {
        top: String,
        middle: String,
        bottom: String,
    },
    /// The cell was asked for a label its data cannot produce; renderers
    /// draw a placeholder instead of aborting the grid.
    Fallback,
}

impl CellContent {
    /// Flattens the content to a single drawable string, `None` for empty.
    pub fn display(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(text) => Some(text.clone()),
            Self::Stacked { top, middle, bottom } => Some(format!("{top} {middle} {bottom}")),
            Self::Fallback => Some("?".to_string()),
        }
    }
}

/// Decides what text, if any, a cell displays. Deterministic and free of
/// side effects; first matching rule wins.
pub fn resolve_label(cell: &Cell, index: usize, cfg: &GridConfig) -> CellContent {
    if cell.active && cfg.show_active_label {
        return match cfg.granularity {
            Granularity::Day => active_day_label(cell, cfg),
            Granularity::Week | Granularity::Month => CellContent::Text((index + 1).to_string()),
        };
    }

    if cfg.granularity != Granularity::Day && cfg.show_months {
        match cfg.granularity {
            Granularity::Month => {
                return match cell.label.chars().next() {
                    Some(initial) => CellContent::Text(initial.to_string()),
                    None => CellContent::Fallback,
                };
            }
            Granularity::Week if cfg.dot_size > WEEK_LABEL_MIN_CELL => {
                return CellContent::Text((index + 1).to_string());
            }
            _ => {}
        }
    }

    CellContent::Empty
}

fn active_day_label(cell: &Cell, cfg: &GridConfig) -> CellContent {
    let Some(date) = cell.date else {
        return CellContent::Fallback;
    };

    let weekday = date.weekday().num_days_from_sunday() as usize;
    let month = date.month0() as usize;

    match cfg.active_label_format {
        ActiveLabelFormat::Day => {
            CellContent::Text(DAY_NAMES_SHORT[weekday % 7][..1].to_string())
        }
        ActiveLabelFormat::Week => match cell.week_of_year {
            Some(week) => CellContent::Text(week.to_string()),
            None => CellContent::Fallback,
        },
        ActiveLabelFormat::Month => {
            CellContent::Text(MONTH_NAMES_SHORT[month % 12].to_string())
        }
        ActiveLabelFormat::MonthDate => {
            if cfg.dot_size < STACKED_MIN_CELL {
                CellContent::Text(format!("{}/{}", date.month(), date.day()))
            } else {
                CellContent::Text(format!("{} {}", MONTH_NAMES_SHORT[month % 12], date.day()))
            }
        }
        ActiveLabelFormat::Full => {
            if cfg.dot_size < STACKED_MIN_CELL {
                // No room for three lines.
                return CellContent::Text(date.day().to_string());
            }
            match cell.week_of_year {
                Some(week) => CellContent::Stacked {
                    top: DAY_NAMES_SHORT[weekday % 7].to_string(),
                    middle: date.day().to_string(),
                    bottom: format!("W{week}"),
                },
                None => CellContent::Fallback,
            }
        }
        ActiveLabelFormat::Date => CellContent::Text(date.day().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ActiveLabelFormat, Granularity, GridConfig, LayoutMode};
    use crate::grid;

    fn day_config(format: ActiveLabelFormat, dot_size: u32) -> GridConfig {
        GridConfig {
            date: "2024-03-15".to_string(),
            granularity: Granularity::Day,
            mode: LayoutMode::Horizontal,
            show_active_label: true,
            active_label_format: format,
            dot_size,
            ..GridConfig::default()
        }
    }

    fn active_cell(cfg: &GridConfig) -> (grid::Cell, usize) {
        let g = grid::build(cfg);
        let cell = g.active_cell().cloned().expect("active cell");
        let index = cell.index;
        (cell, index)
    }

    #[test]
    fn full_format_collapses_on_small_cells() {
        let cfg = day_config(ActiveLabelFormat::Full, 20);
        let (cell, index) = active_cell(&cfg);
        assert_eq!(resolve_label(&cell, index, &cfg), CellContent::Text("15".to_string()));
    }

    #[test]
    fn full_format_stacks_on_large_cells() {
        let cfg = day_config(ActiveLabelFormat::Full, 40);
        let (cell, index) = active_cell(&cfg);
        assert_eq!(
            resolve_label(&cell, index, &cfg),
            CellContent::Stacked {
                top: "Fri".to_string(),
                middle: "15".to_string(),
                bottom: "W11".to_string(),
            }
        );
    }

    #[test]
    fn month_date_switches_between_numeric_and_textual() {
        let cfg = day_config(ActiveLabelFormat::MonthDate, 20);
        let (cell, index) = active_cell(&cfg);
        assert_eq!(
            resolve_label(&cell, index, &cfg),
            CellContent::Text("3/15".to_string())
        );

        let cfg = day_config(ActiveLabelFormat::MonthDate, 40);
        let (cell, index) = active_cell(&cfg);
        assert_eq!(
            resolve_label(&cell, index, &cfg),
            CellContent::Text("Mar 15".to_string())
        );
    }

    #[test]
    fn remaining_day_formats() {
        let cases = [
            (ActiveLabelFormat::Date, "15"),
            (ActiveLabelFormat::Day, "F"),
            (ActiveLabelFormat::Week, "11"),
            (ActiveLabelFormat::Month, "Mar"),
        ];
        for (format, expected) in cases {
            let cfg = day_config(format, 14);
            let (cell, index) = active_cell(&cfg);
            assert_eq!(
                resolve_label(&cell, index, &cfg),
                CellContent::Text(expected.to_string()),
                "{format:?}"
            );
        }
    }

    #[test]
    fn inactive_cells_show_nothing_in_day_view() {
        let cfg = day_config(ActiveLabelFormat::Date, 14);
        let g = grid::build(&cfg);
        assert_eq!(resolve_label(&g.cells[0], 0, &cfg), CellContent::Empty);
    }

    #[test]
    fn active_label_respects_the_toggle() {
        let mut cfg = day_config(ActiveLabelFormat::Date, 14);
        cfg.show_active_label = false;
        let (cell, index) = active_cell(&cfg);
        assert_eq!(resolve_label(&cell, index, &cfg), CellContent::Empty);
    }

    #[test]
    fn week_and_month_active_cells_show_their_ordinal() {
        for granularity in [Granularity::Week, Granularity::Month] {
            let cfg = GridConfig {
                date: "2024-03-15".to_string(),
                granularity,
                show_active_label: true,
                ..GridConfig::default()
            };
            let g = grid::build(&cfg);
            let cell = g.active_cell().cloned().expect("active cell");
            let expected = (cell.index + 1).to_string();
            assert_eq!(
                resolve_label(&cell, cell.index, &cfg),
                CellContent::Text(expected)
            );
        }
    }

    #[test]
    fn month_cells_show_their_initial() {
        let cfg = GridConfig {
            date: "2024-03-15".to_string(),
            granularity: Granularity::Month,
            ..GridConfig::default()
        };
        let g = grid::build(&cfg);
        assert_eq!(
            resolve_label(&g.cells[0], 0, &cfg),
            CellContent::Text("J".to_string())
        );
        assert_eq!(
            resolve_label(&g.cells[8], 8, &cfg),
            CellContent::Text("S".to_string())
        );
    }

    #[test]
    fn week_numbers_hide_below_the_size_threshold() {
        let mut cfg = GridConfig {
            date: "2024-03-15".to_string(),
            granularity: Granularity::Week,
            dot_size: 24,
            ..GridConfig::default()
        };
        let g = grid::build(&cfg);
        assert_eq!(
            resolve_label(&g.cells[0], 0, &cfg),
            CellContent::Text("1".to_string())
        );

        cfg.dot_size = 18;
        assert_eq!(resolve_label(&g.cells[0], 0, &cfg), CellContent::Empty);
    }

    #[test]
    fn malformed_day_cell_falls_back() {
        let cfg = day_config(ActiveLabelFormat::Full, 40);
        let (mut cell, index) = active_cell(&cfg);
        cell.date = None;
        assert_eq!(resolve_label(&cell, index, &cfg), CellContent::Fallback);
        assert_eq!(CellContent::Fallback.display(), Some("?".to_string()));
    }

    #[test]
    fn display_flattens_stacked_content() {
        let content = CellContent::Stacked {
            top: "Fri".to_string(),
            middle: "15".to_string(),
            bottom: "W11".to_string(),
        };
        assert_eq!(content.display(), Some("Fri 15 W11".to_string()));
        assert_eq!(CellContent::Empty.display(), None);
    }
}
