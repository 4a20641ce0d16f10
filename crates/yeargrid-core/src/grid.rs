use chrono::{Datelike, Local, NaiveDate};
use tracing::{debug, warn};

use crate::calendar;
use crate::config::{Granularity, GridConfig};
use crate::layout::CELLS_PER_LINE;

pub const WEEKS_PER_YEAR: u32 = 53;
pub const MONTHS_PER_YEAR: u32 = 12;

/// One grid position. Cells are produced in chronological order and never
/// mutated after construction; a configuration change rebuilds the whole
/// sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Zero-based position within the sequence.
    pub index: usize,
    /// Day granularity only.
    pub date: Option<NaiveDate>,
    /// Day granularity only; 0=Sunday..6=Saturday.
    pub day_of_week: Option<u32>,
    /// Day granularity only; 0-based calendar month.
    pub month: Option<u32>,
    /// Day granularity only; 1-based and derived from the visual grid row,
    /// not ISO-8601 week numbering.
    pub week_of_year: Option<u32>,
    /// The cell's unit falls on or before the reference date.
    pub filled: bool,
    /// The cell is exactly the reference date's unit.
    pub active: bool,
    /// Tooltip-grade description, always fully spelled out.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearGrid {
    pub cells: Vec<Cell>,
    /// Empty leading slots before day 1 so weekdays land in fixed lanes.
    /// Always 0..=6; zero for week and month granularity.
    pub leading_offset: u32,
    pub year: i32,
}

impl YearGrid {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn active_cell(&self) -> Option<&Cell> {
        self.cells.iter().find(|c| c.active)
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.filled).count()
    }

    fn empty_fallback() -> Self {
        Self {
            cells: Vec::new(),
            leading_offset: 0,
            year: Local::now().date_naive().year(),
        }
    }
}

/// Builds the full cell sequence for one configuration. Pure: identical
/// configurations produce structurally identical grids.
#[tracing::instrument(level = "debug", skip(cfg), fields(date = %cfg.date, granularity = ?cfg.granularity))]
pub fn build(cfg: &GridConfig) -> YearGrid {
    let Some(reference) = calendar::parse_reference_date(&cfg.date) else {
        warn!(date = %cfg.date, "unparseable reference date; producing an empty grid");
        return YearGrid::empty_fallback();
    };

    let grid = match cfg.granularity {
        Granularity::Day => build_days(reference, cfg.is_monday_first),
        Granularity::Week => build_weeks(reference),
        Granularity::Month => build_months(reference),
    };

    debug!(
        cells = grid.cells.len(),
        leading_offset = grid.leading_offset,
        year = grid.year,
        "built grid"
    );
    grid
}

/// 0-based index of the reference unit within `year`, or `None` when the
/// reference date belongs to a different year (the grid then shows no
/// active cell and no fill).
fn current_day_index(reference: NaiveDate, year: i32) -> Option<u32> {
    if reference.year() == year {
        Some(calendar::day_of_year_index(reference))
    } else {
        None
    }
}

fn build_days(reference: NaiveDate, monday_first: bool) -> YearGrid {
    let year = reference.year();
    let total_days = calendar::days_in_year(year);
    let leading_offset =
        calendar::normalize_leading_offset(calendar::first_weekday_of_year(year), monday_first);
    let current = current_day_index(reference, year);

    let mut cells = Vec::with_capacity(total_days as usize);
    for i in 0..total_days {
        let Some(date) = NaiveDate::from_yo_opt(year, i + 1) else {
            warn!(year, ordinal = i + 1, "skipping unrepresentable day");
            continue;
        };

        let grid_index = i + leading_offset;
        let week = grid_index / CELLS_PER_LINE + 1;

        cells.push(Cell {
            index: cells.len(),
            date: Some(date),
            day_of_week: Some(date.weekday().num_days_from_sunday()),
            month: Some(date.month0()),
            week_of_year: Some(week),
            filled: current.is_some_and(|c| i <= c),
            active: current == Some(i),
            label: format!("{} (Week {week})", date.format("%a %b %-d %Y")),
        });
    }

    YearGrid {
        cells,
        leading_offset,
        year,
    }
}

fn build_weeks(reference: NaiveDate) -> YearGrid {
    let year = reference.year();
    let current = current_day_index(reference, year).map(|day| day / 7);

    let cells = (0..WEEKS_PER_YEAR)
        .map(|i| Cell {
            index: i as usize,
            date: None,
            day_of_week: None,
            month: None,
            week_of_year: None,
            filled: current.is_some_and(|c| i <= c),
            active: current == Some(i),
            label: format!("Week {}", i + 1),
        })
        .collect();

    YearGrid {
        cells,
        leading_offset: 0,
        year,
    }
}

fn build_months(reference: NaiveDate) -> YearGrid {
    let year = reference.year();
    let current = if reference.year() == year {
        Some(reference.month0())
    } else {
        None
    };

    let cells = (0..MONTHS_PER_YEAR)
        .map(|i| Cell {
            index: i as usize,
            date: None,
            day_of_week: None,
            month: None,
            week_of_year: None,
            filled: current.is_some_and(|c| i <= c),
            active: current == Some(i),
            label: calendar::MONTH_NAMES_SHORT[i as usize].to_string(),
        })
        .collect();

    YearGrid {
        cells,
        leading_offset: 0,
        year,
    }
}
