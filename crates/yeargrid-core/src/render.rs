use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use unicode_width::UnicodeWidthStr;

use crate::calendar::MONTH_NAMES_SHORT;
use crate::config::{Granularity, GridConfig, LayoutMode};
use crate::grid::YearGrid;
use crate::label;
use crate::layout;

const FILLED_GLYPH: &str = "■";
const EMPTY_GLYPH: &str = "·";
const ACTIVE_GLYPH: &str = "◆";
const GUTTER_WIDTH: usize = 3;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color_flag: Option<&str>) -> anyhow::Result<Self> {
        let color = match color_flag.map(|s| s.to_ascii_lowercase()) {
            None => io::stdout().is_terminal(),
            Some(value) => match value.as_str() {
                "on" | "yes" | "true" | "1" => true,
                "off" | "no" | "false" | "0" => false,
                other => return Err(anyhow!("invalid color setting: {other}")),
            },
        };

        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, grid, cfg))]
    pub fn print_grid(&mut self, grid: &YearGrid, cfg: &GridConfig) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_grid(&mut out, grid, cfg)
    }

    pub fn write_grid<W: Write>(
        &self,
        writer: &mut W,
        grid: &YearGrid,
        cfg: &GridConfig,
    ) -> anyhow::Result<()> {
        if grid.is_empty() {
            writeln!(writer, "{} · (no data)", grid.year)?;
            return Ok(());
        }

        match cfg.granularity {
            Granularity::Day => match cfg.mode {
                LayoutMode::Horizontal => self.write_day_horizontal(writer, grid, cfg)?,
                LayoutMode::Vertical => self.write_day_vertical(writer, grid, cfg)?,
            },
            Granularity::Week | Granularity::Month => self.write_wrapped(writer, grid, cfg)?,
        }

        writeln!(writer)?;
        writeln!(writer, "{}", self.summary_line(grid, cfg))?;
        Ok(())
    }

    /// Weeks flow left to right, weekdays stack top to bottom.
    fn write_day_horizontal<W: Write>(
        &self,
        writer: &mut W,
        grid: &YearGrid,
        cfg: &GridConfig,
    ) -> anyhow::Result<()> {
        let lines = layout::line_count(grid.cells.len(), grid.leading_offset);
        // Terminal metrics: one glyph plus one space per lane.
        let positions =
            layout::resolve_month_positions(&grid.cells, grid.leading_offset, cfg.mode, 1, 1);
        let gutter = if cfg.show_days { GUTTER_WIDTH + 2 } else { 0 };

        if cfg.show_months {
            let header = month_header(&positions, lines as usize * 2);
            writeln!(writer, "{}{}", " ".repeat(gutter), header.trim_end())?;
        }

        for lane in 0..layout::CELLS_PER_LINE {
            let mut row = String::new();
            if cfg.show_days {
                let name = gutter_day_label(lane, cfg.is_monday_first);
                row.push_str(&format!("{name:>width$}  ", width = GUTTER_WIDTH));
            }
            for line in 0..lines {
                let grid_index = line * layout::CELLS_PER_LINE + lane;
                row.push_str(&self.day_slot(grid, grid_index));
            }
            writeln!(writer, "{}", row.trim_end())?;
        }

        Ok(())
    }

    /// Weeks flow top to bottom, weekdays run left to right.
    fn write_day_vertical<W: Write>(
        &self,
        writer: &mut W,
        grid: &YearGrid,
        cfg: &GridConfig,
    ) -> anyhow::Result<()> {
        let lines = layout::line_count(grid.cells.len(), grid.leading_offset);
        // One text row per line, so the primary-axis step is a single row.
        let positions =
            layout::resolve_month_positions(&grid.cells, grid.leading_offset, cfg.mode, 1, 0);
        let gutter = if cfg.show_months { GUTTER_WIDTH + 2 } else { 0 };

        if cfg.show_days {
            let mut header = " ".repeat(gutter);
            for lane in 0..layout::CELLS_PER_LINE {
                header.push_str(single_day_letter(lane, cfg.is_monday_first));
                header.push(' ');
            }
            writeln!(writer, "{}", header.trim_end())?;
        }

        for line in 0..lines {
            let mut row = String::new();
            if cfg.show_months {
                let name = positions
                    .iter()
                    .position(|&p| p == line)
                    .filter(|&m| month_first_line(&positions, m))
                    .map(|m| MONTH_NAMES_SHORT[m])
                    .unwrap_or("");
                row.push_str(&format!("{name:>width$}  ", width = GUTTER_WIDTH));
            }
            for lane in 0..layout::CELLS_PER_LINE {
                let grid_index = line * layout::CELLS_PER_LINE + lane;
                row.push_str(&self.day_slot(grid, grid_index));
            }
            writeln!(writer, "{}", row.trim_end())?;
        }

        Ok(())
    }

    fn day_slot(&self, grid: &YearGrid, grid_index: u32) -> String {
        let total = grid.leading_offset + grid.cells.len() as u32;
        if grid_index < grid.leading_offset || grid_index >= total {
            return "  ".to_string();
        }
        let cell = &grid.cells[(grid_index - grid.leading_offset) as usize];
        let glyph = if cell.active {
            self.paint(ACTIVE_GLYPH, "1;33")
        } else if cell.filled {
            self.paint(FILLED_GLYPH, "33")
        } else {
            EMPTY_GLYPH.to_string()
        };
        format!("{glyph} ")
    }

    /// Week and month views wrap at `items_per_row` along the primary axis.
    fn write_wrapped<W: Write>(
        &self,
        writer: &mut W,
        grid: &YearGrid,
        cfg: &GridConfig,
    ) -> anyhow::Result<()> {
        let per_line = cfg.items_per_row.max(1) as usize;
        let slot = slot_width(grid, cfg);
        let (rows, cols) = match cfg.mode {
            LayoutMode::Horizontal => (grid.cells.len().div_ceil(per_line), per_line),
            LayoutMode::Vertical => (per_line, grid.cells.len().div_ceil(per_line)),
        };

        for text_row in 0..rows {
            let mut row = String::new();
            for text_col in 0..cols {
                let index = match cfg.mode {
                    LayoutMode::Horizontal => text_row * cols + text_col,
                    LayoutMode::Vertical => text_col * rows + text_row,
                };
                let Some(cell) = grid.cells.get(index) else {
                    continue;
                };
                let text = match label::resolve_label(cell, index, cfg).display() {
                    Some(text) => text,
                    None => glyph_for(cell).to_string(),
                };
                let padding = slot.saturating_sub(UnicodeWidthStr::width(text.as_str()));
                let painted = if cell.active {
                    self.paint(&text, "1;33")
                } else if cell.filled {
                    self.paint(&text, "33")
                } else {
                    text
                };
                row.push_str(&painted);
                row.push_str(&" ".repeat(padding + 1));
            }
            writeln!(writer, "{}", row.trim_end())?;
        }

        Ok(())
    }

    fn summary_line(&self, grid: &YearGrid, cfg: &GridConfig) -> String {
        let total = grid.cells.len();
        let filled = grid.filled_count();
        let unit = match cfg.granularity {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        };
        let percent = if total == 0 {
            0.0
        } else {
            filled as f64 / total as f64 * 100.0
        };

        let mut line = format!("{} · {unit} {filled}/{total} · {percent:.1}%", grid.year);
        if cfg.show_active_label {
            if let Some(active) = grid.active_cell() {
                line.push_str(&format!(" · {}", active.label));
            }
        }
        line
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn glyph_for(cell: &crate::grid::Cell) -> &'static str {
    if cell.active {
        ACTIVE_GLYPH
    } else if cell.filled {
        FILLED_GLYPH
    } else {
        EMPTY_GLYPH
    }
}

/// Widest display label in the grid, so wrapped views stay aligned.
fn slot_width(grid: &YearGrid, cfg: &GridConfig) -> usize {
    grid.cells
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| label::resolve_label(cell, i, cfg).display())
        .map(|text| UnicodeWidthStr::width(text.as_str()))
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Lays month names into a character buffer at their resolved offsets,
/// dropping a name when the previous one has not finished.
fn month_header(positions: &[u32; 12], width: usize) -> String {
    let mut header = String::new();
    for (month, &pos) in positions.iter().enumerate() {
        let pos = pos as usize;
        if !month_first_line(positions, month) {
            continue;
        }
        let written = UnicodeWidthStr::width(header.as_str());
        if pos < written || pos >= width {
            continue;
        }
        header.push_str(&" ".repeat(pos - written));
        header.push_str(MONTH_NAMES_SHORT[month]);
    }
    header
}

/// True when `month` is the first month resolved to its position; later
/// months that collapse onto an earlier line (degenerate metrics) stay
/// unlabeled.
fn month_first_line(positions: &[u32; 12], month: usize) -> bool {
    positions
        .iter()
        .take(month)
        .all(|&earlier| earlier != positions[month])
}

fn gutter_day_label(lane: u32, monday_first: bool) -> &'static str {
    let labels: [&str; 7] = if monday_first {
        ["Mon", "", "Wed", "", "Fri", "", ""]
    } else {
        ["", "Mon", "", "Wed", "", "Fri", ""]
    };
    labels[(lane % 7) as usize]
}

fn single_day_letter(lane: u32, monday_first: bool) -> &'static str {
    let labels: [&str; 7] = if monday_first {
        ["M", "T", "W", "T", "F", "S", "S"]
    } else {
        ["S", "M", "T", "W", "T", "F", "S"]
    };
    labels[(lane % 7) as usize]
}
