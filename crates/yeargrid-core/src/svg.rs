use crate::calendar::MONTH_NAMES_SHORT;
use crate::config::{Granularity, GridConfig, LayoutMode};
use crate::grid::{Cell, YearGrid};
use crate::label::{self, CellContent};
use crate::layout;

const PADDING: u32 = 48;
const WATERMARK_OPACITY: &str = "0.05";

/// Renders the grid as a standalone SVG document.
pub fn render_svg(grid: &YearGrid, cfg: &GridConfig) -> String {
    let geo = Geometry::of(grid, cfg);
    let mut out = String::new();

    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" \
         viewBox=\"0 0 {w} {h}\" font-family=\"{font}\">\n",
        w = geo.width,
        h = geo.height,
        font = xml_escape(&cfg.font_family),
    ));

    if !cfg.transparent_bg {
        out.push_str(&format!(
            "  <rect width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
            geo.width,
            geo.height,
            xml_escape(&cfg.colors.bg),
        ));
    }

    if cfg.show_year_label && !grid.is_empty() {
        let size = watermark_size(grid, cfg);
        out.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"{size}\" font-weight=\"700\" \
             fill=\"{}\" opacity=\"{WATERMARK_OPACITY}\" text-anchor=\"middle\" \
             dominant-baseline=\"middle\">{}</text>\n",
            geo.width / 2,
            geo.height / 2,
            xml_escape(&cfg.colors.text),
            grid.year,
        ));
    }

    if cfg.granularity == Granularity::Day {
        write_month_labels(&mut out, grid, cfg, &geo);
        write_day_labels(&mut out, cfg, &geo);
    }

    for (index, cell) in grid.cells.iter().enumerate() {
        let (x, y) = geo.cell_origin(index, cfg);
        write_cell(&mut out, cell, index, cfg, x, y);
    }

    out.push_str("</svg>\n");
    out
}

struct Geometry {
    width: u32,
    height: u32,
    origin_x: u32,
    origin_y: u32,
    step: u32,
    leading_offset: u32,
    per_line: u32,
}

impl Geometry {
    fn of(grid: &YearGrid, cfg: &GridConfig) -> Self {
        let step = cfg.dot_size + cfg.gap;
        let day_label_w = cfg.font_size * 5 / 2;
        let day_label_h = cfg.font_size * 3 / 2;
        let month_label_w = cfg.font_size * 3;
        let month_label_h = cfg.font_size * 3 / 2;

        let (lines, per_line) = match cfg.granularity {
            Granularity::Day => (
                layout::line_count(grid.cells.len(), grid.leading_offset),
                layout::CELLS_PER_LINE,
            ),
            Granularity::Week | Granularity::Month => {
                let per = cfg.items_per_row.max(1);
                ((grid.cells.len() as u32).div_ceil(per), per)
            }
        };

        let (gutter_x, gutter_y) = if cfg.granularity == Granularity::Day {
            match cfg.mode {
                LayoutMode::Horizontal => (
                    if cfg.show_days { day_label_w + cfg.gap * 2 } else { 0 },
                    if cfg.show_months { month_label_h + cfg.gap } else { 0 },
                ),
                LayoutMode::Vertical => (
                    if cfg.show_months { month_label_w + cfg.gap * 2 } else { 0 },
                    if cfg.show_days { day_label_h + cfg.gap } else { 0 },
                ),
            }
        } else {
            (0, 0)
        };

        // The day grid auto-flows along its primary axis (weeks become
        // columns in horizontal mode); the wrapped views flow across it.
        let (cols, rows) = match (cfg.granularity, cfg.mode) {
            (Granularity::Day, LayoutMode::Horizontal) => (lines, layout::CELLS_PER_LINE),
            (Granularity::Day, LayoutMode::Vertical) => (layout::CELLS_PER_LINE, lines),
            (_, LayoutMode::Horizontal) => (per_line, lines),
            (_, LayoutMode::Vertical) => (lines, per_line),
        };
        let grid_w = (cols * step).saturating_sub(cfg.gap).max(cfg.dot_size);
        let grid_h = (rows * step).saturating_sub(cfg.gap).max(cfg.dot_size);

        let origin_x = PADDING + gutter_x;
        let origin_y = PADDING + gutter_y;

        Self {
            width: origin_x + grid_w + PADDING,
            height: origin_y + grid_h + PADDING,
            origin_x,
            origin_y,
            step,
            leading_offset: grid.leading_offset,
            per_line,
        }
    }

    fn cell_origin(&self, index: usize, cfg: &GridConfig) -> (u32, u32) {
        let (line, lane) = if cfg.granularity == Granularity::Day {
            let grid_index = index as u32 + self.leading_offset;
            (layout::grid_line(grid_index), layout::grid_lane(grid_index))
        } else {
            let i = index as u32;
            (i / self.per_line, i % self.per_line)
        };

        match cfg.mode {
            LayoutMode::Horizontal if cfg.granularity == Granularity::Day => (
                self.origin_x + line * self.step,
                self.origin_y + lane * self.step,
            ),
            LayoutMode::Vertical if cfg.granularity == Granularity::Day => (
                self.origin_x + lane * self.step,
                self.origin_y + line * self.step,
            ),
            LayoutMode::Horizontal => (
                self.origin_x + lane * self.step,
                self.origin_y + line * self.step,
            ),
            LayoutMode::Vertical => (
                self.origin_x + line * self.step,
                self.origin_y + lane * self.step,
            ),
        }
    }
}

fn write_month_labels(out: &mut String, grid: &YearGrid, cfg: &GridConfig, geo: &Geometry) {
    if !cfg.show_months || grid.is_empty() {
        return;
    }
    let positions = layout::resolve_month_positions(
        &grid.cells,
        grid.leading_offset,
        cfg.mode,
        cfg.dot_size,
        cfg.gap,
    );

    for (month, &pos) in positions.iter().enumerate() {
        let name = MONTH_NAMES_SHORT[month];
        match cfg.mode {
            LayoutMode::Horizontal => {
                out.push_str(&format!(
                    "  <text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"{}\">{name}</text>\n",
                    geo.origin_x + pos,
                    PADDING + cfg.font_size,
                    cfg.font_size,
                    xml_escape(&cfg.colors.text),
                ));
            }
            LayoutMode::Vertical => {
                out.push_str(&format!(
                    "  <text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"{}\" \
                     text-anchor=\"end\">{name}</text>\n",
                    geo.origin_x.saturating_sub(cfg.gap * 2),
                    geo.origin_y + pos + cfg.font_size,
                    cfg.font_size,
                    xml_escape(&cfg.colors.text),
                ));
            }
        }
    }
}

fn write_day_labels(out: &mut String, cfg: &GridConfig, geo: &Geometry) {
    if !cfg.show_days {
        return;
    }

    match cfg.mode {
        LayoutMode::Horizontal => {
            let labels: [&str; 7] = if cfg.is_monday_first {
                ["Mon", "", "Wed", "", "Fri", "", ""]
            } else {
                ["", "Mon", "", "Wed", "", "Fri", ""]
            };
            for (lane, name) in labels.iter().enumerate() {
                if name.is_empty() {
                    continue;
                }
                out.push_str(&format!(
                    "  <text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"{}\" \
                     text-anchor=\"end\">{name}</text>\n",
                    geo.origin_x.saturating_sub(cfg.gap * 2),
                    geo.origin_y + lane as u32 * geo.step + cfg.dot_size / 2 + cfg.font_size / 3,
                    cfg.font_size,
                    xml_escape(&cfg.colors.text),
                ));
            }
        }
        LayoutMode::Vertical => {
            let labels: [&str; 7] = if cfg.is_monday_first {
                ["M", "T", "W", "T", "F", "S", "S"]
            } else {
                ["S", "M", "T", "W", "T", "F", "S"]
            };
            for (lane, name) in labels.iter().enumerate() {
                out.push_str(&format!(
                    "  <text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"{}\" \
                     text-anchor=\"middle\">{name}</text>\n",
                    geo.origin_x + lane as u32 * geo.step + cfg.dot_size / 2,
                    PADDING + cfg.font_size,
                    cfg.font_size,
                    xml_escape(&cfg.colors.text),
                ));
            }
        }
    }
}

fn write_cell(out: &mut String, cell: &Cell, index: usize, cfg: &GridConfig, x: u32, y: u32) {
    let fill = if cell.filled {
        &cfg.colors.fill
    } else {
        &cfg.colors.empty
    };

    out.push_str(&format!(
        "  <rect x=\"{x}\" y=\"{y}\" width=\"{size}\" height=\"{size}\" rx=\"{rx}\" \
         fill=\"{fill}\"><title>{title}</title></rect>\n",
        size = cfg.dot_size,
        rx = cfg.radius,
        fill = xml_escape(fill),
        title = xml_escape(&cell.label),
    ));

    let content = label::resolve_label(cell, index, cfg);
    let text_fill = if cell.filled {
        &cfg.colors.bg
    } else {
        &cfg.colors.text
    };
    let font = (cfg.dot_size * 2 / 5).max(8);
    let cx = x + cfg.dot_size / 2;
    let cy = y + cfg.dot_size / 2;

    match content {
        CellContent::Empty => {}
        CellContent::Text(text) => {
            write_cell_text(out, &xml_escape(&text), cx, cy, font, &xml_escape(text_fill));
        }
        CellContent::Fallback => {
            write_cell_text(out, "?", cx, cy, font, &xml_escape(text_fill));
        }
        CellContent::Stacked { top, middle, bottom } => {
            let small = (font * 7 / 10).max(6);
            out.push_str(&format!(
                "  <text x=\"{cx}\" y=\"{cy}\" fill=\"{fill}\" text-anchor=\"middle\" \
                 dominant-baseline=\"middle\">\
                 <tspan x=\"{cx}\" dy=\"-{offset}\" font-size=\"{small}\">{top}</tspan>\
                 <tspan x=\"{cx}\" dy=\"{offset}\" font-size=\"{font}\" \
                 font-weight=\"bold\">{middle}</tspan>\
                 <tspan x=\"{cx}\" dy=\"{offset}\" font-size=\"{small}\">{bottom}</tspan>\
                 </text>\n",
                fill = xml_escape(text_fill),
                offset = cfg.dot_size * 3 / 10,
                top = xml_escape(&top),
                middle = xml_escape(&middle),
                bottom = xml_escape(&bottom),
            ));
        }
    }
}

fn write_cell_text(out: &mut String, text: &str, cx: u32, cy: u32, font: u32, fill: &str) {
    out.push_str(&format!(
        "  <text x=\"{cx}\" y=\"{cy}\" font-size=\"{font}\" font-weight=\"bold\" \
         fill=\"{fill}\" text-anchor=\"middle\" dominant-baseline=\"middle\">{text}</text>\n",
    ));
}

fn watermark_size(grid: &YearGrid, cfg: &GridConfig) -> u32 {
    let scaled = if grid.cells.len() > 20 {
        cfg.dot_size * 10
    } else {
        cfg.dot_size * 4
    };
    scaled.max(100)
}

fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ActiveLabelFormat, Granularity, GridConfig, LayoutMode};
    use crate::grid;

    fn day_config() -> GridConfig {
        GridConfig {
            date: "2024-03-15".to_string(),
            ..GridConfig::default()
        }
    }

    #[test]
    fn document_contains_every_cell() {
        let cfg = day_config();
        let g = grid::build(&cfg);
        let svg = render_svg(&g, &cfg);
        // One background rect plus one rect per day.
        assert_eq!(svg.matches("<rect").count(), 367);
        assert!(svg.starts_with("<svg xmlns"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn month_labels_and_watermark_are_present() {
        let cfg = day_config();
        let g = grid::build(&cfg);
        let svg = render_svg(&g, &cfg);
        assert!(svg.contains(">Jan</text>"));
        assert!(svg.contains(">Dec</text>"));
        assert!(svg.contains(">2024</text>"));
    }

    #[test]
    fn transparent_background_omits_the_backdrop() {
        let mut cfg = day_config();
        cfg.transparent_bg = true;
        let g = grid::build(&cfg);
        let svg = render_svg(&g, &cfg);
        assert!(!svg.contains(&format!("fill=\"{}\"/>", cfg.colors.bg)));
    }

    #[test]
    fn tooltips_carry_the_descriptive_label() {
        let cfg = day_config();
        let g = grid::build(&cfg);
        let svg = render_svg(&g, &cfg);
        assert!(svg.contains("<title>Fri Mar 15 2024 (Week 11)</title>"));
    }

    #[test]
    fn active_label_renders_as_text() {
        let mut cfg = day_config();
        cfg.show_active_label = true;
        cfg.active_label_format = ActiveLabelFormat::MonthDate;
        cfg.dot_size = 40;
        let g = grid::build(&cfg);
        let svg = render_svg(&g, &cfg);
        assert!(svg.contains(">Mar 15</text>"));
    }

    #[test]
    fn stacked_label_renders_three_tspans() {
        let mut cfg = day_config();
        cfg.show_active_label = true;
        cfg.active_label_format = ActiveLabelFormat::Full;
        cfg.dot_size = 40;
        let g = grid::build(&cfg);
        let svg = render_svg(&g, &cfg);
        assert!(svg.contains(">Fri</tspan>"));
        assert!(svg.contains(">W11</tspan>"));
    }

    #[test]
    fn vertical_mode_swaps_the_axes() {
        let mut cfg = day_config();
        cfg.mode = LayoutMode::Vertical;
        let g = grid::build(&cfg);
        let geo = Geometry::of(&g, &cfg);
        assert!(geo.height > geo.width);

        cfg.mode = LayoutMode::Horizontal;
        let geo = Geometry::of(&g, &cfg);
        assert!(geo.width > geo.height);
    }

    #[test]
    fn month_view_wraps_at_items_per_row() {
        let cfg = GridConfig {
            date: "2024-03-15".to_string(),
            granularity: Granularity::Month,
            items_per_row: 4,
            ..GridConfig::default()
        };
        let g = grid::build(&cfg);
        let geo = Geometry::of(&g, &cfg);
        // 4 columns by 3 rows of cells.
        let step = cfg.dot_size + cfg.gap;
        assert_eq!(geo.width, PADDING * 2 + 4 * step - cfg.gap);
        assert_eq!(geo.height, PADDING * 2 + 3 * step - cfg.gap);
    }

    #[test]
    fn font_family_is_escaped() {
        let mut cfg = day_config();
        cfg.font_family = "\"Inter\" & friends".to_string();
        let g = grid::build(&cfg);
        let svg = render_svg(&g, &cfg);
        assert!(svg.contains("&quot;Inter&quot; &amp; friends"));
    }
}
