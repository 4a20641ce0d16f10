use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use chrono::Local;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::calendar;
use crate::config::{ActiveLabelFormat, Granularity, GridConfig, LayoutMode};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "yeargrid",
    version,
    about = "Yeargrid: render a year-progress calendar grid",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    /// Path to the configuration file.
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Seed the configuration from a share token instead of the config file.
    #[arg(long = "from", value_name = "TOKEN")]
    pub from: Option<String>,

    /// Reference date expression (today, 2024-03-15, march, +10d, ...).
    #[arg(long = "date", value_name = "EXPR")]
    pub date: Option<String>,

    #[arg(long = "granularity", value_enum)]
    pub granularity: Option<Granularity>,

    #[arg(long = "layout", value_enum)]
    pub layout: Option<LayoutMode>,

    /// Start weeks on Monday instead of Sunday.
    #[arg(long = "monday-first")]
    pub monday_first: bool,

    /// Wrap width for the week and month views.
    #[arg(long = "items-per-row", value_name = "N")]
    pub items_per_row: Option<u32>,

    /// Cell edge length in pixels.
    #[arg(long = "cell-size", value_name = "PX")]
    pub cell_size: Option<u32>,

    /// Gap between cells in pixels.
    #[arg(long = "gap", value_name = "PX")]
    pub gap: Option<u32>,

    /// Label the active cell with the given format (implies the toggle).
    #[arg(long = "active-label", value_enum, value_name = "FORMAT")]
    pub active_label: Option<ActiveLabelFormat>,

    /// Hide month labels (and cell labels in week/month views).
    #[arg(long = "no-months")]
    pub no_months: bool,

    /// Hide weekday labels.
    #[arg(long = "no-days")]
    pub no_days: bool,

    /// Hide the year watermark.
    #[arg(long = "no-year")]
    pub no_year: bool,

    /// Color output: on, off (default: auto-detect).
    #[arg(long = "color", value_name = "WHEN")]
    pub color: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render the grid to the terminal (the default).
    Show,
    /// Print a shareable link embedding the full configuration.
    Share {
        /// Base URL for the link.
        #[arg(long, default_value = "https://yeargrid.app")]
        base: String,
        /// Link to the standalone image view.
        #[arg(long)]
        image: bool,
    },
    /// Write the rendered grid as a standalone SVG.
    Export {
        /// Output path; defaults to year-grid-<date>.svg.
        #[arg(short = 'o', long = "out")]
        out: Option<PathBuf>,
    },
    /// Persist the effective configuration to the config file.
    Save,
    /// Print the effective configuration as TOML.
    Config,
}

impl GlobalCli {
    /// Folds the command-line overrides into a loaded configuration.
    #[tracing::instrument(skip(self, cfg))]
    pub fn apply_to(&self, cfg: &mut GridConfig) -> anyhow::Result<()> {
        if let Some(expr) = &self.date {
            let today = Local::now().date_naive();
            let date = calendar::parse_date_expr(expr, today)
                .with_context(|| format!("invalid --date expression: {expr}"))?;
            cfg.date = date.format("%Y-%m-%d").to_string();
            debug!(date = %cfg.date, "resolved reference date");
        }
        if let Some(granularity) = self.granularity {
            cfg.granularity = granularity;
        }
        if let Some(layout) = self.layout {
            cfg.mode = layout;
        }
        if self.monday_first {
            cfg.is_monday_first = true;
        }
        if let Some(items_per_row) = self.items_per_row {
            cfg.items_per_row = items_per_row;
        }
        if let Some(cell_size) = self.cell_size {
            cfg.dot_size = cell_size;
        }
        if let Some(gap) = self.gap {
            cfg.gap = gap;
        }
        if let Some(format) = self.active_label {
            cfg.show_active_label = true;
            cfg.active_label_format = format;
        }
        if self.no_months {
            cfg.show_months = false;
        }
        if self.no_days {
            cfg.show_days = false;
        }
        if self.no_year {
            cfg.show_year_label = false;
        }
        Ok(())
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
