use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const CONFIG_FILE: &str = "yeargrid.toml";
const CONFIG_ENV_VAR: &str = "YEARGRID_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ActiveLabelFormat {
    Date,
    Day,
    Week,
    Month,
    MonthDate,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Palette {
    pub bg: String,
    pub text: String,
    pub empty: String,
    pub fill: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bg: "#0a0a0a".to_string(),
            text: "#525252".to_string(),
            empty: "#1f1f1f".to_string(),
            fill: "#ea580c".to_string(),
        }
    }
}

/// Flat configuration snapshot. Field names serialize in camelCase so the
/// same JSON document round-trips through share tokens and saved files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    /// Reference date as `YYYY-MM-DD`. Unparseable values degrade to an
    /// empty grid instead of failing.
    pub date: String,
    pub mode: LayoutMode,
    pub granularity: Granularity,
    /// Wrap width for the week and month views.
    pub items_per_row: u32,
    pub is_monday_first: bool,
    /// For the day view this toggles the floating month labels; for week and
    /// month views it doubles as the on-cell label toggle.
    pub show_months: bool,
    pub show_days: bool,
    pub show_year_label: bool,
    pub show_active_label: bool,
    pub active_label_format: ActiveLabelFormat,
    pub dot_size: u32,
    pub gap: u32,
    pub radius: u32,
    pub font_size: u32,
    pub font_family: String,
    pub colors: Palette,
    pub transparent_bg: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            mode: LayoutMode::Horizontal,
            granularity: Granularity::Day,
            items_per_row: 12,
            is_monday_first: false,
            show_months: true,
            show_days: true,
            show_year_label: true,
            show_active_label: false,
            active_label_format: ActiveLabelFormat::Date,
            dot_size: 14,
            gap: 4,
            radius: 2,
            font_size: 10,
            font_family: "'Inter', sans-serif".to_string(),
            colors: Palette::default(),
            transparent_bg: false,
        }
    }
}

impl GridConfig {
    /// Loads the configuration file, falling back to defaults when no file
    /// exists. Resolution order: explicit override, `YEARGRID_CONFIG`, then
    /// `<config dir>/yeargrid/yeargrid.toml`.
    #[tracing::instrument(skip(path_override))]
    pub fn load(path_override: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = resolve_config_path(path_override) else {
            warn!("cannot determine config directory; using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            info!(file = %path.display(), "config file not found; using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let cfg: Self = toml::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        info!(file = %path.display(), "loaded config file");
        Ok(cfg)
    }

    /// Writes the effective configuration back to the config file and
    /// returns the path written.
    #[tracing::instrument(skip(self, path_override))]
    pub fn save(&self, path_override: Option<&Path>) -> anyhow::Result<PathBuf> {
        let path = resolve_config_path(path_override)
            .ok_or_else(|| anyhow!("cannot determine config directory"))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let text = self.to_toml()?;
        fs::write(&path, text)
            .with_context(|| format!("failed to write {}", path.display()))?;

        debug!(file = %path.display(), "saved config file");
        Ok(path)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("failed to serialize configuration")
    }
}

fn resolve_config_path(path_override: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = path_override {
        return Some(path.to_path_buf());
    }

    if let Ok(raw) = std::env::var(CONFIG_ENV_VAR) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    dirs::config_dir().map(|dir| dir.join("yeargrid").join(CONFIG_FILE))
}
