use tracing::debug;

use crate::config::{Granularity, GridConfig, LayoutMode};
use crate::grid::{self, YearGrid};

/// The configuration fields the builder output actually depends on. Label
/// toggles, colors and the rest of the appearance knobs are resolved at
/// render time and deliberately excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    date: String,
    is_monday_first: bool,
    mode: LayoutMode,
    dot_size: u32,
    gap: u32,
    granularity: Granularity,
}

impl CacheKey {
    fn of(cfg: &GridConfig) -> Self {
        Self {
            date: cfg.date.clone(),
            is_monday_first: cfg.is_monday_first,
            mode: cfg.mode,
            dot_size: cfg.dot_size,
            gap: cfg.gap,
            granularity: cfg.granularity,
        }
    }
}

/// Single-slot memo over [`grid::build`]. Purely an optimization for
/// callers that rebuild on every settings tweak; the builder itself stays a
/// pure function and never sees the cache.
#[derive(Debug, Default)]
pub struct GridCache {
    entry: Option<(CacheKey, YearGrid)>,
}

impl GridCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&mut self, cfg: &GridConfig) -> &YearGrid {
        let key = CacheKey::of(cfg);
        if self.entry.as_ref().map(|(k, _)| k) != Some(&key) {
            debug!(date = %key.date, granularity = ?key.granularity, "grid cache miss");
            self.entry = None;
        }
        let (_, cached) = self.entry.get_or_insert_with(|| (key, grid::build(cfg)));
        cached
    }
}
