//! Decides whether a cell's archived rows already cover an issuance window.
//!
//! This is the collector's only skip mechanism: a cell whose rows meet the
//! threshold is not requested again for that window.

use crate::archive::forecast_archive::{ForecastArchive, WindowCounts};
use crate::types::forecast_kind::ForecastKind;
use crate::types::grid_cell::GridCell;
use crate::types::issuance_window::IssuanceWindow;

/// One `SKY` row per lead hour of the ultra-short horizon.
pub const ULTRA_SHORT_MIN_ROWS: usize = 6;

/// Three days of `SKY` rows at one-hour resolution.
pub const SHORT_TERM_MIN_ROWS: usize = 72;

/// Row totals that archives written before the single-category layout
/// reached for a complete window. Accepted as complete as they are.
pub const LEGACY_COMPLETE_TOTALS: [usize; 2] = [835, 943];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletenessChecker {
    ultra_short_min_rows: usize,
    short_term_min_rows: usize,
    legacy_totals: Vec<usize>,
}

impl Default for CompletenessChecker {
    fn default() -> Self {
        Self {
            ultra_short_min_rows: ULTRA_SHORT_MIN_ROWS,
            short_term_min_rows: SHORT_TERM_MIN_ROWS,
            legacy_totals: LEGACY_COMPLETE_TOTALS.to_vec(),
        }
    }
}

impl CompletenessChecker {
    pub fn min_rows(&self, kind: ForecastKind) -> usize {
        match kind {
            ForecastKind::UltraShort => self.ultra_short_min_rows,
            ForecastKind::ShortTerm => self.short_term_min_rows,
        }
    }

    /// Whether `count` matching rows are enough for `kind`.
    pub fn is_sufficient(&self, kind: ForecastKind, count: usize) -> bool {
        count >= self.min_rows(kind) || self.legacy_totals.contains(&count)
    }

    /// Whether `archive` already holds a complete set of rows for `cell` in
    /// `window`. An empty archive is never complete.
    pub fn is_complete(
        &self,
        archive: &ForecastArchive,
        cell: GridCell,
        window: &IssuanceWindow,
        kind: ForecastKind,
    ) -> bool {
        if archive.is_empty() {
            return false;
        }
        self.is_sufficient(kind, archive.count_for(cell, window))
    }

    /// Same decision as [`is_complete`](Self::is_complete), answered from
    /// counts built once per run instead of scanning the archive per cell.
    pub fn is_covered(&self, counts: &WindowCounts, cell: GridCell, kind: ForecastKind) -> bool {
        let count = counts.get(cell);
        count > 0 && self.is_sufficient(kind, count)
    }
}
