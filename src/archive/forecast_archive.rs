//! In-memory view of one monthly archive.

use crate::types::forecast_record::ForecastRecord;
use crate::types::grid_cell::GridCell;
use crate::types::issuance_window::IssuanceWindow;
use std::collections::{HashMap, HashSet};

/// The rows of one (forecast kind, year, month) archive, in file order.
///
/// A run loads this once, asks it how many rows each cell already has for the
/// current issuance window, and merges freshly fetched batches into it before
/// handing it back to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastArchive {
    records: Vec<ForecastRecord>,
}

impl ForecastArchive {
    pub fn new(records: Vec<ForecastRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ForecastRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ForecastRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows issued for `cell` in `window`.
    pub fn count_for(&self, cell: GridCell, window: &IssuanceWindow) -> usize {
        let (base_date, base_time) = (window.base_date(), window.base_time());
        self.records
            .iter()
            .filter(|record| record.cell() == cell && record.is_issued_at(&base_date, &base_time))
            .count()
    }

    /// Rows issued in `window`, counted per grid cell in a single pass.
    /// Cells without any row are absent from the map.
    pub fn window_counts(&self, window: &IssuanceWindow) -> WindowCounts {
        let (base_date, base_time) = (window.base_date(), window.base_time());
        let mut counts = HashMap::new();
        for record in &self.records {
            if record.is_issued_at(&base_date, &base_time) {
                *counts.entry(record.cell()).or_insert(0) += 1;
            }
        }
        WindowCounts { counts }
    }

    /// Appends `batches` to the existing rows and drops every row that is an
    /// exact duplicate of an earlier one. The first occurrence keeps its
    /// position, so existing rows stay in file order.
    ///
    /// Merging the same batches again yields the same archive.
    ///
    /// # Examples
    ///
    /// ```
    /// use kma_collector::{ForecastArchive, ForecastRecord};
    ///
    /// let row = ForecastRecord {
    ///     base_date: "20240615".into(),
    ///     base_time: "1400".into(),
    ///     category: "SKY".into(),
    ///     fcst_date: "20240615".into(),
    ///     fcst_time: "1500".into(),
    ///     fcst_value: "1".into(),
    ///     nx: 60,
    ///     ny: 127,
    /// };
    /// let archive = ForecastArchive::new(vec![row.clone()]);
    /// let merged = archive.merge(&[vec![row.clone(), row]]);
    /// assert_eq!(merged.len(), 1);
    /// ```
    pub fn merge(&self, batches: &[Vec<ForecastRecord>]) -> ForecastArchive {
        let mut seen: HashSet<&ForecastRecord> = HashSet::with_capacity(self.records.len());
        let records = self
            .records
            .iter()
            .chain(batches.iter().flatten())
            .filter(|record| seen.insert(*record))
            .cloned()
            .collect();
        ForecastArchive { records }
    }
}

/// Per-cell row counts of one issuance window, see
/// [`ForecastArchive::window_counts`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowCounts {
    counts: HashMap<GridCell, usize>,
}

impl WindowCounts {
    pub fn get(&self, cell: GridCell) -> usize {
        self.counts.get(&cell).copied().unwrap_or(0)
    }

    /// Number of cells with at least one row.
    pub fn cells(&self) -> usize {
        self.counts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn window() -> IssuanceWindow {
        IssuanceWindow::new(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(), 14)
    }

    fn row(nx: i32, ny: i32, base_time: &str, fcst_time: &str, value: &str) -> ForecastRecord {
        ForecastRecord {
            base_date: "20240615".to_string(),
            base_time: base_time.to_string(),
            category: "SKY".to_string(),
            fcst_date: "20240615".to_string(),
            fcst_time: fcst_time.to_string(),
            fcst_value: value.to_string(),
            nx,
            ny,
        }
    }

    #[test]
    fn counts_only_rows_of_the_same_cell_and_window() {
        let archive = ForecastArchive::new(vec![
            row(60, 127, "1400", "1500", "1"),
            row(60, 127, "1400", "1600", "1"),
            row(60, 127, "1300", "1400", "1"),
            row(61, 127, "1400", "1500", "1"),
            row(60, 126, "1400", "1500", "1"),
        ]);

        assert_eq!(archive.count_for(GridCell::new(60, 127), &window()), 2);
        assert_eq!(archive.count_for(GridCell::new(61, 127), &window()), 1);
        assert_eq!(archive.count_for(GridCell::new(1, 1), &window()), 0);
        assert_eq!(ForecastArchive::empty().count_for(GridCell::new(60, 127), &window()), 0);
    }

    #[test]
    fn window_counts_agree_with_count_for() {
        let archive = ForecastArchive::new(vec![
            row(60, 127, "1400", "1500", "1"),
            row(60, 127, "1400", "1600", "1"),
            row(60, 127, "1300", "1400", "1"),
            row(61, 127, "1400", "1500", "1"),
            row(60, 126, "1400", "1500", "1"),
        ]);

        let counts = archive.window_counts(&window());
        assert_eq!(counts.cells(), 3);
        for cell in [GridCell::new(60, 127), GridCell::new(61, 127), GridCell::new(60, 126), GridCell::new(1, 1)] {
            assert_eq!(counts.get(cell), archive.count_for(cell, &window()), "{cell}");
        }
        assert_eq!(ForecastArchive::empty().window_counts(&window()), WindowCounts::default());
    }

    #[test]
    fn merge_removes_exact_duplicates_only() {
        let existing = ForecastArchive::new(vec![row(60, 127, "1400", "1500", "1")]);
        let batch = vec![
            row(60, 127, "1400", "1500", "1"),
            row(60, 127, "1400", "1500", "3"),
            row(60, 127, "1400", "1600", "1"),
            row(60, 127, "1400", "1600", "1"),
        ];

        let merged = existing.merge(&[batch]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.records()[0], row(60, 127, "1400", "1500", "1"));
        assert_eq!(merged.records()[1].fcst_value, "3");
    }

    #[test]
    fn merge_is_idempotent() {
        let existing = ForecastArchive::new(vec![
            row(60, 127, "1300", "1400", "4"),
            row(60, 127, "1300", "1500", "4"),
        ]);
        let pending = vec![
            vec![row(60, 127, "1400", "1500", "1"), row(60, 127, "1400", "1600", "1")],
            vec![row(55, 124, "1400", "1500", "3")],
        ];

        let once = existing.merge(&pending);
        let twice = once.merge(&pending);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 5);
    }

    #[test]
    fn merge_keeps_existing_duplicates_out_too() {
        let existing = ForecastArchive::new(vec![
            row(60, 127, "1400", "1500", "1"),
            row(60, 127, "1400", "1500", "1"),
        ]);
        assert_eq!(existing.merge(&[]).len(), 1);
    }
}
