//! The archived row type and the raw API item it is normalized from.

use crate::types::grid_cell::GridCell;

/// One item of the API's `response.body.items.item` array, untouched.
///
/// Field values arrive as JSON strings or numbers depending on the field and
/// on the service version, so they are kept as raw JSON until normalization.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// One archived forecast row.
///
/// All fields take part in equality and hashing: two rows are duplicates only
/// if they agree on every field. Date and time fields are kept as the textual
/// `YYYYMMDD` / `HHMM` forms the API and the CSV archive use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForecastRecord {
    pub base_date: String,
    /// Always four characters, zero padded (`"0200"`).
    pub base_time: String,
    pub category: String,
    pub fcst_date: String,
    /// Always four characters, zero padded.
    pub fcst_time: String,
    pub fcst_value: String,
    pub nx: i32,
    pub ny: i32,
}

impl ForecastRecord {
    pub fn cell(&self) -> GridCell {
        GridCell::new(self.nx, self.ny)
    }

    /// Whether this row was issued in the cycle with the given `YYYYMMDD`
    /// date and `HHMM` time.
    pub fn is_issued_at(&self, base_date: &str, base_time: &str) -> bool {
        self.base_date == base_date && self.base_time == base_time
    }
}
