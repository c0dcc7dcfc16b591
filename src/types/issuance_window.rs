use chrono::NaiveDate;
use std::fmt;

/// Identifies one forecast publication cycle: the `base_date`/`base_time`
/// pair the upstream API is queried with and that every archived row carries.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use kma_collector::IssuanceWindow;
///
/// let window = IssuanceWindow::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 5);
/// assert_eq!(window.base_date(), "20240301");
/// assert_eq!(window.base_time(), "0500");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IssuanceWindow {
    pub date: NaiveDate,
    /// Hour of the publication slot, 0..=23.
    pub hour: u32,
}

impl IssuanceWindow {
    pub fn new(date: NaiveDate, hour: u32) -> Self {
        Self { date, hour }
    }

    /// `YYYYMMDD`, as sent in the `base_date` query parameter.
    pub fn base_date(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }

    /// `HH00`, as sent in the `base_time` query parameter.
    pub fn base_time(&self) -> String {
        format!("{:02}00", self.hour)
    }
}

impl fmt::Display for IssuanceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.base_date(), self.base_time())
    }
}
