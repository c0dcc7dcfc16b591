//! Immutable settings for a collection run.

use crate::forecast::normalizer::SKY_CATEGORY;
use crate::issuance::PublicationSchedule;
use crate::regions::region_list::RegionColumns;
use bon::bon;
use chrono::{FixedOffset, Offset, Utc};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://apis.data.go.kr/1360000/VilageFcstInfoService_2.0";
pub const DEFAULT_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_DATA_DIR: &str = "data";
/// Korea Standard Time, the zone the issuance schedule is defined in.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

/// Everything a [`Collector`](crate::Collector) needs besides the current
/// instant and the region list. Built once, never mutated.
///
/// # Examples
///
/// ```
/// use kma_collector::CollectorConfig;
/// use std::time::Duration;
///
/// let config = CollectorConfig::builder()
///     .service_key("my-key")
///     .request_timeout(Duration::from_secs(10))
///     .build();
/// assert_eq!(config.page_size, 1000);
/// assert_eq!(config.utc_offset().local_minus_utc(), 9 * 3600);
/// ```
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Decoded service key of the public data portal.
    pub service_key: String,
    /// Service root; the operation name is appended per forecast kind.
    pub base_url: String,
    pub page_size: u32,
    pub request_timeout: Duration,
    /// Root of the `<year>/<year>_<month><suffix>.csv` archive tree.
    pub data_dir: PathBuf,
    pub utc_offset_hours: i32,
    /// Forecast category kept in the archive.
    pub category: String,
    pub schedule: PublicationSchedule,
    pub region_columns: RegionColumns,
    pub show_progress: bool,
}

#[bon]
impl CollectorConfig {
    #[builder]
    pub fn new(
        #[builder(into)] service_key: String,
        #[builder(into)] base_url: Option<String>,
        page_size: Option<u32>,
        request_timeout: Option<Duration>,
        #[builder(into)] data_dir: Option<PathBuf>,
        utc_offset_hours: Option<i32>,
        #[builder(into)] category: Option<String>,
        schedule: Option<PublicationSchedule>,
        region_columns: Option<RegionColumns>,
        #[builder(default)] show_progress: bool,
    ) -> Self {
        Self {
            service_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            page_size: page_size.filter(|&size| size > 0).unwrap_or(DEFAULT_PAGE_SIZE),
            request_timeout: request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            data_dir: data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            utc_offset_hours: utc_offset_hours
                .unwrap_or(DEFAULT_UTC_OFFSET_HOURS)
                .clamp(-23, 23),
            category: category.unwrap_or_else(|| SKY_CATEGORY.to_string()),
            schedule: schedule.unwrap_or_default(),
            region_columns: region_columns.unwrap_or_default(),
            show_progress,
        }
    }

    /// Offset of the local clock the schedule is evaluated in.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }
}
