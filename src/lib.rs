//! Incremental collector for the Korea Meteorological Administration's village
//! forecast service.
//!
//! Each run works out the latest published issuance window, skips every grid
//! cell the monthly archive already covers, fetches the rest one request at a
//! time, and writes the merged, deduplicated archive back once.

mod archive;
mod collector;
mod config;
mod error;
mod forecast;
mod issuance;
mod regions;
mod types;
mod utils;

pub use collector::{Collector, RunOutcome, RunReport};
pub use config::*;
pub use error::CollectorError;
pub use issuance::{
    IssuanceWindowResolver, PublicationSchedule, DEFAULT_SHORT_TERM_SLOT_HOURS,
    DEFAULT_ULTRA_SHORT_DELAY_MINUTES,
};

pub use archive::completeness::*;
pub use archive::error::ArchiveError;
pub use archive::forecast_archive::{ForecastArchive, WindowCounts};
pub use archive::store::{ArchiveStore, CsvArchiveStore, ARCHIVE_COLUMNS};

pub use forecast::client::{ForecastSource, KmaForecastClient};
pub use forecast::error::{CellError, FetchError, NormalizeError};
pub use forecast::normalizer::{RecordNormalizer, SKY_CATEGORY};

pub use regions::error::RegionListError;
pub use regions::region_list::*;

pub use types::forecast_kind::ForecastKind;
pub use types::forecast_record::{ForecastRecord, RawRecord};
pub use types::grid_cell::{GridCell, Region};
pub use types::issuance_window::IssuanceWindow;
