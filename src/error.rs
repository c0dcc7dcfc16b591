use crate::archive::error::ArchiveError;
use crate::forecast::error::FetchError;
use crate::regions::error::RegionListError;
use thiserror::Error;

/// Errors that end a collection run. Per-cell fetch and normalization
/// failures never surface here; they are counted in the run report.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Regions(#[from] RegionListError),

    /// Only raised while setting up the HTTP client.
    #[error(transparent)]
    Client(#[from] FetchError),
}
