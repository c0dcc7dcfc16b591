use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegionListError {
    #[error("Failed to read region list '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse region list '{0}'")]
    CsvReadPolars(PathBuf, #[source] PolarsError),

    #[error("Region list '{path}' has no column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Region list '{path}', row {row}: '{value}' is not a grid index")]
    InvalidGridValue {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
