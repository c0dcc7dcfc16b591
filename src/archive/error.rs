use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures reading or persisting a monthly archive. All of them are fatal for
/// a collection run: a corrupt archive needs an operator, and a failed write
/// must not be retried half-way.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to read archive file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Archive file '{0}' is empty, expected at least a header row")]
    Empty(PathBuf),

    #[error("Failed to parse archive file '{0}'")]
    Corrupt(PathBuf, #[source] PolarsError),

    #[error("Archive file '{path}' has no column '{column}'")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("Archive file '{path}', row {row}: {reason}")]
    InvalidRow {
        path: PathBuf,
        row: usize,
        reason: String,
    },

    #[error("Failed to create archive directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to write archive file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode archive file '{0}'")]
    Encode(PathBuf, #[source] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
