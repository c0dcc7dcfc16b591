use thiserror::Error;

/// Failure to obtain a raw record batch for one grid cell.
///
/// All variants are per-cell and non-fatal for a collection run: the cell is
/// logged, left incomplete, and retried by the next scheduled run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    // Connection failures and timeouts
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Forecast service answered with result code {code}: {message}")]
    Api { code: String, message: String },

    #[error("Unexpected response payload from {url}: {reason}")]
    ResponseFormat { url: String, reason: String },
}

/// A raw batch that does not have the shape of forecast items.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Item {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Item {index} has invalid value {value} for field '{field}'")]
    InvalidField {
        index: usize,
        field: &'static str,
        value: String,
    },
}

/// Why a single grid cell could not be collected during a run.
#[derive(Debug, Error)]
pub enum CellError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}
