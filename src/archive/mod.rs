pub mod completeness;
pub mod error;
pub mod forecast_archive;
pub mod store;
