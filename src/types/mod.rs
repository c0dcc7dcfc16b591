pub mod forecast_kind;
pub mod forecast_record;
pub mod grid_cell;
pub mod issuance_window;
