pub mod error;
pub mod region_list;
