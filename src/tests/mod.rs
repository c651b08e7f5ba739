pub mod common;
pub mod config_loading;
