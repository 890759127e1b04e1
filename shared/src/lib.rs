pub mod error;
pub mod log_config;
pub mod pagination;
