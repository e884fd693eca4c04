//! Concrete adapter implementations for ports.

pub mod csv_market_adapter;
pub mod file_config_adapter;
pub mod memory_store_adapter;
#[cfg(feature = "sqlite")]
pub mod sqlite_store_adapter;
