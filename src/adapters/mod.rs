//! Concrete adapter implementations for ports.

pub mod csv_export;
pub mod file_config_adapter;
pub mod json_feed_adapter;
pub mod json_state_adapter;
pub mod persistence_observer;
#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
pub mod static_feed;
