//! Configuration for the bridge binaries.

mod config;

pub use config::{BitcoindConfig, Config, ConfigError, LoggingConfig, SyncConfig};
