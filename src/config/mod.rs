//! Configuration: TOML file with per-section defaults.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{
    Config, LoggingConfig, PersistenceConfig, StorageBackend, StorageConfig, DEFAULT_STORAGE_KEY,
};
