use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::persistence::RetryPolicy;

/// Storage key for the cart collection unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "@GoBarber:products";

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which key-value backend holds the cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per key under `dir`.
    #[default]
    File,
    /// Process memory only; nothing survives the session.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Data directory for the file backend (default: `<data_dir>/cartstore`).
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Key the collection is stored under.
    #[serde(default = "default_storage_key")]
    pub key: String,
}

/// Write retry settings for the persistence queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Extra attempts after a failed write (default: 2).
    #[serde(default = "default_write_retries")]
    pub write_retries: u32,
    /// Linear backoff base in milliseconds (default: 50).
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Log file; stderr when absent.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_write_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    50
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl StorageConfig {
    /// Directory used by the file backend.
    pub fn data_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("cartstore")
        })
    }
}

impl PersistenceConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.write_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            dir: None,
            key: default_storage_key(),
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            write_retries: default_write_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}
