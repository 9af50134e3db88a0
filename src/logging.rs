use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Initialize tracing.
///
/// `RUST_LOG` wins over the configured filter. Output goes to the
/// configured file, or to stderr so stdout stays free for command output.
/// Calling this twice is harmless; the second subscriber is not installed.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match &config.file {
        Some(path) => {
            let Ok(file) = std::fs::File::create(path) else {
                eprintln!("Warning: Failed to create log file: {}", path.display());
                return;
            };
            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_level(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .try_init()
        }
        None => {
            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339());
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()
        }
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
