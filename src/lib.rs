pub mod app;
pub mod cli;
pub mod config;
pub mod discord;
pub mod error;
pub mod presence;
pub mod presets;
pub mod settings;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub use app::PresenceApp;
pub use config::{SessionConfig, TimestampMode};
pub use error::{ConnectionError, Error, Result};
pub use presets::PresetStore;
pub use settings::AppPaths;

const LOG_FILE_PREFIX: &str = "digirp.log";

/// Sets up stderr logging plus a daily rolling file under the data directory.
/// Keep the returned guard alive until exit so buffered lines get flushed.
pub fn init_logging(paths: &AppPaths, verbosity: u8) -> Option<WorkerGuard> {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_dir = paths.log_dir();
    let (file_layer, guard, dir_error) = match std::fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    if let Some(e) = dir_error {
        tracing::warn!(
            "Failed to create log directory {}, file logging disabled: {}",
            log_dir.display(),
            e
        );
    }

    guard
}
