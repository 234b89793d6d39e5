//! Logging initialization.
//!
//! The TUI owns the terminal, so logs go to a file: one per run, under the
//! user state directory (`~/.local/state/history-nav/logs` on Linux), falling
//! back to the cache directory and then the system temp directory.
//!
//! The level comes from `RUST_LOG` and defaults to `info`.

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn log_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("history-nav")
        .join("logs")
}

/// Install the global subscriber writing to
/// `<log dir>/history-nav.<timestamp>.log`.
///
/// Returns the log file path, or `None` when no log file could be created
/// (the program keeps running without logs).
pub fn init_logging() -> Option<PathBuf> {
    let log_dir = log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory {}: {}", log_dir.display(), e);
        return None;
    }

    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
    let log_path = log_dir.join(format!("history-nav.{}.log", timestamp));

    let log_file = match fs::File::create(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: Failed to create log file: {}", e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    // keep the writer alive for the whole process
    std::mem::forget(guard);

    tracing::info!("Logging initialized - writing to {}", log_path.display());
    Some(log_path)
}
