use std::path::PathBuf;

use crate::config::ShellConfig;

/// Initialize tracing with file rotation
///
/// Logs are written to `<config dir>/ReqWorkbench/logs/`:
/// - macOS: ~/Library/Application Support/ReqWorkbench/logs/
/// - Windows: %APPDATA%/ReqWorkbench/logs/
/// - Linux: ~/.config/ReqWorkbench/logs/
///
/// Log rotation:
/// - Daily rotation (new file each day)
/// - Files named: req-workbench.log.YYYY-MM-DD
///
/// Log output:
/// - Debug builds: Console + File
/// - Release builds: File only
pub fn initialize_tracing(config: &ShellConfig) -> PathBuf {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = log_dir();

    // Create log directory if it doesn't exist
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "req-workbench.log");

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    // In debug builds, also log to console
    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
    log_dir
}

/// Directory holding the rolling log files
pub fn log_dir() -> PathBuf {
    ShellConfig::app_dir()
        .map(|dir| dir.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}
