//! Tracing setup: stdout plus an optional per-run log file

use chrono::Local;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Name of the log file for a run started now
pub fn run_log_name() -> String {
    format!("bot_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S"))
}

/// Install the global subscriber. Returns the log file path, if one was
/// opened. Failing to open the file falls back to stdout only.
pub fn init(directory: Option<&Path>) -> Option<PathBuf> {
    let filter = || {
        EnvFilter::from_default_env()
            .add_directive(tracing::Level::INFO.into())
    };

    let stdout = fmt::layer()
        .with_target(false)
        .with_filter(filter());

    let mut file_error = None;
    let file = directory.and_then(|dir| {
        let path = dir.join(run_log_name());
        match std::fs::create_dir_all(dir).and_then(|_| File::create(&path)) {
            Ok(file) => Some((file, path)),
            Err(e) => {
                file_error = Some(format!("{}: {}", path.display(), e));
                None
            }
        }
    });

    let (file_layer, path) = match file {
        Some((file, path)) => {
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(filter());
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stdout)
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!("Could not open log file, logging to stdout only: {}", e);
    }
    path
}
