use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::{LoggingConfig, expand_env_vars};

const DEFAULT_FILTER: &str = "info";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter, which wins over `info`.
/// With a log file configured, output goes there without ANSI colors;
/// otherwise to stderr. Returns the log file path when one is in use.
/// Calling this twice leaves the first subscriber in place.
pub fn init_tracing(config: &LoggingConfig) -> Option<PathBuf> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(config)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let mut warnings = Vec::new();
    let log_file = config.file.as_deref().and_then(|file| {
        let path = PathBuf::from(expand_env_vars(file));
        match open_log_file(&path) {
            Ok(file) => Some((path, file)),
            Err(e) => {
                warnings.push(format!("Failed to open log file {}: {e}", path.display()));
                None
            }
        }
    });

    let installed_path = if let Some((path, file)) = log_file {
        let installed = tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .try_init()
            .is_ok();
        if installed {
            tracing::info!(path = %path.display(), "Logging initialized");
        }
        installed.then_some(path)
    } else {
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(env_filter)
            .try_init();
        None
    };

    for warning in warnings {
        tracing::warn!("{warning}");
    }
    installed_path
}

fn filter_directive(config: &LoggingConfig) -> &str {
    config
        .filter
        .as_deref()
        .filter(|f| !f.trim().is_empty())
        .unwrap_or(DEFAULT_FILTER)
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
