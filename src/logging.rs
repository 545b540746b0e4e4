//! Diagnostic logging setup.
//!
//! The terminal belongs to the line editor, so log records only go to the
//! file named in the config. With no file configured nothing is installed and
//! `tracing` macros are no-ops.

use crate::config::LogConfig;
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive that overrides the config.
pub const LOG_FILTER_ENV: &str = "LINESHELL_LOG";

/// Install the global file subscriber described by `config`.
///
/// Returns `Ok(false)` when logging is disabled or a subscriber is already
/// installed (as happens across tests).
pub fn init_logging(config: &LogConfig) -> io::Result<bool> {
    let Some(path) = config.file.as_ref() else {
        return Ok(false);
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .is_ok();
    Ok(installed)
}
