//! Configuration data model.

use serde::Deserialize;
use std::path::PathBuf;

use super::defaults::{
    DEFAULT_HELP_COLUMN_WIDTH, DEFAULT_HISTORY_LIMIT, DEFAULT_LOG_FILTER, DEFAULT_PROMPT,
};

/// Top-level shell configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt shown while idle.
    pub prompt: String,
    /// Whether ANSI colors are used for prompts, labels, and help output.
    pub color: bool,
    /// Upper bound on remembered history lines.
    pub history_limit: usize,
    /// Column width for the name + argument-hint part of `help` rows.
    pub help_column_width: usize,
    pub log: LogConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            color: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
            help_column_width: DEFAULT_HELP_COLUMN_WIDTH,
            log: LogConfig::default(),
        }
    }
}

/// Diagnostic log settings. Logs never go to the terminal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file path; logging is disabled when unset.
    pub file: Option<PathBuf>,
    /// `tracing_subscriber::EnvFilter` directive used when `LINESHELL_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
