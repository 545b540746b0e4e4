//! Default configuration constants.

/// Prompt shown for normal command entry.
pub(super) const DEFAULT_PROMPT: &str = "> ";
/// Maximum in-memory history entries kept by the line editor.
pub(super) const DEFAULT_HISTORY_LIMIT: usize = 1000;
/// Width of the name + argument-hint column in `help` output.
pub(super) const DEFAULT_HELP_COLUMN_WIDTH: usize = 48;
/// Tracing filter used when `LINESHELL_LOG` is unset.
pub(super) const DEFAULT_LOG_FILTER: &str = "info";
/// File name looked up in the working directory and the config root.
pub(super) const CONFIG_FILE_NAME: &str = "lineshell.toml";
/// Directory under the config root holding the global config file.
pub(super) const CONFIG_DIR_NAME: &str = "lineshell";
