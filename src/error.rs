//! Unified error types for the shell.

use std::fmt;

// ---------------------------------------------------------------------------
// ShellError
// ---------------------------------------------------------------------------

/// Errors reported by the registration, attachment, and prompt APIs.
///
/// None of these are fatal: the shell keeps running and the embedding
/// application decides what a failure means.
#[derive(Debug)]
pub enum ShellError {
    /// A custom menu was already installed; menus cannot be replaced.
    MenuAlreadySet,
    /// The supplied menu table had no entries.
    EmptyMenu,
    /// A table already holds a command with this name.
    DuplicateCommand(String),
    /// An input source is already attached.
    AlreadyAttached,
    /// No input source is attached.
    NotAttached,
    /// No prompt override is outstanding.
    PromptNotActive,
    /// Terminal or runtime I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MenuAlreadySet => write!(f, "a menu is already set"),
            Self::EmptyMenu => write!(f, "menu has no commands"),
            Self::DuplicateCommand(name) => write!(f, "duplicate command: {name}"),
            Self::AlreadyAttached => write!(f, "an input source is already attached"),
            Self::NotAttached => write!(f, "no input source attached"),
            Self::PromptNotActive => write!(f, "no input prompt is active"),
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for ShellError {}

impl From<std::io::Error> for ShellError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_error_display() {
        assert_eq!(
            ShellError::MenuAlreadySet.to_string(),
            "a menu is already set"
        );
        assert_eq!(
            ShellError::DuplicateCommand("scan".into()).to_string(),
            "duplicate command: scan"
        );
        assert_eq!(
            ShellError::PromptNotActive.to_string(),
            "no input prompt is active"
        );
    }

    #[test]
    fn shell_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let e = ShellError::from(io_err);
        let s = e.to_string();
        assert!(s.starts_with("io:"), "got: {s}");
        assert!(s.contains("pipe closed"));
    }

    #[test]
    fn config_error_from_toml() {
        let toml_err: toml::de::Error =
            toml::from_str::<toml::Value>("x = [unclosed").unwrap_err();
        let e = ConfigError::from(toml_err);
        assert!(e.to_string().starts_with("toml:"));
    }

    #[test]
    fn config_error_invalid_message() {
        let e = ConfigError::Invalid("history_limit must be positive".into());
        assert_eq!(
            e.to_string(),
            "invalid config: history_limit must be positive"
        );
    }
}
