//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`LINESHELL_PROMPT`, `LINESHELL_NO_COLOR` or
//!    `NO_COLOR`, `LINESHELL_LOG_FILE`)
//! 2. TOML file specified via `--config`
//! 3. `./lineshell.toml` in the current directory
//! 4. `$XDG_CONFIG_HOME/lineshell/lineshell.toml` (or the platform config dir)
//! 5. Built-in defaults

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

mod defaults;
mod types;

use defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
pub use types::{LogConfig, ShellConfig};

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from `--config`); unlike
/// the implicit locations it must exist.
pub fn load_config(path_override: Option<&Path>) -> Result<ShellConfig, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&Path>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<ShellConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let text = read_config_text(path_override, &read_file, &config_root)?;
    let mut config: ShellConfig = toml::from_str(&text)?;
    apply_env_overrides(&mut config, &env_lookup);
    validate(&config)?;
    Ok(config)
}

fn read_config_text<FRead, FRoot>(
    path_override: Option<&Path>,
    read_file: &FRead,
    config_root: &FRoot,
) -> Result<String, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    if let Some(path) = path_override {
        return Ok(read_file(path)?);
    }
    if let Ok(text) = read_file(Path::new(CONFIG_FILE_NAME)) {
        return Ok(text);
    }
    if let Some(dir) = config_root() {
        if let Ok(text) = read_file(&dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)) {
            return Ok(text);
        }
    }
    Ok(String::new())
}

fn apply_env_overrides<FEnv>(config: &mut ShellConfig, env_lookup: &FEnv)
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(prompt) = env_lookup("LINESHELL_PROMPT") {
        config.prompt = prompt;
    }
    // Any non-empty value disables color, per the NO_COLOR convention.
    if ["LINESHELL_NO_COLOR", "NO_COLOR"]
        .iter()
        .any(|name| env_lookup(name).is_some_and(|v| !v.is_empty()))
    {
        config.color = false;
    }
    if let Some(file) = env_lookup("LINESHELL_LOG_FILE").filter(|v| !v.trim().is_empty()) {
        config.log.file = Some(PathBuf::from(file));
    }
}

fn validate(config: &ShellConfig) -> Result<(), ConfigError> {
    if config.history_limit == 0 {
        return Err(ConfigError::Invalid(
            "history_limit must be at least 1".to_string(),
        ));
    }
    if config.help_column_width == 0 {
        return Err(ConfigError::Invalid(
            "help_column_width must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Resolve the root directory for global config files.
pub fn config_root_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::config_dir()
}
