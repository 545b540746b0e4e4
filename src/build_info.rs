//! Compile-time build metadata for the `version` command and `--version`.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// VCS commit hash captured at build time.
pub const GIT_COMMIT: &str = env!("LINESHELL_BUILD_GIT_HASH");

/// Build timestamp captured at compile time.
pub const BUILD_TIMESTAMP: &str = env!("LINESHELL_BUILD_TIMESTAMP");

/// Line printed by the builtin `version` command.
pub fn shell_version_line() -> String {
    format!("Version {VERSION}")
}

/// Block printed by `lineshell --version`.
pub fn cli_version_text() -> String {
    format!("lineshell {VERSION}\ncommit: {GIT_COMMIT}\nbuilt: {BUILD_TIMESTAMP}")
}
