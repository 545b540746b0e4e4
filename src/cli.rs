//! CLI argument parsing via clap.

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Interactive command shell.
#[derive(Debug, Parser)]
#[command(name = "lineshell", disable_version_flag = true)]
pub struct Args {
    /// Show version information and exit.
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Path to config file (default: ./lineshell.toml or ~/.config/lineshell/lineshell.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

/// What the process should do after argument parsing.
#[derive(Debug)]
pub enum StartupAction {
    /// Continue into the shell with these arguments.
    Run(Args),
    /// Print `message` (to stderr when `to_stderr`) and exit with `code`.
    Exit {
        code: i32,
        message: String,
        to_stderr: bool,
    },
}

/// Parse `argv` (including the program name) into a startup action.
///
/// `--version` exits with success, `--help` prints usage and exits with
/// success, and any parse failure exits with status 1.
pub fn parse_startup<I, T>(argv: I) -> StartupAction
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(argv) {
        Ok(args) if args.version => StartupAction::Exit {
            code: 0,
            message: crate::build_info::cli_version_text(),
            to_stderr: false,
        },
        Ok(args) => StartupAction::Run(args),
        Err(err) => {
            let to_stderr = err.use_stderr();
            StartupAction::Exit {
                code: if to_stderr { 1 } else { 0 },
                message: err.to_string().trim_end().to_string(),
                to_stderr,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_runs_the_shell() {
        let StartupAction::Run(args) = parse_startup(["lineshell"]) else {
            panic!("expected run");
        };
        assert!(!args.version);
        assert!(args.config.is_none());
    }

    #[test]
    fn short_and_long_version_exit_successfully() {
        for flag in ["-v", "--version"] {
            match parse_startup(["lineshell", flag]) {
                StartupAction::Exit {
                    code,
                    message,
                    to_stderr,
                } => {
                    assert_eq!(code, 0);
                    assert!(!to_stderr);
                    assert!(message.starts_with("lineshell "));
                }
                other => panic!("unexpected: {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_flag_exits_with_failure_on_stderr() {
        match parse_startup(["lineshell", "--bogus"]) {
            StartupAction::Exit {
                code, to_stderr, ..
            } => {
                assert_eq!(code, 1);
                assert!(to_stderr);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn config_and_color_flags_parse() {
        let StartupAction::Run(args) =
            parse_startup(["lineshell", "--config", "/tmp/x.toml", "--no-color"])
        else {
            panic!("expected run");
        };
        assert_eq!(args.config, Some(PathBuf::from("/tmp/x.toml")));
        assert!(args.no_color);
    }
}
