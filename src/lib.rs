//! lineshell: the core of an interactive, line-oriented command shell.
//!
//! An embedding application registers a menu of commands, attaches an input
//! source, and runs the shell. The shell reads keystrokes on a
//! single-threaded event loop, dispatches completed lines to command
//! handlers, offers tab completion, and lets code ask the user a one-off
//! question (a PIN, a confirmation) without racing normal command entry.
//!
//! # Quick start
//!
//! ```no_run
//! use lineshell::shell::{CommandEntry, Shell};
//! use lineshell::shell::command::CommandTable;
//!
//! let mut shell = Shell::init(std::env::args_os());
//! let menu = CommandTable::from_entries([CommandEntry::new(
//!     "greet",
//!     "Say hello",
//!     |shell: &mut Shell, arg: &str| shell.print(format!("hello {arg}\n")),
//! )])
//! .unwrap();
//! shell.set_menu(menu).unwrap();
//! shell.attach_stdin().unwrap();
//! shell.run();
//! ```

pub mod build_info;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod shell;
#[cfg(test)]
pub mod testsupport;
pub mod tui;
