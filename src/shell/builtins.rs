//! Commands every shell has, at the lowest precedence.

use crate::build_info;
use crate::shell::command::{CommandEntry, CommandTable};
use crate::shell::Shell;

/// Build the default table: `version`, `quit`, `exit`, `help`.
pub fn default_table() -> CommandTable {
    let mut table = CommandTable::new();
    for entry in [
        CommandEntry::new("version", "Display version", cmd_version),
        CommandEntry::new("quit", "Quit program", cmd_quit),
        CommandEntry::new("exit", "Quit program", cmd_quit),
        CommandEntry::new("help", "Display help about this program", cmd_help),
    ] {
        // Names above are distinct, so insertion cannot fail.
        let _ = table.insert(entry);
    }
    table
}

fn cmd_version(shell: &mut Shell, _arg: &str) {
    shell.print(format!("{}\n", build_info::shell_version_line()));
}

fn cmd_quit(shell: &mut Shell, _arg: &str) {
    shell.quit();
}

fn cmd_help(shell: &mut Shell, _arg: &str) {
    shell.print_help();
}
