//! Terminal mode handling for an attached interactive input.

use crossterm::terminal;
use std::io::{self, IsTerminal};

/// Raw mode lifetime guard so terminal state is restored on any exit path.
#[derive(Debug)]
pub struct RawModeGuard;

impl RawModeGuard {
    /// Enable raw mode and return a guard that disables it on drop.
    pub fn acquire() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }

    /// Enable raw mode only when stdin is a terminal.
    pub fn acquire_for_stdin() -> io::Result<Option<Self>> {
        if !io::stdin().is_terminal() {
            return Ok(None);
        }
        Self::acquire().map(Some)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
