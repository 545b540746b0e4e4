//! Helpers for driving a `Shell` against an in-memory terminal.

use lineshell::config::ShellConfig;
use lineshell::shell::Shell;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Output sink shared between the shell and the test.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl CapturedOutput {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes.borrow()).into_owned()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A colorless shell writing into a fresh capture buffer.
pub fn captured_shell() -> (Shell, CapturedOutput) {
    let out = CapturedOutput::default();
    let config = ShellConfig {
        color: false,
        ..ShellConfig::default()
    };
    let shell = Shell::new(config, Box::new(out.clone())).expect("shell");
    (shell, out)
}
