//! The shell controller.
//!
//! [`Shell`] owns every piece of mutable state: the line editor, the command
//! registry, the prompt override, the reactor, and the attached input. All
//! of it is touched only from the thread running [`Shell::run`], one reactor
//! event at a time, which is what keeps output interleaving safe.

pub mod builtins;
pub mod command;
pub mod completion;
pub mod dispatch;
pub mod output;
pub mod prompt_input;
pub mod reactor;
pub mod signal;

use crate::cli::{self, StartupAction};
use crate::config::{self, ShellConfig};
use crate::error::ShellError;
use crate::logging;
use crate::tui::{
    settings, CompletionMatches, CompletionRequest, EditorEvent, History, LineEditor,
    RawModeGuard,
};
use command::{CommandRegistry, CommandTable};
use crossterm::event::KeyEvent;
use crossterm::style::Stylize;
use prompt_input::InputOverride;
use reactor::{Reactor, ReactorEvent, Registration, SourceId};
use signal::{ShellSignal, SignalAction, SignalBridge, SignalLatch};
use std::ffi::OsString;
use std::fmt;
use std::io::{self, Write};
use tokio::io::AsyncRead;

pub use command::{CommandEntry, CommandTier};

/// Print formatted text through the shell without disturbing the edit line.
///
/// ```ignore
/// shell_printf!(shell, "[NEW] Device {}\n", address);
/// ```
#[macro_export]
macro_rules! shell_printf {
    ($shell:expr, $($arg:tt)*) => {
        $shell.print_fmt(format_args!($($arg)*))
    };
}

/// Interactive line-oriented command shell.
pub struct Shell {
    config: ShellConfig,
    editor: LineEditor,
    registry: CommandRegistry,
    input_override: InputOverride,
    latch: SignalLatch,
    input: Option<Registration>,
    signals: Option<SignalBridge>,
    terminal: Option<RawModeGuard>,
    reactor: Reactor,
}

impl Shell {
    /// Parse `argv`, load config, and set up logging and the shell.
    ///
    /// Exits the process for `--version`, `--help`, bad flags, and an
    /// unreadable config.
    pub fn init<I, T>(argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = match cli::parse_startup(argv) {
            StartupAction::Run(args) => args,
            StartupAction::Exit {
                code,
                message,
                to_stderr,
            } => {
                if to_stderr {
                    eprintln!("{message}");
                } else {
                    println!("{message}");
                }
                std::process::exit(code);
            }
        };

        let mut config = match config::load_config(args.config.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        };
        if args.no_color {
            config.color = false;
        }

        if let Err(e) = logging::init_logging(&config.log) {
            eprintln!("warning: failed to open log file: {e}");
        }

        match Self::new(config, Box::new(io::stdout())) {
            Ok(shell) => shell,
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
    }

    /// Build a shell writing to `out`. Nothing is attached yet.
    pub fn new(config: ShellConfig, out: Box<dyn Write>) -> Result<Self, ShellError> {
        let editor = LineEditor::new(out, &config.prompt, config.color, config.history_limit);
        Ok(Self {
            editor,
            registry: CommandRegistry::new(builtins::default_table()),
            input_override: InputOverride::default(),
            latch: SignalLatch::new(),
            input: None,
            signals: None,
            terminal: None,
            reactor: Reactor::new()?,
            config,
        })
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn history(&self) -> &History {
        self.editor.history()
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// The event loop, for embedding applications that add their own sources.
    pub fn reactor_mut(&mut self) -> &mut Reactor {
        &mut self.reactor
    }

    // -- Registration ------------------------------------------------------

    /// Install the custom menu. Fails if one is set already or it is empty.
    pub fn set_menu(&mut self, menu: CommandTable) -> Result<(), ShellError> {
        let count = menu.len();
        self.registry.set_menu(menu)?;
        tracing::info!(commands = count, "menu installed");
        Ok(())
    }

    /// Replace the normal prompt text.
    pub fn set_prompt(&mut self, prompt: &str) {
        if let Err(e) = self.editor.set_prompt(prompt) {
            tracing::warn!(error = %e, "failed to redraw prompt");
        }
    }

    /// Attach `reader` as the input source and start editing.
    pub fn attach<R>(&mut self, reader: R) -> Result<(), ShellError>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        if self.input.is_some() {
            return Err(ShellError::AlreadyAttached);
        }
        self.input = Some(self.reactor.register_reader(reader));
        self.editor.reset_decoder();
        self.editor.install();
        if let Err(e) = self.editor.redraw() {
            tracing::warn!(error = %e, "failed to draw prompt");
        }
        tracing::info!("input attached");
        Ok(())
    }

    /// Attach the process stdin, switching a terminal into raw mode.
    pub fn attach_stdin(&mut self) -> Result<(), ShellError> {
        if self.input.is_some() {
            return Err(ShellError::AlreadyAttached);
        }
        let raw = RawModeGuard::acquire_for_stdin()?;
        self.editor.set_crlf(raw.is_some());
        self.terminal = raw;
        self.attach(tokio::io::stdin())
    }

    /// Stop reading the attached input and restore the terminal.
    pub fn detach(&mut self) -> Result<(), ShellError> {
        let Some(registration) = self.input.take() else {
            return Err(ShellError::NotAttached);
        };
        drop(registration);
        self.editor.reset_decoder();
        let removed = self.editor.remove();
        self.terminal = None;
        self.editor.set_crlf(false);
        tracing::info!("input detached");
        removed.map_err(ShellError::from)
    }

    pub fn is_attached(&self) -> bool {
        self.input.is_some()
    }

    fn input_source(&self) -> Option<SourceId> {
        self.input.as_ref().map(Registration::source)
    }

    // -- Dispatch and completion ---------------------------------------------

    /// Run the command named by the first word of `line`.
    pub fn dispatch(&mut self, line: &str) {
        let Some((name, arg)) = dispatch::split_command_line(line) else {
            return;
        };
        let Some((tier, entry)) = self
            .registry
            .resolve(name)
            .map(|(tier, entry)| (tier, entry.clone()))
        else {
            tracing::debug!(command = name, "invalid command");
            let text = if self.config.color {
                format!("{}\n", settings::INVALID_COMMAND.with(settings::COLOR_HIGHLIGHT))
            } else {
                format!("{}\n", settings::INVALID_COMMAND)
            };
            self.print(text);
            return;
        };
        tracing::debug!(command = name, ?tier, "dispatching");
        entry.invoke(self, arg);
    }

    /// Completion candidates for a Tab press.
    pub fn complete(&self, request: &CompletionRequest) -> Option<CompletionMatches> {
        completion::complete(&self.registry, &request.text, request.start, &request.line)
    }

    // -- Prompt override -----------------------------------------------------

    /// Ask the user one question. The next non-empty line goes to `callback`
    /// instead of the dispatcher and is kept out of history.
    ///
    /// Returns `false` and drops `callback` while another request is pending.
    pub fn request_input<F>(&mut self, label: &str, message: &str, callback: F) -> bool
    where
        F: FnOnce(&mut Shell, &str) + 'static,
    {
        if !self.input_override.begin(Box::new(callback)) {
            tracing::debug!(label, "input request ignored, prompt already active");
            return false;
        }
        if let Err(e) = self.editor.begin_message(label, message) {
            tracing::warn!(error = %e, "failed to draw input prompt");
        }
        tracing::debug!(label, "input requested");
        true
    }

    /// Answer the pending request with `text`.
    pub fn release_input(&mut self, text: &str) -> Result<(), ShellError> {
        let Some(callback) = self.input_override.take() else {
            return Err(ShellError::PromptNotActive);
        };
        self.editor.end_message();
        if self.editor.is_active() {
            if let Err(e) = self.editor.redraw() {
                tracing::warn!(error = %e, "failed to restore prompt");
            }
        }
        tracing::debug!("input released");
        callback(self, text);
        Ok(())
    }

    pub fn is_prompting(&self) -> bool {
        self.input_override.is_active()
    }

    // -- Output ----------------------------------------------------------------

    /// Write `text` above the edit line, keeping any partial input intact.
    pub fn print(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if let Err(e) = self.editor.suspend(|out| out.write_all(text.as_bytes())) {
            tracing::warn!(error = %e, "failed to write output");
        }
    }

    /// Formatted [`print`](Self::print); see [`shell_printf!`](crate::shell_printf).
    pub fn print_fmt(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = self.editor.suspend(|out| out.write_fmt(args)) {
            tracing::warn!(error = %e, "failed to write output");
        }
    }

    /// Print `bytes` as a hex and ASCII dump, 16 bytes per row.
    pub fn hexdump(&mut self, bytes: &[u8]) {
        let rows = output::hexdump_rows(bytes);
        if rows.is_empty() {
            return;
        }
        let mut text = rows.join("\n");
        text.push('\n');
        self.print(text);
    }

    /// Print the menu commands, then the built-ins, in aligned columns.
    pub fn print_help(&mut self) {
        let column = self.config.help_column_width;
        let color = self.config.color;
        let mut text = format!("{}\n{}\n", settings::HELP_HEADER, settings::HELP_RULE);
        for (_, table) in self.registry.tiers() {
            for entry in table {
                text.push_str(&output::help_row(
                    entry.name(),
                    entry.arg_hint().unwrap_or(""),
                    entry.description(),
                    column,
                    color,
                ));
                text.push('\n');
            }
        }
        self.print(text);
    }

    // -- Lifecycle -------------------------------------------------------------

    /// Ask the loop to stop once the current event is handled.
    pub fn quit(&mut self) {
        if !self.reactor.is_stopping() {
            tracing::info!("quit requested");
        }
        self.reactor.request_stop();
    }

    pub fn is_stopping(&self) -> bool {
        self.reactor.is_stopping()
    }

    /// Run the event loop until quit, then tear everything down.
    pub fn run(&mut self) {
        if self.signals.is_none() {
            match SignalBridge::install(&mut self.reactor) {
                Ok(bridge) => self.signals = Some(bridge),
                Err(e) => {
                    eprintln!("Failed to set up signal handling: {e}");
                    tracing::warn!(error = %e, "signal bridge not installed");
                }
            }
        }

        while !self.reactor.is_stopping() {
            let Some(event) = self.reactor.next_event() else {
                tracing::debug!("no event sources left");
                break;
            };
            self.handle_event(event);
        }

        self.teardown();
    }

    fn teardown(&mut self) {
        if self.input_override.is_active() {
            let _ = self.release_input("");
        }
        if self.input.is_some() {
            if let Err(e) = self.detach() {
                tracing::warn!(error = %e, "failed to detach input");
            }
        }
        self.signals = None;
        self.terminal = None;
        tracing::info!("shell stopped");
    }

    // -- Events ------------------------------------------------------------------

    /// Handle one reactor event. Events from detached sources are dropped.
    pub fn handle_event(&mut self, event: ReactorEvent) {
        let input = self.input_source();
        let signals = self.signals.as_ref().map(SignalBridge::source);
        match event {
            ReactorEvent::Readable { source, bytes } if Some(source) == input => {
                self.feed_input(&bytes);
            }
            ReactorEvent::Hangup { source } if Some(source) == input => {
                tracing::info!("input hung up");
                self.quit();
            }
            ReactorEvent::Hangup { source } if Some(source) == signals => {
                tracing::warn!("signal source hung up");
                self.quit();
            }
            ReactorEvent::Signal { signal, .. } => self.handle_signal(signal),
            other => {
                tracing::trace!(source = ?other.source(), "dropping event from stale source");
            }
        }
    }

    /// Feed raw input bytes through the editor as if read from the input.
    pub fn feed_input(&mut self, bytes: &[u8]) {
        let source = self.input_source();
        for key in self.editor.decode(bytes) {
            if self.reactor.is_stopping() || self.input_source() != source {
                break;
            }
            self.handle_key(key);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let event = match self.editor.handle_key(key) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "terminal write failed");
                return;
            }
        };
        match event {
            EditorEvent::Pending => {}
            EditorEvent::Line(line) => self.handle_line(Some(line)),
            EditorEvent::Eof => self.handle_line(None),
            EditorEvent::Interrupt => self.handle_signal(ShellSignal::Interrupt),
            EditorEvent::Complete(request) => {
                let matches = self.complete(&request);
                if let Err(e) = self.editor.apply_completion(&request, matches) {
                    tracing::warn!(error = %e, "failed to apply completion");
                }
            }
        }
    }

    /// Route a completed line. `None` is end of input and quits.
    pub fn handle_line(&mut self, line: Option<String>) {
        let Some(line) = line else {
            if let Err(e) = self.editor.echo_and_finish(settings::EOF_ECHO) {
                tracing::warn!(error = %e, "failed to echo quit");
            }
            self.quit();
            return;
        };

        if !line.is_empty() {
            if self.input_override.is_active() {
                let _ = self.release_input(&line);
            } else {
                self.editor.add_history(&line);
                self.dispatch(&line);
            }
        }

        if self.editor.is_active() && !self.reactor.is_stopping() {
            if let Err(e) = self.editor.redraw() {
                tracing::warn!(error = %e, "failed to redraw prompt");
            }
        }
    }

    /// React to an interrupt or termination request.
    pub fn handle_signal(&mut self, signal: ShellSignal) {
        let action = self.latch.decide(signal, self.is_attached());
        tracing::info!(?signal, ?action, "signal received");
        match action {
            SignalAction::ClearLine => {
                if let Err(e) = self.editor.cancel_line(true) {
                    tracing::warn!(error = %e, "failed to clear line");
                }
            }
            SignalAction::Terminate => {
                if let Err(e) = self.editor.cancel_line(false) {
                    tracing::warn!(error = %e, "failed to clear line");
                }
                self.quit();
            }
            SignalAction::Ignore => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::SharedOutput;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn shell() -> (Shell, SharedOutput) {
        let out = SharedOutput::default();
        let config = ShellConfig {
            color: false,
            ..ShellConfig::default()
        };
        let shell = Shell::new(config, Box::new(out.clone())).unwrap();
        (shell, out)
    }

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&mut Shell, &str) + Clone) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        (calls, move |_: &mut Shell, arg: &str| {
            sink.borrow_mut().push(arg.to_string())
        })
    }

    #[test]
    fn menu_command_shadows_builtin() {
        let (mut shell, _) = shell();
        let (calls, handler) = recorder();
        shell
            .set_menu(
                CommandTable::from_entries([CommandEntry::new("quit", "Menu quit", handler)])
                    .unwrap(),
            )
            .unwrap();

        shell.dispatch("quit now");
        assert_eq!(*calls.borrow(), vec!["now".to_string()]);
        assert!(!shell.is_stopping());

        shell.dispatch("exit");
        assert!(shell.is_stopping());
    }

    #[test]
    fn dispatch_passes_trimmed_argument_to_one_handler() {
        let (mut shell, _) = shell();
        let (scan_calls, scan) = recorder();
        let (info_calls, info) = recorder();
        shell
            .set_menu(
                CommandTable::from_entries([
                    CommandEntry::new("scan", "Scan", scan),
                    CommandEntry::new("info", "Info", info),
                ])
                .unwrap(),
            )
            .unwrap();

        shell.dispatch("  scan on ");
        shell.dispatch("scan");
        assert_eq!(*scan_calls.borrow(), vec!["on".to_string(), String::new()]);
        assert!(info_calls.borrow().is_empty());
    }

    #[test]
    fn unknown_command_prints_invalid() {
        let (mut shell, out) = shell();
        shell.dispatch("bogus arg");
        assert!(out.contents().contains("Invalid command"));
        assert!(!shell.is_stopping());
    }

    #[test]
    fn second_menu_is_rejected() {
        let (mut shell, _) = shell();
        let menu = || {
            CommandTable::from_entries([CommandEntry::new("scan", "Scan", |_, _| {})]).unwrap()
        };
        shell.set_menu(menu()).unwrap();
        assert!(matches!(
            shell.set_menu(menu()),
            Err(ShellError::MenuAlreadySet)
        ));
    }

    #[test]
    fn prompt_override_is_mutually_exclusive() {
        let (mut shell, _) = shell();
        let answers = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&answers);
        assert!(shell.request_input("agent", "Enter PIN:", move |_, text| {
            first.borrow_mut().push(format!("first:{text}"))
        }));
        let second = Rc::clone(&answers);
        assert!(!shell.request_input("agent", "Again:", move |_, text| {
            second.borrow_mut().push(format!("second:{text}"))
        }));
        assert!(shell.is_prompting());

        shell.release_input("1234").unwrap();
        assert_eq!(*answers.borrow(), vec!["first:1234".to_string()]);
        assert!(!shell.is_prompting());
        assert!(matches!(
            shell.release_input("x"),
            Err(ShellError::PromptNotActive)
        ));
        assert_eq!(answers.borrow().len(), 1);
    }

    #[test]
    fn callback_may_chain_another_request() {
        let (mut shell, _) = shell();
        let answers = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&answers);
        shell.request_input("agent", "PIN:", move |shell, pin| {
            sink.borrow_mut().push(pin.to_string());
            let sink = Rc::clone(&sink);
            shell.request_input("agent", "Confirm:", move |_, ok| {
                sink.borrow_mut().push(ok.to_string())
            });
        });
        shell.release_input("0000").unwrap();
        assert!(shell.is_prompting());
        shell.release_input("yes").unwrap();
        assert_eq!(*answers.borrow(), vec!["0000".to_string(), "yes".to_string()]);
    }

    #[test]
    fn prompted_lines_stay_out_of_history() {
        let (mut shell, _) = shell();
        let answer = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&answer);
        shell.request_input("agent", "PIN:", move |_, text| {
            *sink.borrow_mut() = text.to_string()
        });

        shell.feed_input(b"secret\r");
        assert_eq!(*answer.borrow(), "secret");
        assert!(shell.history().is_empty());

        shell.feed_input(b"version\r");
        assert_eq!(shell.history().entries(), &["version"]);
    }

    #[test]
    fn empty_line_does_not_release_prompt() {
        let (mut shell, _) = shell();
        shell.request_input("agent", "PIN:", |_, _| {});
        shell.feed_input(b"\r");
        assert!(shell.is_prompting());
        assert!(shell.history().is_empty());
    }

    #[test]
    fn termination_is_idempotent() {
        let (mut shell, out) = shell();
        shell.handle_signal(ShellSignal::Terminate);
        assert!(shell.is_stopping());
        let after_first = out.contents();
        shell.handle_signal(ShellSignal::Terminate);
        assert_eq!(out.contents(), after_first);
    }

    #[test]
    fn interrupt_before_attach_terminates() {
        let (mut shell, _) = shell();
        shell.handle_signal(ShellSignal::Interrupt);
        assert!(shell.is_stopping());
    }

    #[test]
    fn interrupt_while_attached_clears_the_line() {
        let (mut shell, _) = shell();
        shell.attach(&b""[..]).unwrap();
        shell.feed_input(b"half typed");
        shell.handle_signal(ShellSignal::Interrupt);
        assert_eq!(shell.editor().buffer(), "");
        assert!(!shell.is_stopping());
    }

    #[test]
    fn ctrl_c_key_acts_like_interrupt() {
        let (mut shell, _) = shell();
        shell.attach(&b""[..]).unwrap();
        shell.feed_input(b"abc\x03");
        assert_eq!(shell.editor().buffer(), "");
        assert!(!shell.is_stopping());
    }

    #[test]
    fn attach_and_detach_report_misuse() {
        let (mut shell, _) = shell();
        assert!(matches!(shell.detach(), Err(ShellError::NotAttached)));
        shell.attach(&b""[..]).unwrap();
        assert!(matches!(
            shell.attach(&b""[..]),
            Err(ShellError::AlreadyAttached)
        ));
        shell.detach().unwrap();
        assert!(!shell.is_attached());
        assert!(!shell.editor().is_active());
    }

    #[test]
    fn end_of_input_echoes_quit() {
        let (mut shell, out) = shell();
        shell.attach(&b""[..]).unwrap();
        shell.feed_input(b"\x04");
        assert!(shell.is_stopping());
        assert!(out.contents().contains("> quit"));
    }

    #[test]
    fn hexdump_prints_one_row_per_sixteen_bytes() {
        let (mut shell, out) = shell();
        shell.hexdump(b"ABCDEFGHIJKLMNOP");
        let text = out.contents();
        assert!(text.contains(
            "  41 42 43 44 45 46 47 48 49 4a 4b 4c 4d 4e 4f 50  ABCDEFGHIJKLMNOP\n"
        ));

        out.clear();
        shell.hexdump(b"ABCDEFGHIJKLMNOPQ");
        assert_eq!(out.contents().lines().count(), 2);
    }

    #[test]
    fn help_lists_menu_before_builtins() {
        let (mut shell, out) = shell();
        shell
            .set_menu(
                CommandTable::from_entries([CommandEntry::new("scan", "Scan devices", |_, _| {})
                    .with_args("<on/off>")])
                .unwrap(),
            )
            .unwrap();
        shell.dispatch("help");
        let text = out.contents();
        assert!(text.starts_with("Available commands:\n-------------------\n"));
        let scan = text.find("scan <on/off>").unwrap();
        let version = text.find("version").unwrap();
        assert!(scan < version);
        assert!(text.contains("Display help about this program"));
    }

    #[test]
    fn tab_completes_command_names() {
        let (mut shell, _) = shell();
        shell.attach(&b""[..]).unwrap();
        shell.feed_input(b"he\t");
        assert_eq!(shell.editor().buffer(), "help ");
    }

    #[test]
    fn printf_macro_writes_through_editor() {
        let (mut shell, out) = shell();
        crate::shell_printf!(shell, "[NEW] Device {}\n", "00:11");
        assert!(out.contents().contains("[NEW] Device 00:11\n"));
    }

    #[test]
    fn stale_source_events_are_dropped() {
        let (mut shell, _) = shell();
        let stale = shell.reactor_mut().sender();
        shell.attach(&b""[..]).unwrap();
        shell.handle_event(ReactorEvent::Readable {
            source: stale.source(),
            bytes: b"quit\r".to_vec(),
        });
        shell.handle_event(ReactorEvent::Hangup {
            source: stale.source(),
        });
        assert!(!shell.is_stopping());
        assert_eq!(shell.editor().buffer(), "");
    }
}
