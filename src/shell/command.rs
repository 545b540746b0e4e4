//! Command entries, tables, and the two-tier registry.
//!
//! A registry holds the built-in table plus at most one custom menu. Lookups
//! for execution prefer the menu so an embedding application can shadow a
//! built-in; completion lookups check built-ins first.

use crate::error::ShellError;
use crate::shell::Shell;
use crate::tui::DisplayHook;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

/// Runs a command with the text after its name.
pub type CommandHandler = Rc<dyn Fn(&mut Shell, &str)>;

/// Produces argument candidates for the partial word being completed.
pub type CompletionGenerator = Rc<dyn Fn(&str) -> Vec<String>>;

/// One named command. Immutable once built.
#[derive(Clone)]
pub struct CommandEntry {
    name: String,
    arg_hint: Option<String>,
    description: String,
    handler: CommandHandler,
    generator: Option<CompletionGenerator>,
    display: Option<DisplayHook>,
}

impl CommandEntry {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut Shell, &str) + 'static,
    {
        Self {
            name: name.into(),
            arg_hint: None,
            description: description.into(),
            handler: Rc::new(handler),
            generator: None,
            display: None,
        }
    }

    /// Argument hint shown by `help`, e.g. `<on/off>`.
    pub fn with_args(mut self, hint: impl Into<String>) -> Self {
        self.arg_hint = Some(hint.into());
        self
    }

    /// Generator consulted when completing this command's arguments.
    pub fn with_completion<G>(mut self, generator: G) -> Self
    where
        G: Fn(&str) -> Vec<String> + 'static,
    {
        self.generator = Some(Rc::new(generator));
        self
    }

    /// Renderer used when this command's argument candidates are listed.
    pub fn with_display<H>(mut self, hook: H) -> Self
    where
        H: Fn(&mut dyn Write, &[String]) -> io::Result<()> + 'static,
    {
        self.display = Some(Rc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arg_hint(&self) -> Option<&str> {
        self.arg_hint.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn generator(&self) -> Option<&CompletionGenerator> {
        self.generator.as_ref()
    }

    pub fn display_hook(&self) -> Option<&DisplayHook> {
        self.display.as_ref()
    }

    pub(crate) fn invoke(&self, shell: &mut Shell, arg: &str) {
        (self.handler)(shell, arg)
    }
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("arg_hint", &self.arg_hint)
            .field("description", &self.description)
            .field("generator", &self.generator.is_some())
            .field("display", &self.display.is_some())
            .finish()
    }
}

/// Ordered list of commands with unique names.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    entries: Vec<CommandEntry>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, rejecting duplicate names.
    pub fn from_entries<I>(entries: I) -> Result<Self, ShellError>
    where
        I: IntoIterator<Item = CommandEntry>,
    {
        let mut table = Self::new();
        for entry in entries {
            table.insert(entry)?;
        }
        Ok(table)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn command(mut self, entry: CommandEntry) -> Result<Self, ShellError> {
        self.insert(entry)?;
        Ok(self)
    }

    /// Append `entry`, keeping registration order.
    pub fn insert(&mut self, entry: CommandEntry) -> Result<(), ShellError> {
        if self.find(entry.name()).is_some() {
            return Err(ShellError::DuplicateCommand(entry.name));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Exact, case-sensitive lookup.
    pub fn find(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommandEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a CommandTable {
    type Item = &'a CommandEntry;
    type IntoIter = std::slice::Iter<'a, CommandEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Which table a resolved command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTier {
    Menu,
    Builtin,
}

/// Built-in table plus the optional custom menu.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    builtins: CommandTable,
    menu: Option<CommandTable>,
}

impl CommandRegistry {
    pub fn new(builtins: CommandTable) -> Self {
        Self {
            builtins,
            menu: None,
        }
    }

    /// Install the custom menu. Only the first non-empty menu is accepted.
    pub fn set_menu(&mut self, menu: CommandTable) -> Result<(), ShellError> {
        if self.menu.is_some() {
            return Err(ShellError::MenuAlreadySet);
        }
        if menu.is_empty() {
            return Err(ShellError::EmptyMenu);
        }
        self.menu = Some(menu);
        Ok(())
    }

    pub fn menu(&self) -> Option<&CommandTable> {
        self.menu.as_ref()
    }

    pub fn builtins(&self) -> &CommandTable {
        &self.builtins
    }

    /// Find the command to execute: menu first, then built-ins.
    pub fn resolve(&self, name: &str) -> Option<(CommandTier, &CommandEntry)> {
        self.tiers()
            .find_map(|(tier, table)| table.find(name).map(|entry| (tier, entry)))
    }

    /// Find the command whose arguments are being completed: built-ins first,
    /// then the menu.
    pub fn completion_entry(&self, name: &str) -> Option<&CommandEntry> {
        self.builtins
            .find(name)
            .or_else(|| self.menu.as_ref().and_then(|menu| menu.find(name)))
    }

    /// Tables in execution precedence order.
    pub fn tiers(&self) -> impl Iterator<Item = (CommandTier, &CommandTable)> {
        self.menu
            .iter()
            .map(|menu| (CommandTier::Menu, menu))
            .chain(std::iter::once((CommandTier::Builtin, &self.builtins)))
    }
}
