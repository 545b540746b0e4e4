//! Tab completion over the command registry.
//!
//! The first word completes against command names. The second word is
//! handed to the generator of the command typed as the first word; later
//! words do not complete.

use crate::shell::command::{CommandRegistry, CommandTable};
use crate::tui::CompletionMatches;

/// Lazy, finite sequence of command names starting with a prefix.
///
/// Built-in names come first, then menu names. Creating a new iterator is
/// the restart; an exhausted iterator stays exhausted.
#[derive(Debug, Clone)]
pub struct CommandNameCandidates<'a> {
    prefix: &'a str,
    tables: [Option<&'a CommandTable>; 2],
    table: usize,
    index: usize,
}

impl<'a> CommandNameCandidates<'a> {
    pub fn new(registry: &'a CommandRegistry, prefix: &'a str) -> Self {
        Self {
            prefix,
            tables: [Some(registry.builtins()), registry.menu()],
            table: 0,
            index: 0,
        }
    }
}

impl<'a> Iterator for CommandNameCandidates<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while self.table < self.tables.len() {
            let Some(table) = self.tables[self.table] else {
                self.table += 1;
                self.index = 0;
                continue;
            };
            match table.iter().nth(self.index) {
                Some(entry) => {
                    self.index += 1;
                    // A menu entry shadowing a built-in was already yielded.
                    let shadowed = self.table > 0
                        && self.tables[0]
                            .is_some_and(|builtins| builtins.find(entry.name()).is_some());
                    if !shadowed && entry.name().starts_with(self.prefix) {
                        return Some(entry.name());
                    }
                }
                None => {
                    self.table += 1;
                    self.index = 0;
                }
            }
        }
        None
    }
}

impl std::iter::FusedIterator for CommandNameCandidates<'_> {}

/// Complete `text`, which starts at char offset `start` of `line`.
///
/// Returns `None` when completion of an argument is not supported for the
/// typed command, which means no candidates and no fallback completion.
pub fn complete(
    registry: &CommandRegistry,
    text: &str,
    start: usize,
    line: &str,
) -> Option<CompletionMatches> {
    if start == 0 {
        return Some(CompletionMatches {
            candidates: CommandNameCandidates::new(registry, text)
                .map(str::to_string)
                .collect(),
            display: None,
        });
    }

    // Only the word right after the command name completes through its generator.
    let typed: String = line.chars().take(start).collect();
    let mut words = typed.split_whitespace();
    let command = words.next()?;
    if words.next().is_some() {
        return None;
    }
    let entry = registry.completion_entry(command)?;
    let generator = entry.generator()?;
    Some(CompletionMatches {
        candidates: generator(text),
        display: entry.display_hook().cloned(),
    })
}
