//! Centralized, hardcoded UI settings for the terminal surface.
//!
//! Prompt decorations, glyphs, and colors live here so rendering code only
//! refers to names.

use crossterm::style::Color;
use unicode_width::UnicodeWidthChar;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

pub const FALLBACK_TERMINAL_COLUMNS: usize = 80;
pub const COMPLETION_COLUMN_GAP: usize = 2;

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

pub const MESSAGE_LABEL_OPEN: &str = "[";
pub const MESSAGE_LABEL_CLOSE: &str = "]";
pub const PROMPT_SPACER: &str = " ";
pub const BELL: &str = "\x07";

pub const HELP_HEADER: &str = "Available commands:";
pub const HELP_RULE: &str = "-------------------";
pub const INVALID_COMMAND: &str = "Invalid command";

/// Text typed onto the edit line when the input reaches end-of-file.
pub const EOF_ECHO: &str = "quit";

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

pub const COLOR_MESSAGE_LABEL: Color = Color::Red;
pub const COLOR_HIGHLIGHT: Color = Color::Blue;

/// Render the plain-text prompt shown while an input request is outstanding.
pub fn message_prompt_text(label: &str, message: &str) -> String {
    format!("{MESSAGE_LABEL_OPEN}{label}{MESSAGE_LABEL_CLOSE}{PROMPT_SPACER}{message}{PROMPT_SPACER}")
}

/// Count terminal cells used by `s`, skipping ANSI CSI escape sequences.
pub fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for next in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&next) {
                    break;
                }
            }
            continue;
        }
        width += ch.width().unwrap_or(0);
    }
    width
}
