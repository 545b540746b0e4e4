//! Single-line terminal editor driven one key at a time.
//!
//! The editor never blocks: the shell feeds it keys decoded from whatever the
//! reactor delivered and acts on the returned [`EditorEvent`]. Output from
//! elsewhere goes through [`LineEditor::suspend`], which blanks the edit line,
//! lets the caller write, and redraws the prompt with the buffer and cursor
//! exactly as they were.

use crate::tui::history::{
    byte_index_at_char, char_count, delete_char_range, insert_char_at_cursor,
    insert_str_at_cursor, previous_word_start, word_start, History,
};
use crate::tui::keys::KeyDecoder;
use crate::tui::settings;
use crossterm::cursor::MoveToColumn;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::{Print, PrintStyledContent, Stylize};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

/// Custom renderer for a list of completion candidates.
pub type DisplayHook = Rc<dyn Fn(&mut dyn Write, &[String]) -> io::Result<()>>;

/// What the editor needs from the completion engine after Tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// The partial word being completed.
    pub text: String,
    /// Char offset of `text` within `line`.
    pub start: usize,
    /// Whole edit buffer at the time Tab was pressed.
    pub line: String,
}

/// Candidates produced for a [`CompletionRequest`].
#[derive(Clone, Default)]
pub struct CompletionMatches {
    pub candidates: Vec<String>,
    /// Optional renderer used when the candidates are listed.
    pub display: Option<DisplayHook>,
}

impl fmt::Debug for CompletionMatches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionMatches")
            .field("candidates", &self.candidates)
            .field("display", &self.display.is_some())
            .finish()
    }
}

/// Result of feeding one key to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// Key consumed; nothing for the caller to do.
    Pending,
    /// User pressed Enter.
    Line(String),
    /// `Ctrl-D` on an empty line.
    Eof,
    /// `Ctrl-C`.
    Interrupt,
    /// Tab; answer with [`LineEditor::apply_completion`].
    Complete(CompletionRequest),
}

/// Prompt and edit state stashed while a message prompt is shown.
#[derive(Debug, Clone)]
struct SavedEdit {
    buffer: String,
    cursor: usize,
}

/// The line surface: prompt, edit buffer, cursor, and history.
pub struct LineEditor {
    out: Box<dyn Write>,
    color: bool,
    crlf: bool,
    active: bool,
    prompt: String,
    message: Option<(String, String)>,
    saved: Option<SavedEdit>,
    buffer: String,
    cursor: usize,
    history: History,
    decoder: KeyDecoder,
}

impl LineEditor {
    pub fn new(out: Box<dyn Write>, prompt: &str, color: bool, history_limit: usize) -> Self {
        Self {
            out,
            color,
            crlf: false,
            active: false,
            prompt: prompt.to_string(),
            message: None,
            saved: None,
            buffer: String::new(),
            cursor: 0,
            history: History::new(history_limit),
            decoder: KeyDecoder::new(),
        }
    }

    /// Translate `\n` to `\r\n` on output; needed while the terminal is raw.
    pub fn set_crlf(&mut self, crlf: bool) {
        self.crlf = crlf;
    }

    /// Start accepting input. Nothing is drawn until [`redraw`](Self::redraw).
    pub fn install(&mut self) {
        self.active = true;
    }

    /// Stop editing: drop any message prompt and blank the edit line.
    pub fn remove(&mut self) -> io::Result<()> {
        self.message = None;
        self.active = false;
        self.out.queue(MoveToColumn(0))?;
        self.out.queue(Clear(ClearType::CurrentLine))?;
        self.out.flush()
    }

    /// Whether an edit is in progress (the editor is not finished).
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Text currently shown before the buffer.
    pub fn displayed_prompt(&self) -> String {
        match &self.message {
            Some((label, message)) => settings::message_prompt_text(label, message),
            None => self.prompt.clone(),
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Record a submitted line; see [`History::push`].
    pub fn add_history(&mut self, line: &str) -> bool {
        self.history.push(line)
    }

    /// Replace the normal prompt and redraw it in place.
    pub fn set_prompt(&mut self, prompt: &str) -> io::Result<()> {
        self.prompt = prompt.to_string();
        if self.active {
            self.redraw()?;
        }
        Ok(())
    }

    /// Save the current edit and show `[label] message` as the prompt.
    ///
    /// The edit line starts empty until [`end_message`](Self::end_message).
    pub fn begin_message(&mut self, label: &str, message: &str) -> io::Result<()> {
        self.saved = Some(SavedEdit {
            buffer: std::mem::take(&mut self.buffer),
            cursor: std::mem::replace(&mut self.cursor, 0),
        });
        self.history.reset_navigation();
        self.message = Some((label.to_string(), message.to_string()));
        if self.active {
            self.redraw()?;
        }
        Ok(())
    }

    /// Restore the prompt and edit saved by [`begin_message`](Self::begin_message).
    pub fn end_message(&mut self) {
        self.message = None;
        if let Some(saved) = self.saved.take() {
            self.buffer = saved.buffer;
            self.cursor = saved.cursor;
        }
    }

    /// Decode raw input bytes into keys.
    pub fn decode(&mut self, bytes: &[u8]) -> Vec<KeyEvent> {
        self.decoder.push(bytes)
    }

    /// Drop partially decoded input, e.g. when the source is detached.
    pub fn reset_decoder(&mut self) {
        self.decoder.reset();
    }

    /// Run `write` with the edit line blanked, then restore it.
    ///
    /// The buffer and cursor are redrawn even when `write` fails.
    pub fn suspend<F>(&mut self, write: F) -> io::Result<()>
    where
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        if !self.active {
            let written = write(&mut CrlfWriter::new(&mut *self.out, self.crlf));
            return written.and(self.out.flush());
        }

        self.out.queue(MoveToColumn(0))?;
        self.out.queue(Clear(ClearType::CurrentLine))?;
        let written = write(&mut CrlfWriter::new(&mut *self.out, self.crlf));
        let restored = self.redraw();
        written.and(restored)
    }

    /// Repaint prompt and buffer on the current row and place the cursor.
    pub fn redraw(&mut self) -> io::Result<()> {
        self.out.queue(MoveToColumn(0))?;
        self.out.queue(Clear(ClearType::CurrentLine))?;
        self.write_prompt()?;
        self.out.queue(Print(&self.buffer))?;
        let prompt_width = settings::visible_width(&self.displayed_prompt());
        let before_cursor = &self.buffer[..byte_index_at_char(&self.buffer, self.cursor)];
        let column = prompt_width + settings::visible_width(before_cursor);
        self.out
            .queue(MoveToColumn(column.min(u16::MAX as usize) as u16))?;
        self.out.flush()
    }

    /// Discard the edit, end the row, and optionally draw a fresh prompt.
    pub fn cancel_line(&mut self, redraw: bool) -> io::Result<()> {
        self.buffer.clear();
        self.cursor = 0;
        self.history.reset_navigation();
        self.out.queue(Print("\r\n"))?;
        if redraw {
            self.redraw()
        } else {
            self.out.flush()
        }
    }

    /// Type `text` onto the edit line and end the row, as on end-of-input.
    pub fn echo_and_finish(&mut self, text: &str) -> io::Result<()> {
        insert_str_at_cursor(&mut self.buffer, &mut self.cursor, text);
        self.redraw()?;
        self.buffer.clear();
        self.cursor = 0;
        self.out.queue(Print("\r\n"))?;
        self.out.flush()
    }

    /// Apply one key and report what the caller must do next.
    pub fn handle_key(&mut self, key: KeyEvent) -> io::Result<EditorEvent> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Enter => return self.submit(),
            KeyCode::Tab => {
                let start = word_start(&self.buffer, self.cursor);
                let start_byte = byte_index_at_char(&self.buffer, start);
                let end_byte = byte_index_at_char(&self.buffer, self.cursor);
                return Ok(EditorEvent::Complete(CompletionRequest {
                    text: self.buffer[start_byte..end_byte].to_string(),
                    start,
                    line: self.buffer.clone(),
                }));
            }
            KeyCode::Char('c') if ctrl => return Ok(EditorEvent::Interrupt),
            KeyCode::Char('d') if ctrl => {
                if self.buffer.is_empty() {
                    return Ok(EditorEvent::Eof);
                }
                // Otherwise delete-forward, like readline.
                self.delete_forward();
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Char('b') if ctrl => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.forward_char(),
            KeyCode::Char('f') if ctrl => self.forward_char(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::End => self.cursor = char_count(&self.buffer),
            KeyCode::Char('e') if ctrl => self.cursor = char_count(&self.buffer),
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    delete_char_range(&mut self.buffer, self.cursor - 1, self.cursor);
                    self.cursor -= 1;
                }
            }
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Char('k') if ctrl => {
                let end = char_count(&self.buffer);
                delete_char_range(&mut self.buffer, self.cursor, end);
            }
            KeyCode::Char('u') if ctrl => {
                delete_char_range(&mut self.buffer, 0, self.cursor);
                self.cursor = 0;
            }
            KeyCode::Char('w') if ctrl => {
                let start = previous_word_start(&self.buffer, self.cursor);
                delete_char_range(&mut self.buffer, start, self.cursor);
                self.cursor = start;
            }
            KeyCode::Up => self.history_up(),
            KeyCode::Char('p') if ctrl => self.history_up(),
            KeyCode::Down => self.history_down(),
            KeyCode::Char('n') if ctrl => self.history_down(),
            KeyCode::Char(ch) => {
                if ctrl || alt {
                    return Ok(EditorEvent::Pending);
                }
                insert_char_at_cursor(&mut self.buffer, &mut self.cursor, ch);
            }
            _ => return Ok(EditorEvent::Pending),
        }

        self.redraw()?;
        Ok(EditorEvent::Pending)
    }

    /// Complete the word described by `request` with `matches`.
    ///
    /// A single candidate replaces the word and appends a space. Several
    /// candidates insert their longest common prefix, or get listed below
    /// the edit line when that prefix adds nothing. No candidates rings the
    /// bell.
    pub fn apply_completion(
        &mut self,
        request: &CompletionRequest,
        matches: Option<CompletionMatches>,
    ) -> io::Result<()> {
        let matches = matches.map(|mut m| {
            dedup_candidates(&mut m.candidates);
            m
        });
        let Some(matches) = matches.filter(|m| !m.candidates.is_empty()) else {
            self.out.queue(Print(settings::BELL))?;
            return self.out.flush();
        };

        if let [only] = matches.candidates.as_slice() {
            self.replace_word(request.start, &format!("{only} "));
            return self.redraw();
        }

        let prefix = longest_common_prefix(&matches.candidates);
        if char_count(prefix) > char_count(&request.text) {
            let prefix = prefix.to_string();
            self.replace_word(request.start, &prefix);
            return self.redraw();
        }

        self.out.queue(Print("\r\n"))?;
        let listed = {
            let mut writer = CrlfWriter::new(&mut *self.out, self.crlf);
            match matches.display.as_ref() {
                Some(hook) => hook(&mut writer, &matches.candidates),
                None => write_columns(&mut writer, &matches.candidates, terminal_columns()),
            }
        };
        let restored = self.redraw();
        listed.and(restored)
    }

    fn submit(&mut self) -> io::Result<EditorEvent> {
        let line = std::mem::take(&mut self.buffer);
        self.cursor = 0;
        self.history.reset_navigation();
        if line.is_empty() {
            // Empty lines are erased instead of scrolled.
            self.out.queue(MoveToColumn(0))?;
            self.out.queue(Clear(ClearType::CurrentLine))?;
        } else {
            self.out.queue(Print("\r\n"))?;
        }
        self.out.flush()?;
        Ok(EditorEvent::Line(line))
    }

    fn forward_char(&mut self) {
        if self.cursor < char_count(&self.buffer) {
            self.cursor += 1;
        }
    }

    fn delete_forward(&mut self) {
        if self.cursor < char_count(&self.buffer) {
            delete_char_range(&mut self.buffer, self.cursor, self.cursor + 1);
        }
    }

    fn history_up(&mut self) {
        self.history.up(&mut self.buffer);
        self.cursor = char_count(&self.buffer);
    }

    fn history_down(&mut self) {
        self.history.down(&mut self.buffer);
        self.cursor = char_count(&self.buffer);
    }

    fn replace_word(&mut self, start: usize, replacement: &str) {
        let start = start.min(self.cursor);
        delete_char_range(&mut self.buffer, start, self.cursor);
        self.cursor = start;
        insert_str_at_cursor(&mut self.buffer, &mut self.cursor, replacement);
    }

    fn write_prompt(&mut self) -> io::Result<()> {
        match &self.message {
            Some((label, message)) if self.color => {
                let tag = format!(
                    "{}{label}{}",
                    settings::MESSAGE_LABEL_OPEN,
                    settings::MESSAGE_LABEL_CLOSE
                );
                self.out
                    .queue(PrintStyledContent(tag.with(settings::COLOR_MESSAGE_LABEL)))?;
                self.out.queue(Print(format!(
                    "{}{message}{}",
                    settings::PROMPT_SPACER,
                    settings::PROMPT_SPACER
                )))?;
            }
            _ => {
                let text = self.displayed_prompt();
                self.out.queue(Print(text))?;
            }
        }
        Ok(())
    }
}

/// Drop repeated candidates, keeping the first occurrence of each.
fn dedup_candidates(candidates: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    candidates.retain(|candidate| seen.insert(candidate.clone()));
}

/// Longest prefix shared by every candidate, on a char boundary.
pub(crate) fn longest_common_prefix(candidates: &[String]) -> &str {
    let Some(first) = candidates.first() else {
        return "";
    };
    let mut end = first.len();
    for other in &candidates[1..] {
        end = first[..end]
            .char_indices()
            .zip(other.chars())
            .find(|((_, a), b)| a != b)
            .map(|((idx, _), _)| idx)
            .unwrap_or_else(|| end.min(other.len()));
    }
    while !first.is_char_boundary(end) {
        end -= 1;
    }
    &first[..end]
}

/// List candidates in aligned columns that fit `width` cells.
pub(crate) fn write_columns(
    out: &mut dyn Write,
    candidates: &[String],
    width: usize,
) -> io::Result<()> {
    let cell = candidates
        .iter()
        .map(|c| settings::visible_width(c))
        .max()
        .unwrap_or(0)
        + settings::COMPLETION_COLUMN_GAP;
    let per_row = (width / cell.max(1)).max(1);
    for row in candidates.chunks(per_row) {
        let mut line = String::new();
        for (idx, candidate) in row.iter().enumerate() {
            line.push_str(candidate);
            if idx + 1 < row.len() {
                let pad = cell.saturating_sub(settings::visible_width(candidate));
                line.push_str(&" ".repeat(pad));
            }
        }
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn terminal_columns() -> usize {
    terminal::size()
        .ok()
        .map(|(cols, _)| cols as usize)
        .filter(|cols| *cols > 0)
        .unwrap_or(settings::FALLBACK_TERMINAL_COLUMNS)
}

/// Writer adapter turning `\n` into `\r\n` while the terminal is raw.
struct CrlfWriter<'a> {
    inner: &'a mut dyn Write,
    crlf: bool,
}

impl<'a> CrlfWriter<'a> {
    fn new(inner: &'a mut dyn Write, crlf: bool) -> Self {
        Self { inner, crlf }
    }
}

impl Write for CrlfWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.crlf {
            return self.inner.write(buf);
        }
        let mut segments = buf.split(|b| *b == b'\n').peekable();
        while let Some(segment) = segments.next() {
            self.inner.write_all(segment)?;
            if segments.peek().is_some() {
                self.inner.write_all(b"\r\n")?;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
