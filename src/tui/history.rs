//! In-memory command history and the text helpers the editor needs.

/// Bounded line history with up/down navigation state.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    limit: usize,
    /// Index of the entry currently shown, or `None` while editing a fresh line.
    cursor: Option<usize>,
    /// The fresh line saved when navigation started.
    draft: String,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
            cursor: None,
            draft: String::new(),
        }
    }

    /// Add a line unless it is blank or repeats the previous entry.
    ///
    /// Returns whether the line was recorded.
    pub fn push(&mut self, entry: &str) -> bool {
        if entry.trim().is_empty() {
            return false;
        }
        if self.entries.last().map(String::as_str) == Some(entry) {
            return false;
        }

        self.entries.push(entry.to_string());
        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(0..overflow);
        }
        true
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget any in-progress navigation.
    pub fn reset_navigation(&mut self) {
        self.cursor = None;
        self.draft.clear();
    }

    /// Step to the previous entry, replacing `buffer`.
    pub fn up(&mut self, buffer: &mut String) {
        if self.entries.is_empty() {
            return;
        }

        match self.cursor.as_mut() {
            Some(idx) => {
                if *idx > 0 {
                    *idx -= 1;
                }
            }
            None => {
                self.draft = buffer.clone();
                self.cursor = Some(self.entries.len() - 1);
            }
        }

        if let Some(idx) = self.cursor {
            *buffer = self.entries[idx].clone();
        }
    }

    /// Step to the next entry, or back to the saved draft past the newest one.
    pub fn down(&mut self, buffer: &mut String) {
        let Some(idx) = self.cursor else {
            return;
        };

        if idx + 1 < self.entries.len() {
            self.cursor = Some(idx + 1);
            *buffer = self.entries[idx + 1].clone();
            return;
        }

        self.cursor = None;
        *buffer = std::mem::take(&mut self.draft);
    }
}

/// Insert one char at the current cursor position.
pub(crate) fn insert_char_at_cursor(buffer: &mut String, cursor: &mut usize, ch: char) {
    let byte_idx = byte_index_at_char(buffer, *cursor);
    buffer.insert(byte_idx, ch);
    *cursor += 1;
}

/// Insert a string at the cursor, advancing the cursor past it.
pub(crate) fn insert_str_at_cursor(buffer: &mut String, cursor: &mut usize, text: &str) {
    let byte_idx = byte_index_at_char(buffer, *cursor);
    buffer.insert_str(byte_idx, text);
    *cursor += char_count(text);
}

/// Delete a char range represented in char indices.
pub(crate) fn delete_char_range(buffer: &mut String, start_char: usize, end_char: usize) {
    if start_char >= end_char {
        return;
    }
    let start = byte_index_at_char(buffer, start_char);
    let end = byte_index_at_char(buffer, end_char);
    buffer.replace_range(start..end, "");
}

/// Return the char index where the previous word starts.
pub(crate) fn previous_word_start(buffer: &str, cursor: usize) -> usize {
    let chars: Vec<char> = buffer.chars().collect();
    let mut idx = cursor.min(chars.len());
    while idx > 0 && chars[idx - 1].is_whitespace() {
        idx -= 1;
    }
    while idx > 0 && !chars[idx - 1].is_whitespace() {
        idx -= 1;
    }
    idx
}

/// Return the char index where the word under the cursor starts.
///
/// Unlike [`previous_word_start`], trailing whitespace is not skipped: a
/// cursor right after a space starts an empty word.
pub(crate) fn word_start(buffer: &str, cursor: usize) -> usize {
    let chars: Vec<char> = buffer.chars().collect();
    let mut idx = cursor.min(chars.len());
    while idx > 0 && !chars[idx - 1].is_whitespace() {
        idx -= 1;
    }
    idx
}

/// Convert a char index to a byte index, preserving UTF-8 boundaries.
pub(crate) fn byte_index_at_char(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len())
}

/// Return total char count for a UTF-8 string.
pub(crate) fn char_count(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_repeated_lines_are_not_recorded() {
        let mut history = History::new(10);
        assert!(history.push("one"));
        assert!(!history.push("one"));
        assert!(!history.push("   "));
        assert!(history.push("two"));
        assert!(history.push("one"));
        assert_eq!(history.entries(), &["one", "two", "one"]);
    }

    #[test]
    fn oldest_entries_are_dropped_past_limit() {
        let mut history = History::new(2);
        history.push("a");
        history.push("b");
        history.push("c");
        assert_eq!(history.entries(), &["b", "c"]);
    }

    #[test]
    fn navigation_restores_the_draft() {
        let mut history = History::new(10);
        history.push("first");
        history.push("second");

        let mut buffer = "draft".to_string();
        history.up(&mut buffer);
        assert_eq!(buffer, "second");
        history.up(&mut buffer);
        assert_eq!(buffer, "first");
        history.up(&mut buffer);
        assert_eq!(buffer, "first");
        history.down(&mut buffer);
        assert_eq!(buffer, "second");
        history.down(&mut buffer);
        assert_eq!(buffer, "draft");
    }

    #[test]
    fn word_boundaries() {
        assert_eq!(previous_word_start("info dev ", 9), 5);
        assert_eq!(word_start("info dev ", 9), 9);
        assert_eq!(word_start("info de", 7), 5);
        assert_eq!(word_start("he", 2), 0);
    }

    #[test]
    fn byte_index_respects_utf8_boundaries() {
        let s = "aéz";
        assert_eq!(byte_index_at_char(s, 0), 0);
        assert_eq!(byte_index_at_char(s, 1), 1);
        assert_eq!(byte_index_at_char(s, 2), 3);
        assert_eq!(byte_index_at_char(s, 3), s.len());
    }
}
