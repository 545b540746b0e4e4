//! Splitting a completed line into command name and argument text.

/// Split `line` into `(command, argument)`.
///
/// The command is the first whitespace-delimited token. The argument is the
/// rest of the line after the one delimiter that ended the command, with a
/// single trailing space removed. Blank lines yield `None`.
pub fn split_command_line(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return None;
    }

    let (cmd, rest) = match trimmed.char_indices().find(|(_, ch)| ch.is_whitespace()) {
        Some((idx, delim)) => (&trimmed[..idx], &trimmed[idx + delim.len_utf8()..]),
        None => (trimmed, ""),
    };
    let arg = rest.strip_suffix(' ').unwrap_or(rest);
    Some((cmd, arg))
}
