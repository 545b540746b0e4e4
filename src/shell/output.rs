//! Formatting for the shell's own output: hex dumps and the help listing.

use crate::tui::settings;
use crossterm::style::Stylize;

const HEXDUMP_WIDTH: usize = 16;

/// Render `bytes` as hexdump rows of 16 bytes each.
///
/// Each row is a leading space, one ` xx` group per byte, two spaces, and
/// the printable ASCII rendering. A short final row pads both the hex and
/// the ASCII columns with spaces so every row has the same width.
pub fn hexdump_rows(bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(HEXDUMP_WIDTH)
        .map(|chunk| {
            let mut hex = String::with_capacity(1 + HEXDUMP_WIDTH * 3);
            let mut ascii = String::with_capacity(HEXDUMP_WIDTH);
            hex.push(' ');
            for idx in 0..HEXDUMP_WIDTH {
                match chunk.get(idx) {
                    Some(byte) => {
                        hex.push_str(&format!(" {byte:02x}"));
                        ascii.push(if (0x20..=0x7e).contains(byte) {
                            *byte as char
                        } else {
                            '.'
                        });
                    }
                    None => {
                        hex.push_str("   ");
                        ascii.push(' ');
                    }
                }
            }
            format!("{hex}  {ascii}")
        })
        .collect()
}

/// One aligned `help` row: name, argument hint, description.
pub fn help_row(name: &str, hint: &str, description: &str, column: usize, color: bool) -> String {
    let pad = column.saturating_sub(name.chars().count());
    let head = format!("{name} {hint:<pad$}");
    if color {
        format!("{} {description}", head.with(settings::COLOR_HIGHLIGHT))
    } else {
        format!("{head} {description}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_row_has_hex_then_ascii() {
        let rows = hexdump_rows(b"ABCDEFGHIJKLMNOP");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            "  41 42 43 44 45 46 47 48 49 4a 4b 4c 4d 4e 4f 50  ABCDEFGHIJKLMNOP"
        );
    }

    #[test]
    fn short_row_is_padded_with_spaces() {
        let rows = hexdump_rows(b"ABCDEFGHIJKLMNOPQ");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), rows[1].len());
        let expected = format!("  51{}  Q{}", " ".repeat(45), " ".repeat(15));
        assert_eq!(rows[1], expected);
    }

    #[test]
    fn non_printable_bytes_render_as_dots() {
        let rows = hexdump_rows(&[0x00, 0x7f, b'a']);
        assert!(rows[0].ends_with(&format!("  ..a{}", " ".repeat(13))));
    }

    #[test]
    fn empty_input_has_no_rows() {
        assert!(hexdump_rows(&[]).is_empty());
    }

    #[test]
    fn help_rows_align_descriptions() {
        let a = help_row("power", "<on/off>", "Set power", 20, false);
        let b = help_row("quit", "", "Quit program", 20, false);
        assert_eq!(a, format!("power <on/off>{} Set power", " ".repeat(7)));
        assert_eq!(a.find("Set"), b.find("Quit"));
    }
}
