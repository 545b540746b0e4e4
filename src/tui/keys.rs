//! Incremental terminal byte decoder.
//!
//! Bytes arrive from the attached input in arbitrary chunks, so escape
//! sequences and multi-byte UTF-8 characters may be split across reads.
//! Incomplete tails are buffered until the next `push`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const ESC: u8 = 0x1b;
const DEL: u8 = 0x7f;

/// Stateful byte → key decoder for one input source.
#[derive(Debug, Default)]
pub struct KeyDecoder {
    pending: Vec<u8>,
}

enum Step {
    Key(KeyEvent, usize),
    Skip(usize),
    Incomplete,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return every key that is now complete.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<KeyEvent> {
        self.pending.extend_from_slice(bytes);
        let mut keys = Vec::new();
        let mut offset = 0;
        while offset < self.pending.len() {
            match decode_one(&self.pending[offset..]) {
                Step::Key(key, used) => {
                    keys.push(key);
                    offset += used;
                }
                Step::Skip(used) => offset += used,
                Step::Incomplete => break,
            }
        }
        self.pending.drain(..offset);
        keys
    }

    /// Discard a buffered partial sequence.
    pub fn reset(&mut self) {
        self.pending.clear();
    }
}

fn decode_one(bytes: &[u8]) -> Step {
    let first = bytes[0];
    match first {
        b'\r' | b'\n' => Step::Key(plain(KeyCode::Enter), 1),
        b'\t' => Step::Key(plain(KeyCode::Tab), 1),
        DEL | 0x08 => Step::Key(plain(KeyCode::Backspace), 1),
        ESC => decode_escape(bytes),
        0x01..=0x1a => {
            let letter = (b'a' + first - 1) as char;
            Step::Key(
                KeyEvent::new(KeyCode::Char(letter), KeyModifiers::CONTROL),
                1,
            )
        }
        0x00 | 0x1c..=0x1f => Step::Skip(1),
        _ => decode_utf8(bytes),
    }
}

fn decode_escape(bytes: &[u8]) -> Step {
    let Some(&introducer) = bytes.get(1) else {
        return Step::Incomplete;
    };
    match introducer {
        b'[' => decode_csi(bytes),
        b'O' => match bytes.get(2) {
            None => Step::Incomplete,
            Some(&final_byte) => match cursor_key(final_byte) {
                Some(code) => Step::Key(plain(code), 3),
                None => Step::Skip(3),
            },
        },
        ESC => Step::Key(plain(KeyCode::Esc), 1),
        _ => match decode_one(&bytes[1..]) {
            Step::Key(key, used) => Step::Key(
                KeyEvent::new(key.code, key.modifiers | KeyModifiers::ALT),
                used + 1,
            ),
            Step::Skip(used) => Step::Skip(used + 1),
            Step::Incomplete => Step::Incomplete,
        },
    }
}

fn decode_csi(bytes: &[u8]) -> Step {
    // ESC [ params final, where final is in 0x40..=0x7e.
    let Some(end) = bytes[2..].iter().position(|b| (0x40..=0x7e).contains(b)) else {
        return Step::Incomplete;
    };
    let final_idx = end + 2;
    let used = final_idx + 1;
    let params = &bytes[2..final_idx];
    let code = match bytes[final_idx] {
        b'~' => match params {
            b"1" | b"7" => Some(KeyCode::Home),
            b"4" | b"8" => Some(KeyCode::End),
            b"3" => Some(KeyCode::Delete),
            _ => None,
        },
        other => cursor_key(other),
    };
    match code {
        Some(code) => Step::Key(plain(code), used),
        None => Step::Skip(used),
    }
}

fn cursor_key(final_byte: u8) -> Option<KeyCode> {
    match final_byte {
        b'A' => Some(KeyCode::Up),
        b'B' => Some(KeyCode::Down),
        b'C' => Some(KeyCode::Right),
        b'D' => Some(KeyCode::Left),
        b'H' => Some(KeyCode::Home),
        b'F' => Some(KeyCode::End),
        _ => None,
    }
}

fn decode_utf8(bytes: &[u8]) -> Step {
    let width = match bytes[0] {
        0x20..=0x7e => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Step::Skip(1),
    };
    if bytes.len() < width {
        return Step::Incomplete;
    }
    match std::str::from_utf8(&bytes[..width])
        .ok()
        .and_then(|s| s.chars().next())
    {
        Some(ch) => Step::Key(plain(KeyCode::Char(ch)), width),
        None => Step::Skip(1),
    }
}

fn plain(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(keys: &[KeyEvent]) -> Vec<KeyCode> {
        keys.iter().map(|k| k.code).collect()
    }

    #[test]
    fn printable_and_control_bytes() {
        let mut decoder = KeyDecoder::new();
        let keys = decoder.push(b"ab\t\r\x7f");
        assert_eq!(
            codes(&keys),
            vec![
                KeyCode::Char('a'),
                KeyCode::Char('b'),
                KeyCode::Tab,
                KeyCode::Enter,
                KeyCode::Backspace,
            ]
        );
    }

    #[test]
    fn ctrl_letters_carry_control_modifier() {
        let mut decoder = KeyDecoder::new();
        let keys = decoder.push(&[0x03, 0x04]);
        assert_eq!(keys[0].code, KeyCode::Char('c'));
        assert!(keys[0].modifiers.contains(KeyModifiers::CONTROL));
        assert_eq!(keys[1].code, KeyCode::Char('d'));
    }

    #[test]
    fn split_escape_sequence_is_buffered() {
        let mut decoder = KeyDecoder::new();
        assert!(decoder.push(b"\x1b[").is_empty());
        let keys = decoder.push(b"Ax");
        assert_eq!(codes(&keys), vec![KeyCode::Up, KeyCode::Char('x')]);
    }

    #[test]
    fn tilde_sequences_and_ss3() {
        let mut decoder = KeyDecoder::new();
        let keys = decoder.push(b"\x1b[3~\x1b[1~\x1bOF\x1b[99~");
        assert_eq!(
            codes(&keys),
            vec![KeyCode::Delete, KeyCode::Home, KeyCode::End]
        );
    }

    #[test]
    fn split_utf8_character_is_buffered() {
        let mut decoder = KeyDecoder::new();
        let bytes = "é".as_bytes();
        assert!(decoder.push(&bytes[..1]).is_empty());
        assert_eq!(codes(&decoder.push(&bytes[1..])), vec![KeyCode::Char('é')]);
    }

    #[test]
    fn escape_prefix_marks_alt() {
        let mut decoder = KeyDecoder::new();
        let keys = decoder.push(b"\x1bb");
        assert_eq!(keys[0].code, KeyCode::Char('b'));
        assert!(keys[0].modifiers.contains(KeyModifiers::ALT));
    }

    #[test]
    fn reset_drops_partial_sequence() {
        let mut decoder = KeyDecoder::new();
        decoder.push(b"\x1b[");
        decoder.reset();
        assert_eq!(codes(&decoder.push(b"A")), vec![KeyCode::Char('A')]);
    }

    #[cfg(feature = "fuzz-tests")]
    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn chunking_does_not_change_decoded_keys(
                bytes in proptest::collection::vec(any::<u8>(), 0..64),
                split in 0usize..64
            ) {
                let mut whole = KeyDecoder::new();
                let expected = whole.push(&bytes);

                let split = split.min(bytes.len());
                let mut chunked = KeyDecoder::new();
                let mut got = chunked.push(&bytes[..split]);
                got.extend(chunked.push(&bytes[split..]));

                prop_assert_eq!(got, expected);
            }
        }
    }
}
