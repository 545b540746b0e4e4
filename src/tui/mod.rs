//! Terminal line surface.
//!
//! Byte decoding, history, and the single-line editor are kept apart so the
//! shell core can drive the editor one key at a time from reactor events and
//! tests can run it against an in-memory sink.

pub mod editor;
pub mod history;
pub mod keys;
pub mod settings;
pub mod terminal;

pub use editor::{CompletionMatches, CompletionRequest, DisplayHook, EditorEvent, LineEditor};
pub use history::History;
pub use keys::KeyDecoder;
pub use terminal::RawModeGuard;
