//! The one-slot prompt override.
//!
//! While a request is outstanding the next completed line belongs to the
//! requester instead of the dispatcher. The callback owns whatever context
//! it captured, so there is no separate user-data slot to clear.

use crate::shell::Shell;
use std::fmt;

/// Receives the answer to an input request.
pub type InputCallback = Box<dyn FnOnce(&mut Shell, &str)>;

/// Idle, or waiting for one answer.
#[derive(Default)]
pub enum InputOverride {
    #[default]
    Idle,
    Prompting { callback: InputCallback },
}

impl InputOverride {
    /// Store `callback` if idle. Returns `false` and drops the new callback
    /// when a request is already outstanding.
    pub fn begin(&mut self, callback: InputCallback) -> bool {
        if self.is_active() {
            return false;
        }
        *self = Self::Prompting { callback };
        true
    }

    /// Return to idle, handing back the pending callback if there was one.
    pub fn take(&mut self) -> Option<InputCallback> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Prompting { callback } => Some(callback),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Prompting { .. })
    }
}

impl fmt::Debug for InputOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::Prompting { .. } => f.write_str("Prompting"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_request_is_rejected_while_prompting() {
        let mut state = InputOverride::default();
        assert!(state.begin(Box::new(|_, _| {})));
        assert!(!state.begin(Box::new(|_, _| panic!("must not be stored"))));
        assert!(state.is_active());
    }

    #[test]
    fn take_returns_to_idle() {
        let mut state = InputOverride::default();
        assert!(state.take().is_none());
        state.begin(Box::new(|_, _| {}));
        assert!(state.take().is_some());
        assert!(!state.is_active());
        assert!(state.take().is_none());
    }
}
