//! Signal Bridge: OS interrupt/termination signals as ordinary events.
//!
//! Signals are received by a reactor task and queued like any other input,
//! so the shell reacts to them between callbacks, never in signal context.

use crate::shell::reactor::{Reactor, Registration};
use std::io;

/// Signals the shell reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellSignal {
    Interrupt,
    Terminate,
}

/// What the shell should do about a delivered signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// Clear the edit line and show a fresh prompt.
    ClearLine,
    /// Clear the edit line and stop the loop.
    Terminate,
    /// Termination already happened.
    Ignore,
}

/// Latches termination so repeated deliveries shut down only once.
#[derive(Debug, Clone, Default)]
pub struct SignalLatch {
    terminated: bool,
}

impl SignalLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide the action for `signal`. An interrupt with no input attached
    /// cannot clear anything and is treated as termination.
    pub fn decide(&mut self, signal: ShellSignal, input_attached: bool) -> SignalAction {
        match signal {
            ShellSignal::Interrupt if input_attached => SignalAction::ClearLine,
            ShellSignal::Interrupt | ShellSignal::Terminate => {
                if self.terminated {
                    SignalAction::Ignore
                } else {
                    self.terminated = true;
                    SignalAction::Terminate
                }
            }
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

/// Installed signal listener. Dropping it uninstalls the listener.
#[derive(Debug)]
pub struct SignalBridge {
    registration: Registration,
}

impl SignalBridge {
    /// Listen for SIGINT and SIGTERM on `reactor`.
    ///
    /// Fails when the OS listeners cannot be created; nothing stays
    /// registered in that case.
    #[cfg(unix)]
    pub fn install(reactor: &mut Reactor) -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut interrupt, mut terminate) = {
            let _runtime = reactor.enter();
            (
                signal(SignalKind::interrupt())?,
                signal(SignalKind::terminate())?,
            )
        };

        let registration = reactor.register(move |events| async move {
            loop {
                let received = tokio::select! {
                    got = interrupt.recv() => got.map(|_| ShellSignal::Interrupt),
                    got = terminate.recv() => got.map(|_| ShellSignal::Terminate),
                };
                match received {
                    Some(signal) => {
                        if !events.signal(signal) {
                            return;
                        }
                    }
                    None => break,
                }
            }
            events.hangup();
        });
        tracing::debug!("signal bridge installed");
        Ok(Self { registration })
    }

    /// Listen for Ctrl-C, the only signal available off unix.
    #[cfg(not(unix))]
    pub fn install(reactor: &mut Reactor) -> io::Result<Self> {
        let registration = reactor.register(|events| async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !events.signal(ShellSignal::Interrupt) {
                    return;
                }
            }
            events.hangup();
        });
        Ok(Self { registration })
    }

    pub fn source(&self) -> crate::shell::reactor::SourceId {
        self.registration.source()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn termination_is_latched() {
        let mut latch = SignalLatch::new();
        assert_eq!(
            latch.decide(ShellSignal::Terminate, true),
            SignalAction::Terminate
        );
        assert_eq!(latch.decide(ShellSignal::Terminate, true), SignalAction::Ignore);
        assert!(latch.is_terminated());
    }

    #[test]
    fn interrupt_clears_line_when_attached() {
        let mut latch = SignalLatch::new();
        assert_eq!(
            latch.decide(ShellSignal::Interrupt, true),
            SignalAction::ClearLine
        );
        assert_eq!(
            latch.decide(ShellSignal::Interrupt, true),
            SignalAction::ClearLine
        );
        assert!(!latch.is_terminated());
    }

    #[test]
    fn interrupt_without_input_terminates() {
        let mut latch = SignalLatch::new();
        assert_eq!(
            latch.decide(ShellSignal::Interrupt, false),
            SignalAction::Terminate
        );
        assert_eq!(latch.decide(ShellSignal::Terminate, false), SignalAction::Ignore);
    }

    #[cfg(unix)]
    #[test]
    fn bridge_registers_a_source() {
        let mut reactor = Reactor::new().unwrap();
        let bridge = SignalBridge::install(&mut reactor).unwrap();
        let sender = reactor.sender();
        assert_ne!(bridge.source(), sender.source());
    }
}
