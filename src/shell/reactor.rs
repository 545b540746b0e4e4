//! Single-threaded event loop.
//!
//! Notification sources run as tasks on a current-thread tokio runtime and
//! push [`ReactorEvent`]s into one channel. The shell pops events one at a
//! time and runs each to completion, so no two callbacks ever overlap.

use crate::shell::signal::ShellSignal;
use std::cell::Cell;
use std::future::Future;
use std::io;
use std::rc::Rc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::runtime::{Builder, EnterGuard, Handle, Runtime};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const READ_CHUNK: usize = 1024;

/// Identifies one registered notification source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u64);

/// Something a notification source reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactorEvent {
    Readable { source: SourceId, bytes: Vec<u8> },
    Hangup { source: SourceId },
    Signal { source: SourceId, signal: ShellSignal },
}

impl ReactorEvent {
    pub fn source(&self) -> SourceId {
        match self {
            Self::Readable { source, .. }
            | Self::Hangup { source }
            | Self::Signal { source, .. } => *source,
        }
    }
}

/// Sending half handed to a source task.
#[derive(Debug, Clone)]
pub struct EventSender {
    source: SourceId,
    tx: mpsc::UnboundedSender<ReactorEvent>,
}

impl EventSender {
    pub fn source(&self) -> SourceId {
        self.source
    }

    /// Returns `false` once the reactor is gone.
    pub fn readable(&self, bytes: Vec<u8>) -> bool {
        self.send(ReactorEvent::Readable {
            source: self.source,
            bytes,
        })
    }

    pub fn hangup(&self) -> bool {
        self.send(ReactorEvent::Hangup {
            source: self.source,
        })
    }

    pub fn signal(&self, signal: ShellSignal) -> bool {
        self.send(ReactorEvent::Signal {
            source: self.source,
            signal,
        })
    }

    fn send(&self, event: ReactorEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Live registration of a source. Dropping it stops the source task.
#[derive(Debug)]
pub struct Registration {
    source: SourceId,
    task: JoinHandle<()>,
    live: Rc<Cell<usize>>,
}

impl Registration {
    pub fn source(&self) -> SourceId {
        self.source
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.task.abort();
        self.live.set(self.live.get().saturating_sub(1));
    }
}

/// Owns the runtime and the event queue.
pub struct Reactor {
    runtime: Option<Runtime>,
    handle: Handle,
    tx: mpsc::UnboundedSender<ReactorEvent>,
    rx: mpsc::UnboundedReceiver<ReactorEvent>,
    next_source: u64,
    live: Rc<Cell<usize>>,
    stop: bool,
}

impl Reactor {
    pub fn new() -> io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let handle = runtime.handle().clone();
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            runtime: Some(runtime),
            handle,
            tx,
            rx,
            next_source: 1,
            live: Rc::new(Cell::new(0)),
            stop: false,
        })
    }

    /// Enter the runtime context, e.g. to create OS signal listeners.
    pub fn enter(&self) -> EnterGuard<'_> {
        self.handle.enter()
    }

    /// Register a source. `make` gets the sender for the new source and
    /// returns the task that feeds it.
    pub fn register<M, F>(&mut self, make: M) -> Registration
    where
        M: FnOnce(EventSender) -> F,
        F: Future<Output = ()> + Send + 'static,
    {
        let source = SourceId(self.next_source);
        self.next_source += 1;
        let sender = EventSender {
            source,
            tx: self.tx.clone(),
        };
        let task = self.handle.spawn(make(sender));
        self.live.set(self.live.get() + 1);
        tracing::debug!(source = source.0, "registered notification source");
        Registration {
            source,
            task,
            live: Rc::clone(&self.live),
        }
    }

    /// Register a byte stream. Reads become `Readable`; end of stream or a
    /// read error becomes `Hangup`.
    pub fn register_reader<R>(&mut self, mut reader: R) -> Registration
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        self.register(move |events| async move {
            let mut buf = vec![0u8; READ_CHUNK];
            loop {
                match reader.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => {
                        if !events.readable(buf[..n].to_vec()) {
                            return;
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        tracing::debug!(error = %e, "input read failed");
                        break;
                    }
                }
            }
            events.hangup();
        })
    }

    /// Sender for events produced outside any registered task.
    pub fn sender(&mut self) -> EventSender {
        let source = SourceId(self.next_source);
        self.next_source += 1;
        EventSender {
            source,
            tx: self.tx.clone(),
        }
    }

    /// Wait for the next event.
    ///
    /// Returns `None` when the runtime is gone, or when nothing is queued
    /// and no registered source is left that could produce an event.
    pub fn next_event(&mut self) -> Option<ReactorEvent> {
        if let Some(event) = self.try_next_event() {
            return Some(event);
        }
        if self.live.get() == 0 {
            return None;
        }
        let runtime = self.runtime.as_ref()?;
        runtime.block_on(self.rx.recv())
    }

    /// Pop an already queued event without waiting.
    pub fn try_next_event(&mut self) -> Option<ReactorEvent> {
        self.rx.try_recv().ok()
    }

    /// Ask the loop to stop after the current event.
    pub fn request_stop(&mut self) {
        self.stop = true;
    }

    pub fn is_stopping(&self) -> bool {
        self.stop
    }
}

impl Drop for Reactor {
    fn drop(&mut self) {
        // A blocking stdin read cannot be cancelled; don't wait for it.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_bytes_then_hangup() {
        let mut reactor = Reactor::new().unwrap();
        let registration = reactor.register_reader(&b"abc"[..]);
        let source = registration.source();

        let mut bytes = Vec::new();
        loop {
            match reactor.next_event().unwrap() {
                ReactorEvent::Readable { source: from, bytes: chunk } => {
                    assert_eq!(from, source);
                    bytes.extend(chunk);
                }
                ReactorEvent::Hangup { source: from } => {
                    assert_eq!(from, source);
                    break;
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(bytes, b"abc");
    }

    #[test]
    fn no_sources_means_no_events() {
        let mut reactor = Reactor::new().unwrap();
        assert!(reactor.next_event().is_none());
    }

    #[test]
    fn dropping_registration_releases_the_source() {
        let mut reactor = Reactor::new().unwrap();
        let registration = reactor.register(|_events| std::future::pending::<()>());
        drop(registration);
        assert!(reactor.next_event().is_none());
    }

    #[test]
    fn sender_events_are_queued_in_order() {
        let mut reactor = Reactor::new().unwrap();
        let sender = reactor.sender();
        assert!(sender.signal(ShellSignal::Interrupt));
        assert!(sender.hangup());
        assert_eq!(
            reactor.next_event(),
            Some(ReactorEvent::Signal {
                source: sender.source(),
                signal: ShellSignal::Interrupt
            })
        );
        assert_eq!(
            reactor.next_event(),
            Some(ReactorEvent::Hangup {
                source: sender.source()
            })
        );
        assert!(reactor.next_event().is_none());
    }

    #[test]
    fn stop_flag_latches() {
        let mut reactor = Reactor::new().unwrap();
        assert!(!reactor.is_stopping());
        reactor.request_stop();
        assert!(reactor.is_stopping());
    }
}
