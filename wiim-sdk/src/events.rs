//! Host-facing events and a blocking iterator over them
//!
//! Provides the same iteration patterns for every consumer:
//! - Blocking: `recv()`, `for event in engine.events()`
//! - Non-blocking: `try_recv()`, `try_iter()`
//! - Timeout: `recv_timeout()`, `timeout_iter()`

use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

use wiim_state::{Attribute, AttributeChange, CapabilitySet};

use crate::command::{AbstractCommand, CommandOutcome};
use crate::supervisor::ConnectionState;

/// Something the host should react to
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Sent on every supervisor transition, in order
    ConnectionChanged {
        from: ConnectionState,
        to: ConnectionState,
    },
    /// A new epoch's capability set; the previous one is void
    CapabilitiesChanged(Arc<CapabilitySet>),
    /// Changed attributes in priority order; never empty
    AttributesChanged(Vec<AttributeChange>),
    /// A field could not be read this tick and kept its previous value
    DegradedData { attribute: Attribute, reason: String },
    CommandCompleted {
        id: u64,
        command: AbstractCommand,
        outcome: CommandOutcome,
    },
}

/// Blocking iterator over engine events
///
/// All clones share one queue: each event is delivered to exactly one of
/// them.
///
/// # Example
///
/// ```rust,ignore
/// for event in engine.events() {
///     match event {
///         EngineEvent::AttributesChanged(changes) => push_to_host(changes),
///         EngineEvent::ConnectionChanged { to, .. } => set_online(to == ConnectionState::Connected),
///         _ => {}
///     }
/// }
/// ```
#[derive(Clone)]
pub struct EventIterator {
    rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EventIterator {
    pub(crate) fn new(rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>) -> Self {
        Self { rx }
    }

    /// Block until the next event is available
    ///
    /// Returns `None` once the engine has stopped and the queue is drained.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.rx.lock().ok()?.recv().ok()
    }

    /// Block until the next event or timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.rx.lock().ok()?.try_recv().ok()
    }

    /// Wait up to `timeout` for an event matching `pred`
    ///
    /// Events that do not match are consumed and dropped. Handy for
    /// start-up code that only needs to know when the device is online.
    pub fn wait_for<F>(&self, timeout: Duration, mut pred: F) -> Option<EngineEvent>
    where
        F: FnMut(&EngineEvent) -> bool,
    {
        let deadline = Instant::now().checked_add(timeout)?;
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            let event = self.recv_timeout(remaining)?;
            if pred(&event) {
                return Some(event);
            }
        }
    }

    /// Queued events, without blocking
    pub fn try_iter(&self) -> impl Iterator<Item = EngineEvent> + '_ {
        std::iter::from_fn(move || self.try_recv())
    }

    /// Events until one takes longer than `timeout` to arrive
    pub fn timeout_iter(&self, timeout: Duration) -> impl Iterator<Item = EngineEvent> + '_ {
        std::iter::from_fn(move || self.recv_timeout(timeout))
    }
}

impl Iterator for EventIterator {
    type Item = EngineEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}
