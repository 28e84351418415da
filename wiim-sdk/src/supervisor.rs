//! Connection supervisor state machine
//!
//! ```text
//! Disconnected ──begin_connect──▶ Connecting ──connected──▶ Connected
//!      ▲                              │                         │
//!      └──────── connect_failed ──────┘    threshold unreachable │
//!                                 Connecting ◀──────────────────┘
//! ```
//!
//! The supervisor only tracks state. The engine worker performs the
//! connect attempts and polls it schedules.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection state surfaced to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        })
    }
}

/// A state change the host must hear about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ConnectionState,
    pub to: ConnectionState,
}

/// Exponential backoff: doubles per attempt, capped at `max`
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        let initial = initial.min(max);
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay before the next attempt; advances the backoff
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

#[derive(Debug)]
pub struct Supervisor {
    state: ConnectionState,
    consecutive_failures: u32,
    failure_threshold: u32,
    backoff: Backoff,
    epoch: u64,
}

impl Supervisor {
    pub fn new(failure_threshold: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            consecutive_failures: 0,
            failure_threshold: failure_threshold.max(1),
            backoff: Backoff::new(initial_backoff, max_backoff),
            epoch: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Epoch of the current (or last) connection; 0 before the first one
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Epoch the next successful connection will get
    pub fn next_epoch(&self) -> u64 {
        self.epoch + 1
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    fn move_to(&mut self, to: ConnectionState) -> Option<Transition> {
        if self.state == to {
            return None;
        }
        let transition = Transition {
            from: self.state,
            to,
        };
        tracing::info!("Connection {} -> {}", transition.from, transition.to);
        self.state = to;
        Some(transition)
    }

    /// A connect attempt is starting
    pub fn begin_connect(&mut self) -> Option<Transition> {
        self.move_to(ConnectionState::Connecting)
    }

    /// Discovery succeeded; a new epoch begins
    pub fn connected(&mut self) -> Option<Transition> {
        self.epoch += 1;
        self.consecutive_failures = 0;
        self.backoff.reset();
        self.move_to(ConnectionState::Connected)
    }

    /// The connect attempt failed; returns the delay before the next one
    pub fn connect_failed(&mut self) -> (Option<Transition>, Duration) {
        let delay = self.backoff.next_delay();
        tracing::info!("Reconnecting in {:?}", delay);
        (self.move_to(ConnectionState::Disconnected), delay)
    }

    /// The device answered a poll or command
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// A poll or command hit an unreachable device
    ///
    /// Returns the demotion and the reconnect delay once the threshold of
    /// consecutive failures is reached while connected.
    pub fn record_unreachable(&mut self) -> Option<(Transition, Duration)> {
        if self.state != ConnectionState::Connected {
            return None;
        }
        self.consecutive_failures += 1;
        tracing::debug!(
            "Unreachable {}/{}",
            self.consecutive_failures,
            self.failure_threshold
        );
        if self.consecutive_failures < self.failure_threshold {
            return None;
        }

        self.consecutive_failures = 0;
        let delay = self.backoff.next_delay();
        let transition = self.move_to(ConnectionState::Connecting)?;
        Some((transition, delay))
    }
}
