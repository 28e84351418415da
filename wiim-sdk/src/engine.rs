//! The per-device engine
//!
//! [`WiimEngine`] is a sync handle over one background worker thread. The
//! worker owns the device client, the supervisor, the capability set and
//! the previous snapshot, and runs connect attempts, poll ticks and host
//! commands strictly one at a time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use wiim_api::{HttpClient, Transport, WiimClient};
use wiim_state::{CapabilitySet, DeviceSnapshot, ServiceCatalog};

use crate::command::{AbstractCommand, CommandOutcome, PendingCommand};
use crate::config::{EngineConfig, MAX_DURATION};
use crate::discovery::discover;
use crate::error::{CommandError, Result, SdkError};
use crate::events::{EngineEvent, EventIterator};
use crate::poller::{PollOutcome, StatePoller};
use crate::supervisor::{ConnectionState, Supervisor, Transition};
use crate::translator::{execute_plan, translate};

/// Messages from the handle to the worker
enum Message {
    Command {
        pending: PendingCommand,
        reply: mpsc::Sender<CommandOutcome>,
    },
    Shutdown,
}

/// State the handle can read without talking to the worker
#[derive(Default)]
struct Shared {
    connection: RwLock<ConnectionState>,
    capabilities: RwLock<Option<Arc<CapabilitySet>>>,
    snapshot: RwLock<Option<DeviceSnapshot>>,
}

/// Handle to a command submitted with [`WiimEngine::submit`]
#[derive(Debug)]
pub struct CommandTicket {
    id: u64,
    rx: mpsc::Receiver<CommandOutcome>,
}

impl CommandTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Block until the command is resolved
    pub fn wait(self) -> CommandOutcome {
        self.rx
            .recv()
            .unwrap_or(CommandOutcome::Failed(CommandError::EngineStopped))
    }

    /// Block up to `timeout`; `None` if the command is still queued or running
    pub fn wait_timeout(&self, timeout: Duration) -> Option<CommandOutcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Some(CommandOutcome::Failed(CommandError::EngineStopped))
            }
        }
    }
}

/// Bridge engine for one device
///
/// # Example
///
/// ```rust,no_run
/// use wiim_sdk::{AbstractCommand, EngineConfig, EngineEvent, WiimEngine};
///
/// let engine = WiimEngine::start(EngineConfig::new("192.168.1.40"))?;
///
/// let outcome = engine.execute(AbstractCommand::SetVolume(25));
/// println!("volume: {}", outcome);
///
/// for event in engine.events() {
///     if let EngineEvent::AttributesChanged(changes) = event {
///         println!("{:?}", changes);
///     }
/// }
/// # Ok::<(), wiim_sdk::SdkError>(())
/// ```
pub struct WiimEngine {
    config: EngineConfig,
    command_tx: mpsc::Sender<Message>,
    shared: Arc<Shared>,
    events: EventIterator,
    next_id: AtomicU64,
    worker: Option<JoinHandle<()>>,
}

impl WiimEngine {
    /// Start an engine talking HTTP(S) to `config.host`
    pub fn start(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpClient::new(config.http_config()).map_err(wiim_api::ApiError::from)?;
        Self::with_transport(config, transport)
    }

    /// Start an engine over a custom transport
    pub fn with_transport<T: Transport + 'static>(config: EngineConfig, transport: T) -> Result<Self> {
        Self::with_catalog(config, transport, ServiceCatalog::builtin())
    }

    /// Start an engine over a custom transport with an extended service table
    pub fn with_catalog<T: Transport + 'static>(
        config: EngineConfig,
        transport: T,
        catalog: ServiceCatalog,
    ) -> Result<Self> {
        config.validate()?;

        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let shared = Arc::new(Shared::default());

        let worker = Worker {
            client: WiimClient::with_transport(transport),
            catalog,
            supervisor: Supervisor::new(
                config.failure_threshold,
                config.reconnect_initial_backoff,
                config.reconnect_max_backoff,
            ),
            poller: StatePoller::new(&config.features),
            capabilities: None,
            config: config.clone(),
            shared: Arc::clone(&shared),
            events: event_tx,
        };

        let handle = thread::Builder::new()
            .name(format!("wiim-engine-{}", config.host.trim()))
            .spawn(move || worker.run(command_rx))?;

        Ok(Self {
            config,
            command_tx,
            shared,
            events: EventIterator::new(Arc::new(Mutex::new(event_rx))),
            next_id: AtomicU64::new(1),
            worker: Some(handle),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Queue a command without blocking
    pub fn submit(&self, command: AbstractCommand) -> CommandTicket {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply, rx) = mpsc::channel();

        let message = Message::Command {
            pending: PendingCommand::new(id, command),
            reply,
        };
        if let Err(mpsc::SendError(Message::Command { reply, .. })) = self.command_tx.send(message) {
            let _ = reply.send(CommandOutcome::Failed(CommandError::EngineStopped));
        }

        CommandTicket { id, rx }
    }

    /// Queue a command and wait for its outcome
    ///
    /// Waits for the queue bound (`command_timeout`) plus the time the
    /// command's own device calls may take.
    pub fn execute(&self, command: AbstractCommand) -> CommandOutcome {
        let bound = self
            .config
            .command_timeout
            .saturating_add(self.config.request_timeout.saturating_mul(3));
        self.submit(command)
            .wait_timeout(bound)
            .unwrap_or(CommandOutcome::Failed(CommandError::Expired))
    }

    /// Events pushed by the worker
    pub fn events(&self) -> EventIterator {
        self.events.clone()
    }

    /// Capability set of the current epoch; `None` while not connected
    pub fn capabilities(&self) -> Option<Arc<CapabilitySet>> {
        self.shared.capabilities.read().clone()
    }

    /// Last normalized snapshot
    pub fn snapshot(&self) -> Option<DeviceSnapshot> {
        self.shared.snapshot.read().clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.shared.connection.read()
    }

    /// Stop the worker and wait for it to exit
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.worker.take() else {
            return Ok(());
        };
        let _ = self.command_tx.send(Message::Shutdown);
        handle.join().map_err(|_| SdkError::EngineStopped)
    }
}

impl Drop for WiimEngine {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!("Engine worker did not shut down cleanly: {}", e);
        }
    }
}

/// Deadline `delay` from now, clamped when the clock cannot represent it
fn after(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay)
        .or_else(|| now.checked_add(MAX_DURATION))
        .unwrap_or(now)
}

/// What the worker does when its timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scheduled {
    Connect,
    Poll,
}

struct Worker<T: Transport> {
    client: WiimClient<T>,
    catalog: ServiceCatalog,
    supervisor: Supervisor,
    poller: StatePoller,
    capabilities: Option<Arc<CapabilitySet>>,
    config: EngineConfig,
    shared: Arc<Shared>,
    events: mpsc::Sender<EngineEvent>,
}

impl<T: Transport> Worker<T> {
    fn run(mut self, commands: mpsc::Receiver<Message>) {
        tracing::info!("Engine worker started for {}", self.config.host);

        let mut next = (Scheduled::Connect, Instant::now());

        loop {
            let now = Instant::now();
            if now >= next.1 {
                next = match next.0 {
                    Scheduled::Connect => self.connect(),
                    Scheduled::Poll => self.poll(),
                };
                continue;
            }

            match commands.recv_timeout(next.1 - now) {
                Ok(Message::Command { mut pending, reply }) => {
                    let (outcome, reconnect_in) = self.handle_command(&pending);
                    if let Some(delay) = reconnect_in {
                        next = (Scheduled::Connect, after(delay));
                    } else if outcome.changed_device() && next.0 == Scheduled::Poll {
                        next.1 = next.1.min(after(self.config.command_settle_delay));
                    }

                    pending.resolve(outcome.clone());
                    self.emit(EngineEvent::CommandCompleted {
                        id: pending.id,
                        command: pending.command.clone(),
                        outcome: outcome.clone(),
                    });
                    let _ = reply.send(outcome);
                }
                Ok(Message::Shutdown) => {
                    tracing::info!("Engine worker received shutdown command");
                    break;
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    tracing::debug!("Engine handle dropped, shutting down worker");
                    break;
                }
            }
        }

        tracing::info!("Engine worker for {} shut down", self.config.host);
    }

    fn emit(&self, event: EngineEvent) {
        // A host that stopped listening does not stop the engine
        let _ = self.events.send(event);
    }

    fn transition(&self, transition: Option<Transition>) {
        if let Some(Transition { from, to }) = transition {
            *self.shared.connection.write() = to;
            self.emit(EngineEvent::ConnectionChanged { from, to });
        }
    }

    /// One connect attempt: discovery, then either Connected or a backoff
    fn connect(&mut self) -> (Scheduled, Instant) {
        let transition = self.supervisor.begin_connect();
        self.transition(transition);

        let epoch = self.supervisor.next_epoch();
        match discover(&self.client, self.config.host.trim(), epoch, &self.catalog) {
            Ok(capabilities) => {
                let capabilities = Arc::new(capabilities);
                self.capabilities = Some(Arc::clone(&capabilities));
                self.poller.reset();
                *self.shared.snapshot.write() = None;
                *self.shared.capabilities.write() = Some(Arc::clone(&capabilities));
                self.emit(EngineEvent::CapabilitiesChanged(capabilities));

                let transition = self.supervisor.connected();
                self.transition(transition);
                (Scheduled::Poll, Instant::now())
            }
            Err(e) => {
                tracing::warn!("Connect attempt failed: {}", e);
                let (transition, delay) = self.supervisor.connect_failed();
                self.transition(transition);
                (Scheduled::Connect, after(delay))
            }
        }
    }

    fn poll(&mut self) -> (Scheduled, Instant) {
        let Some(capabilities) = self.capabilities.clone() else {
            return (Scheduled::Connect, Instant::now());
        };

        match self.poller.poll(&self.client, &capabilities) {
            PollOutcome::Snapshot {
                snapshot,
                changes,
                degraded,
            } => {
                self.supervisor.record_success();
                *self.shared.snapshot.write() = Some(snapshot);

                for field in degraded {
                    self.emit(EngineEvent::DegradedData {
                        attribute: field.attribute,
                        reason: field.reason,
                    });
                }
                if !changes.is_empty() {
                    tracing::debug!("{} attribute(s) changed", changes.len());
                    self.emit(EngineEvent::AttributesChanged(changes));
                }
                (Scheduled::Poll, after(self.config.poll_interval))
            }
            PollOutcome::Unreachable(e) => {
                tracing::debug!("Poll failed: {}", e);
                match self.demote_if_needed() {
                    Some(delay) => (Scheduled::Connect, after(delay)),
                    None => (Scheduled::Poll, after(self.config.poll_interval)),
                }
            }
        }
    }

    /// Count an unreachable result; on demotion drop the epoch's state and
    /// return the reconnect delay
    fn demote_if_needed(&mut self) -> Option<Duration> {
        let (transition, delay) = self.supervisor.record_unreachable()?;
        self.capabilities = None;
        *self.shared.capabilities.write() = None;
        self.transition(Some(transition));
        Some(delay)
    }

    /// Run one command; the second value is the reconnect delay when the
    /// command's failure demoted the connection
    fn handle_command(&mut self, pending: &PendingCommand) -> (CommandOutcome, Option<Duration>) {
        let capabilities = match (&self.capabilities, self.supervisor.is_connected()) {
            (Some(capabilities), true) => Arc::clone(capabilities),
            _ => return (CommandOutcome::Failed(CommandError::NotConnected), None),
        };

        if pending.is_expired(self.config.command_timeout, Instant::now()) {
            tracing::warn!("Command {} ({}) expired in queue", pending.id, pending.command);
            return (CommandOutcome::Failed(CommandError::Expired), None);
        }

        let plan = match translate(&pending.command, &capabilities, &self.config.features) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::warn!("Rejected {}: {}", pending.command, e);
                return (CommandOutcome::Failed(e), None);
            }
        };

        tracing::debug!("Executing {} as {} step(s)", pending.command, plan.len());
        let outcome = execute_plan(&self.client, &plan);

        let reconnect_in = match outcome.error() {
            Some(error) if error.is_unreachable() => self.demote_if_needed(),
            Some(_) => None,
            None => {
                self.supervisor.record_success();
                None
            }
        };

        (outcome, reconnect_in)
    }
}
