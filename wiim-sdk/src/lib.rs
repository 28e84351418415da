//! WiiM SDK
//!
//! A sync-first bridge between a WiiM/LinkPlay streamer and a remote-control
//! host. One [`WiimEngine`] binds one device: it discovers what the device
//! can do, polls its state, pushes minimal attribute changes, and turns
//! abstract host commands into ordered device calls.
//!
//! # Architecture
//!
//! ```text
//!                  ┌──────────────── worker thread ────────────────┐
//! host commands ──▶│ Translator ─▶ WiimClient ◀─ Poller ─▶ Reconciler│──▶ EngineEvent
//!                  │        ▲                      ▲                 │
//!                  │   CapabilitySet ◀── Discovery ◀── Supervisor    │
//!                  └────────────────────────────────────────────────┘
//! ```
//!
//! Everything against one device runs on that device's worker thread, one
//! action at a time. Host threads only enqueue commands and read shared
//! snapshots.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use wiim_sdk::{simple_commands, AbstractCommand, EngineConfig, EngineEvent, WiimEngine};
//!
//! wiim_sdk::logging::init_logging_from_env()?;
//!
//! let engine = WiimEngine::start(EngineConfig::new("192.168.1.40"))?;
//! let events = engine.events();
//! events.wait_for(std::time::Duration::from_secs(10), |e| {
//!     matches!(e, EngineEvent::ConnectionChanged { to: wiim_sdk::ConnectionState::Connected, .. })
//! });
//!
//! while let Some(event) = events.recv() {
//!     match event {
//!         EngineEvent::CapabilitiesChanged(caps) => {
//!             println!("buttons: {:?}", simple_commands(&caps));
//!         }
//!         EngineEvent::AttributesChanged(changes) => println!("{:?}", changes),
//!         _ => {}
//!     }
//! }
//!
//! let command: AbstractCommand = "preset_1".parse()?;
//! println!("{}", engine.execute(command));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod command;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod events;
pub mod logging;
pub mod poller;
pub mod supervisor;
pub mod translator;

pub use command::{
    simple_commands, AbstractCommand, CommandOutcome, CommandState, PendingCommand, VOLUME_STEP,
};
pub use config::{config_dir, EngineConfig, FeatureToggles, StoredConfig, MAX_DURATION};
pub use discovery::{discover, output_modes};
pub use engine::{CommandTicket, WiimEngine};
pub use error::{CommandError, DiscoveryError, Result, SdkError};
pub use events::{EngineEvent, EventIterator};
pub use poller::{PollOutcome, StatePoller};
pub use supervisor::{Backoff, ConnectionState, Supervisor, Transition};
pub use translator::{execute_plan, translate, Adjustment, CommandPlan, PlanStep};

pub use wiim_api::{ApiError, DeviceCommand, Scheme, Transport};
pub use wiim_state::{
    Attribute, AttributeChange, CapabilitySet, DeviceIdentity, DeviceSnapshot, NowPlaying,
    OutputMode, PlaybackState, PresetEntry, RepeatMode, ServiceCatalog, ServiceLabel,
    SourceCategory, SourceEntry,
};
