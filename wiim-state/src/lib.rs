//! WiiM State Model
//!
//! Typed state for one WiiM/LinkPlay device and the pure functions that
//! produce it from raw device responses.
//!
//! # Architecture
//!
//! ```text
//! raw responses → normalize() → DeviceSnapshot → reconcile() → Vec<AttributeChange>
//!                                   (previous) ──────┘
//! getStatusEx + presets + EQ → sources / services → CapabilitySet
//! ```
//!
//! Nothing in this crate performs I/O. The engine in `wiim-sdk` owns the
//! connection and calls into these functions once per poll tick.
//!
//! # Example
//!
//! ```rust
//! use wiim_state::{normalize, reconcile, NormalizeOptions, RawReading};
//!
//! let first = normalize(None, &RawReading::default(), NormalizeOptions::default());
//! let changes = reconcile(None, &first.snapshot);
//! assert_eq!(changes.len(), 13);
//!
//! let second = normalize(Some(&first.snapshot), &RawReading::default(), NormalizeOptions::default());
//! assert!(reconcile(Some(&first.snapshot), &second.snapshot).is_empty());
//! ```

pub mod model;
pub mod normalize;
pub mod reconciler;
pub mod services;
pub mod sources;

pub use model::{
    Attribute, AttributeChange, CapabilitySet, DegradedField, DeviceIdentity, DeviceSnapshot,
    LoopMode, NowPlaying, OutputMode, PlaybackState, PresetEntry, RepeatMode, ServiceLabel,
    SourceCategory, SourceEntry,
};
pub use normalize::{normalize, NormalizeOptions, Normalized, RawReading};
pub use reconciler::reconcile;
pub use services::{service_key, ServiceCatalog};
pub use sources::{identity_for_device, source_for_mode, source_label, sources_for_device};
