//! State poller
//!
//! One poll tick reads player status and metadata (plus the active output
//! when tracked), normalizes them into a [`DeviceSnapshot`] and diffs it
//! against the previous one. The poller is the single owner of that
//! previous snapshot.

use wiim_api::{ApiError, Transport, WiimClient};
use wiim_state::{
    normalize, reconcile, Attribute, AttributeChange, CapabilitySet, DegradedField,
    DeviceSnapshot, NormalizeOptions, RawReading,
};

use crate::config::FeatureToggles;

/// Result of one poll tick
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The device answered; `changes` may be empty
    Snapshot {
        snapshot: DeviceSnapshot,
        changes: Vec<AttributeChange>,
        degraded: Vec<DegradedField>,
    },
    /// The device could not be reached; nothing is emitted
    Unreachable(ApiError),
}

#[derive(Debug)]
pub struct StatePoller {
    options: NormalizeOptions,
    track_output: bool,
    previous: Option<DeviceSnapshot>,
}

impl StatePoller {
    pub fn new(features: &FeatureToggles) -> Self {
        Self {
            options: NormalizeOptions {
                clear_metadata_on_stop: features.clear_metadata_on_stop,
            },
            track_output: features.track_audio_output,
            previous: None,
        }
    }

    /// Forget the previous snapshot so the next tick reports every attribute
    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn previous(&self) -> Option<&DeviceSnapshot> {
        self.previous.as_ref()
    }

    /// Run one tick
    pub fn poll<T: Transport>(
        &mut self,
        client: &WiimClient<T>,
        capabilities: &CapabilitySet,
    ) -> PollOutcome {
        let mut degraded = Vec::new();
        let mut reading = RawReading::default();

        reading.status = match read(client.player_status(), Attribute::PlaybackStatus, &mut degraded) {
            Ok(status) => status,
            Err(e) => return PollOutcome::Unreachable(e),
        };

        reading.meta = match read(client.meta_info(), Attribute::Title, &mut degraded) {
            Ok(meta) => meta,
            Err(e) => return PollOutcome::Unreachable(e),
        };

        if self.track_output && capabilities.supports_output_switching() {
            reading.output = match read(client.audio_output_mode(), Attribute::AudioOutput, &mut degraded) {
                Ok(output) => output,
                Err(e) => return PollOutcome::Unreachable(e),
            };
        }

        let normalized = normalize(self.previous.as_ref(), &reading, self.options);
        degraded.extend(normalized.degraded);

        let changes = reconcile(self.previous.as_ref(), &normalized.snapshot);
        for field in &degraded {
            tracing::warn!("Degraded {}: {}", field.attribute.as_str(), field.reason);
        }

        self.previous = Some(normalized.snapshot.clone());

        PollOutcome::Snapshot {
            snapshot: normalized.snapshot,
            changes,
            degraded,
        }
    }
}

/// Split a read into "unreachable" and "usable or degraded"
///
/// A malformed or rejected response is recorded against `attribute` and
/// yields `None`, so normalization keeps the previous values.
fn read<R>(
    result: Result<R, ApiError>,
    attribute: Attribute,
    degraded: &mut Vec<DegradedField>,
) -> Result<Option<R>, ApiError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_unreachable() => Err(e),
        Err(e) => {
            degraded.push(DegradedField {
                attribute,
                reason: e.to_string(),
            });
            Ok(None)
        }
    }
}
