//! Host-facing commands and their outcomes

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use wiim_state::{service_key, CapabilitySet, RepeatMode};

use crate::error::CommandError;
use crate::translator::PlanStep;

/// Volume change applied by `volume_up` / `volume_down`
pub const VOLUME_STEP: i32 = 5;

/// What the host asks the device to do, independent of the device API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbstractCommand {
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Previous,
    /// Absolute volume; out-of-range values are clamped to 0..=100
    SetVolume(i64),
    /// Relative volume change, read-modify-write
    AdjustVolume(i32),
    SetMute(bool),
    ToggleMute,
    SetRepeat(RepeatMode),
    /// off, all, one, off
    CycleRepeat,
    SetShuffle(bool),
    ToggleShuffle,
    /// Source id from the capability set, e.g. `line-in`
    SelectSource(String),
    /// Preset slot 1..=12
    ActivatePreset(u8),
    /// Service label; resolves to the lowest preset slot implying it
    SelectService(String),
    /// Switch audio output, optionally switching input first
    SwitchOutput { output: u8, source: Option<String> },
    EqOn,
    EqOff,
    /// EQ preset name, matched loosely against the discovered list
    LoadEq(String),
    SetDisplay(bool),
    Reboot,
    /// The device has no power-off call; standby stops playback
    Standby,
}

impl AbstractCommand {
    /// Simple-command name, when the command has one
    pub fn simple_name(&self) -> Option<String> {
        let name = match self {
            AbstractCommand::Play => "play".to_string(),
            AbstractCommand::Pause => "pause".to_string(),
            AbstractCommand::PlayPause => "play_pause".to_string(),
            AbstractCommand::Stop => "stop".to_string(),
            AbstractCommand::Next => "next".to_string(),
            AbstractCommand::Previous => "previous".to_string(),
            AbstractCommand::AdjustVolume(VOLUME_STEP) => "volume_up".to_string(),
            AbstractCommand::AdjustVolume(step) if *step == -VOLUME_STEP => "volume_down".to_string(),
            AbstractCommand::ToggleMute => "mute_toggle".to_string(),
            AbstractCommand::ToggleShuffle => "shuffle_toggle".to_string(),
            AbstractCommand::CycleRepeat => "repeat_cycle".to_string(),
            AbstractCommand::Standby => "standby".to_string(),
            AbstractCommand::EqOn => "eq_on".to_string(),
            AbstractCommand::EqOff => "eq_off".to_string(),
            AbstractCommand::LoadEq(name) => format!("eq_{}", service_key(name)),
            AbstractCommand::ActivatePreset(slot) => format!("preset_{}", slot),
            AbstractCommand::SelectService(label) => format!("service_{}", service_key(label)),
            AbstractCommand::SetDisplay(true) => "display_on".to_string(),
            AbstractCommand::SetDisplay(false) => "display_off".to_string(),
            AbstractCommand::Reboot => "reboot".to_string(),
            AbstractCommand::SelectSource(id) => id.clone(),
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for AbstractCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbstractCommand::SetVolume(level) => write!(f, "set_volume({})", level),
            AbstractCommand::AdjustVolume(delta) if delta.abs() != VOLUME_STEP => {
                write!(f, "adjust_volume({:+})", delta)
            }
            AbstractCommand::SetMute(muted) => write!(f, "set_mute({})", muted),
            AbstractCommand::SetRepeat(mode) => write!(f, "set_repeat({:?})", mode),
            AbstractCommand::SetShuffle(on) => write!(f, "set_shuffle({})", on),
            AbstractCommand::SwitchOutput { output, source } => match source {
                Some(source) => write!(f, "switch_output({}, via {})", output, source),
                None => write!(f, "switch_output({})", output),
            },
            AbstractCommand::SelectSource(id) => write!(f, "source_{}", id),
            other => match other.simple_name() {
                Some(name) => f.write_str(&name),
                None => write!(f, "{:?}", other),
            },
        }
    }
}

/// Parse a simple-command name
///
/// Fixed names (`play`, `volume_up`, `eq_on`, ...) and the prefixed forms
/// `eq_<preset>`, `preset_<n>` and `service_<label>` are recognized. Any
/// other word is taken as a source id and validated later against the
/// capability set.
impl FromStr for AbstractCommand {
    type Err = CommandError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CommandError::InvalidParameter("empty command name".to_string()));
        }

        let command = match name.to_ascii_lowercase().as_str() {
            "play" => AbstractCommand::Play,
            "pause" => AbstractCommand::Pause,
            "play_pause" => AbstractCommand::PlayPause,
            "stop" => AbstractCommand::Stop,
            "next" => AbstractCommand::Next,
            "previous" | "prev" => AbstractCommand::Previous,
            "volume_up" => AbstractCommand::AdjustVolume(VOLUME_STEP),
            "volume_down" => AbstractCommand::AdjustVolume(-VOLUME_STEP),
            "mute_toggle" => AbstractCommand::ToggleMute,
            "shuffle_toggle" => AbstractCommand::ToggleShuffle,
            "repeat_cycle" => AbstractCommand::CycleRepeat,
            "standby" => AbstractCommand::Standby,
            "eq_on" => AbstractCommand::EqOn,
            "eq_off" => AbstractCommand::EqOff,
            "display_on" => AbstractCommand::SetDisplay(true),
            "display_off" => AbstractCommand::SetDisplay(false),
            "reboot" => AbstractCommand::Reboot,
            lowered => {
                if let Some(slot) = lowered.strip_prefix("preset_") {
                    let slot = slot.parse::<u8>().map_err(|_| {
                        CommandError::InvalidParameter(format!("preset slot {:?}", slot))
                    })?;
                    AbstractCommand::ActivatePreset(slot)
                } else if lowered.starts_with("eq_") {
                    AbstractCommand::LoadEq(name["eq_".len()..].to_string())
                } else if lowered.starts_with("service_") {
                    AbstractCommand::SelectService(name["service_".len()..].to_string())
                } else {
                    AbstractCommand::SelectSource(name.to_string())
                }
            }
        };
        Ok(command)
    }
}

/// Simple-command names valid for a device, for building button maps
///
/// Playback and volume names come first, then EQ presets, presets,
/// services, device functions and finally source ids.
pub fn simple_commands(capabilities: &CapabilitySet) -> Vec<String> {
    let mut names: Vec<String> = [
        "play",
        "pause",
        "play_pause",
        "stop",
        "next",
        "previous",
        "volume_up",
        "volume_down",
        "mute_toggle",
        "shuffle_toggle",
        "repeat_cycle",
        "standby",
    ]
    .iter()
    .map(|name| name.to_string())
    .collect();

    if capabilities.has_eq() {
        names.push("eq_on".to_string());
        names.push("eq_off".to_string());
        names.extend(
            capabilities
                .eq_presets
                .iter()
                .map(|preset| format!("eq_{}", service_key(preset))),
        );
    }

    names.extend(capabilities.presets.iter().map(|p| format!("preset_{}", p.slot)));
    names.extend(
        capabilities
            .services
            .iter()
            .map(|s| format!("service_{}", service_key(s.as_str()))),
    );

    names.extend(["display_on", "display_off", "reboot"].iter().map(|n| n.to_string()));
    names.extend(capabilities.sources.iter().map(|s| s.id.clone()));

    names
}

/// How a command ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Succeeded,
    /// Some device calls took effect before one failed
    ///
    /// `applied` lists the calls the device accepted, so the host can tell
    /// what state the device was left in.
    PartiallySucceeded {
        applied: Vec<PlanStep>,
        failed: PlanStep,
        error: CommandError,
    },
    Failed(CommandError),
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Succeeded)
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, CommandOutcome::PartiallySucceeded { .. })
    }

    /// At least one device call took effect
    pub fn changed_device(&self) -> bool {
        !matches!(self, CommandOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&CommandError> {
        match self {
            CommandOutcome::Succeeded => None,
            CommandOutcome::PartiallySucceeded { error, .. } | CommandOutcome::Failed(error) => {
                Some(error)
            }
        }
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Succeeded => f.write_str("succeeded"),
            CommandOutcome::PartiallySucceeded { applied, failed, error } => {
                let applied: Vec<String> = applied.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "partially succeeded: applied [{}], {} failed: {}",
                    applied.join(", "),
                    failed,
                    error
                )
            }
            CommandOutcome::Failed(error) => write!(f, "failed: {}", error),
        }
    }
}

/// Resolution state of a [`PendingCommand`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandState {
    Pending,
    Resolved(CommandOutcome),
}

/// A host command waiting for, or done with, execution
#[derive(Debug, Clone)]
pub struct PendingCommand {
    pub id: u64,
    pub command: AbstractCommand,
    pub issued_at: Instant,
    pub state: CommandState,
}

impl PendingCommand {
    pub fn new(id: u64, command: AbstractCommand) -> Self {
        Self {
            id,
            command,
            issued_at: Instant::now(),
            state: CommandState::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == CommandState::Pending
    }

    /// Waited longer than `timeout` as of `now`
    pub fn is_expired(&self, timeout: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.issued_at) > timeout
    }

    pub fn resolve(&mut self, outcome: CommandOutcome) {
        self.state = CommandState::Resolved(outcome);
    }

    pub fn outcome(&self) -> Option<&CommandOutcome> {
        match &self.state {
            CommandState::Pending => None,
            CommandState::Resolved(outcome) => Some(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wiim_state::{
        CapabilitySet, DeviceIdentity, PresetEntry, ServiceLabel, SourceCategory, SourceEntry,
    };

    fn capabilities(eq: Vec<&str>) -> CapabilitySet {
        CapabilitySet::new(
            1,
            DeviceIdentity::default(),
            vec![
                SourceEntry {
                    id: "wifi".to_string(),
                    label: "WiFi".to_string(),
                    category: SourceCategory::Streaming,
                },
                SourceEntry {
                    id: "optical".to_string(),
                    label: "Optical".to_string(),
                    category: SourceCategory::Physical,
                },
            ],
            vec![
                PresetEntry {
                    slot: 2,
                    name: None,
                    service: Some(ServiceLabel::Known("Amazon Music".to_string())),
                    raw: serde_json::Value::Null,
                },
                PresetEntry {
                    slot: 1,
                    name: None,
                    service: Some(ServiceLabel::Known("Spotify".to_string())),
                    raw: serde_json::Value::Null,
                },
            ],
            eq.into_iter().map(str::to_string).collect(),
            vec![],
        )
    }

    #[rstest]
    #[case("play", AbstractCommand::Play)]
    #[case("PLAY_PAUSE", AbstractCommand::PlayPause)]
    #[case("volume_up", AbstractCommand::AdjustVolume(5))]
    #[case("volume_down", AbstractCommand::AdjustVolume(-5))]
    #[case("repeat_cycle", AbstractCommand::CycleRepeat)]
    #[case("standby", AbstractCommand::Standby)]
    #[case("eq_on", AbstractCommand::EqOn)]
    #[case("eq_bass_booster", AbstractCommand::LoadEq("bass_booster".to_string()))]
    #[case("preset_7", AbstractCommand::ActivatePreset(7))]
    #[case("service_spotify", AbstractCommand::SelectService("spotify".to_string()))]
    #[case("display_off", AbstractCommand::SetDisplay(false))]
    #[case("line-in", AbstractCommand::SelectSource("line-in".to_string()))]
    fn test_parse_simple_command(#[case] name: &str, #[case] expected: AbstractCommand) {
        assert_eq!(name.parse::<AbstractCommand>().unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            "preset_x".parse::<AbstractCommand>(),
            Err(CommandError::InvalidParameter(_))
        ));
        assert!("  ".parse::<AbstractCommand>().is_err());
    }

    #[test]
    fn test_simple_names_parse_back() {
        for name in simple_commands(&capabilities(vec!["Flat", "Bass Booster"])) {
            let command: AbstractCommand = name.parse().unwrap();
            assert_eq!(command.simple_name().as_deref(), Some(name.as_str()));
        }
    }

    #[test]
    fn test_simple_commands_follow_capabilities() {
        let names = simple_commands(&capabilities(vec!["Flat", "Bass Booster"]));
        assert!(names.contains(&"eq_bassbooster".to_string()));
        assert!(names.contains(&"preset_1".to_string()));
        assert!(names.contains(&"service_amazonmusic".to_string()));
        assert_eq!(names.last().map(String::as_str), Some("optical"));

        let without_eq = simple_commands(&capabilities(vec![]));
        assert!(!without_eq.iter().any(|n| n.starts_with("eq_")));
    }

    #[test]
    fn test_pending_command_lifecycle() {
        let mut pending = PendingCommand::new(7, AbstractCommand::Play);
        assert!(pending.is_pending());
        assert!(!pending.is_expired(Duration::from_secs(10), Instant::now()));
        assert!(pending.is_expired(
            Duration::from_secs(10),
            pending.issued_at + Duration::from_secs(11)
        ));

        pending.resolve(CommandOutcome::Succeeded);
        assert!(!pending.is_pending());
        assert_eq!(pending.outcome(), Some(&CommandOutcome::Succeeded));
    }

    #[test]
    fn test_outcome_helpers() {
        let failed = CommandOutcome::Failed(CommandError::NotConnected);
        assert!(!failed.changed_device());
        assert_eq!(failed.error(), Some(&CommandError::NotConnected));
        assert!(CommandOutcome::Succeeded.is_success());
        assert_eq!(AbstractCommand::AdjustVolume(-5).to_string(), "volume_down");
        assert_eq!(AbstractCommand::SetVolume(30).to_string(), "set_volume(30)");
    }
}
