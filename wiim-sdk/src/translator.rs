//! Command translation
//!
//! [`translate`] validates an [`AbstractCommand`] against the capability set
//! and turns it into an ordered [`CommandPlan`] without touching the
//! network. [`execute_plan`] then runs the plan step by step.

use std::fmt;

use wiim_api::{ApiError, DeviceCommand, PlayerStatus, Transport, WiimClient};
use wiim_state::normalize::clamp_volume;
use wiim_state::{CapabilitySet, LoopMode, RepeatMode};

use crate::command::{AbstractCommand, CommandOutcome};
use crate::config::FeatureToggles;
use crate::error::CommandError;

/// A change computed from the device's current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Volume(i32),
    ToggleMute,
    SetRepeat(RepeatMode),
    CycleRepeat,
    SetShuffle(bool),
    ToggleShuffle,
}

impl Adjustment {
    /// The write that applies this adjustment to `status`
    ///
    /// Fails with `Malformed` when the field it depends on is missing or
    /// unreadable; nothing is written in that case.
    pub fn resolve(&self, status: &PlayerStatus) -> Result<DeviceCommand, ApiError> {
        match self {
            Adjustment::Volume(delta) => {
                let current = read_field::<i64>(status.vol.as_deref(), "vol")?;
                Ok(DeviceCommand::SetVolume(clamp_volume(current + i64::from(*delta))))
            }
            Adjustment::ToggleMute => {
                let muted = match status.mute.as_deref().map(str::trim) {
                    Some("1") | Some("true") => true,
                    Some("0") | Some("false") => false,
                    other => {
                        return Err(ApiError::Malformed(format!("unreadable mute {:?}", other)))
                    }
                };
                Ok(DeviceCommand::SetMute(!muted))
            }
            loop_change => {
                let code = read_field::<u8>(status.loop_mode.as_deref(), "loop")?;
                let mut mode = LoopMode::from_code(code);
                match loop_change {
                    Adjustment::SetRepeat(repeat) => mode.repeat = *repeat,
                    Adjustment::CycleRepeat => mode.repeat = mode.repeat.cycle(),
                    Adjustment::SetShuffle(shuffle) => mode.shuffle = *shuffle,
                    Adjustment::ToggleShuffle => mode.shuffle = !mode.shuffle,
                    Adjustment::Volume(_) | Adjustment::ToggleMute => {}
                }
                Ok(DeviceCommand::SetLoopMode(mode.code()))
            }
        }
    }
}

fn read_field<T: std::str::FromStr>(raw: Option<&str>, field: &str) -> Result<T, ApiError> {
    raw.and_then(|value| value.trim().parse().ok())
        .ok_or_else(|| ApiError::Malformed(format!("unreadable {} {:?}", field, raw)))
}

/// One step of a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    /// Send a write as is
    Send(DeviceCommand),
    /// Read `getPlayerStatus`, compute the write, send it
    ReadModifyWrite(Adjustment),
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStep::Send(command) => write!(f, "{}", command),
            PlanStep::ReadModifyWrite(adjustment) => write!(f, "read-modify-write {:?}", adjustment),
        }
    }
}

/// Ordered device calls for one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    steps: Vec<PlanStep>,
}

impl CommandPlan {
    fn single(step: PlanStep) -> Self {
        Self { steps: vec![step] }
    }

    fn send(command: DeviceCommand) -> Self {
        Self::single(PlanStep::Send(command))
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn unsupported(what: impl Into<String>) -> CommandError {
    CommandError::UnsupportedCapability(what.into())
}

/// Validate `command` against the capability set and plan its device calls
///
/// A command that needs something the capability set lacks fails here with
/// `UnsupportedCapability`, before any call is made.
pub fn translate(
    command: &AbstractCommand,
    capabilities: &CapabilitySet,
    features: &FeatureToggles,
) -> Result<CommandPlan, CommandError> {
    let plan = match command {
        AbstractCommand::Play => CommandPlan::send(DeviceCommand::Resume),
        AbstractCommand::Pause => CommandPlan::send(DeviceCommand::Pause),
        AbstractCommand::PlayPause => CommandPlan::send(DeviceCommand::TogglePlayPause),
        AbstractCommand::Stop | AbstractCommand::Standby => CommandPlan::send(DeviceCommand::Stop),
        AbstractCommand::Next => CommandPlan::send(DeviceCommand::Next),
        AbstractCommand::Previous => CommandPlan::send(DeviceCommand::Previous),

        AbstractCommand::SetVolume(level) => {
            CommandPlan::send(DeviceCommand::SetVolume(clamp_volume(*level)))
        }
        AbstractCommand::AdjustVolume(delta) => {
            CommandPlan::single(PlanStep::ReadModifyWrite(Adjustment::Volume(*delta)))
        }
        AbstractCommand::SetMute(muted) => CommandPlan::send(DeviceCommand::SetMute(*muted)),
        AbstractCommand::ToggleMute => {
            CommandPlan::single(PlanStep::ReadModifyWrite(Adjustment::ToggleMute))
        }
        AbstractCommand::SetRepeat(repeat) => {
            CommandPlan::single(PlanStep::ReadModifyWrite(Adjustment::SetRepeat(*repeat)))
        }
        AbstractCommand::CycleRepeat => {
            CommandPlan::single(PlanStep::ReadModifyWrite(Adjustment::CycleRepeat))
        }
        AbstractCommand::SetShuffle(shuffle) => {
            CommandPlan::single(PlanStep::ReadModifyWrite(Adjustment::SetShuffle(*shuffle)))
        }
        AbstractCommand::ToggleShuffle => {
            CommandPlan::single(PlanStep::ReadModifyWrite(Adjustment::ToggleShuffle))
        }

        AbstractCommand::SelectSource(id) => {
            let source = capabilities
                .source(id)
                .ok_or_else(|| unsupported(format!("source {:?}", id)))?;
            CommandPlan::send(DeviceCommand::SwitchSource(source.id.clone()))
        }
        AbstractCommand::ActivatePreset(slot) => {
            if !(1..=12).contains(slot) {
                return Err(CommandError::InvalidParameter(format!(
                    "preset slot {} is outside 1..=12",
                    slot
                )));
            }
            if capabilities.preset(*slot).is_none() {
                return Err(unsupported(format!("preset {} is empty", slot)));
            }
            CommandPlan::send(DeviceCommand::ActivatePreset(*slot))
        }
        AbstractCommand::SelectService(label) => {
            let slot = capabilities
                .preset_for_service(label)
                .ok_or_else(|| unsupported(format!("no preset for service {:?}", label)))?;
            CommandPlan::send(DeviceCommand::ActivatePreset(slot))
        }
        AbstractCommand::SwitchOutput { output, source } => {
            if !capabilities.supports_output_switching() {
                return Err(unsupported("audio output switching"));
            }
            let mode = capabilities
                .output(*output)
                .ok_or_else(|| unsupported(format!("output mode {}", output)))?;

            let mut steps = Vec::with_capacity(2);
            // No combined call exists: input first, then output
            if let Some(id) = source {
                let source = capabilities
                    .source(id)
                    .ok_or_else(|| unsupported(format!("source {:?}", id)))?;
                steps.push(PlanStep::Send(DeviceCommand::SwitchSource(source.id.clone())));
            }
            steps.push(PlanStep::Send(DeviceCommand::SetOutputMode(mode.id)));
            CommandPlan { steps }
        }

        AbstractCommand::EqOn | AbstractCommand::EqOff | AbstractCommand::LoadEq(_)
            if !capabilities.has_eq() =>
        {
            return Err(unsupported("EQ"));
        }
        AbstractCommand::EqOn => CommandPlan::send(DeviceCommand::EqOn),
        AbstractCommand::EqOff => CommandPlan::send(DeviceCommand::EqOff),
        AbstractCommand::LoadEq(key) => {
            let name = capabilities
                .eq_preset(key)
                .ok_or_else(|| unsupported(format!("EQ preset {:?}", key)))?;
            CommandPlan::send(DeviceCommand::EqLoad(name.to_string()))
        }

        AbstractCommand::SetDisplay(_) | AbstractCommand::Reboot if !features.device_functions => {
            return Err(unsupported("device functions are disabled"));
        }
        AbstractCommand::SetDisplay(on) => CommandPlan::send(DeviceCommand::SetDisplay(*on)),
        AbstractCommand::Reboot => CommandPlan::send(DeviceCommand::Reboot),
    };

    Ok(plan)
}

/// Run a plan in order, stopping at the first failure
///
/// A failure before anything was applied is `Failed`; a failure after at
/// least one step took effect is `PartiallySucceeded` and lists the applied
/// steps. A read-modify-write whose read fails writes nothing.
pub fn execute_plan<T: Transport>(client: &WiimClient<T>, plan: &CommandPlan) -> CommandOutcome {
    let mut applied: Vec<PlanStep> = Vec::with_capacity(plan.len());

    for step in plan.steps() {
        match run_step(client, step) {
            Ok(()) => applied.push(step.clone()),
            Err(error) if applied.is_empty() => {
                tracing::warn!("{} failed: {}", step, error);
                return CommandOutcome::Failed(error);
            }
            Err(error) => {
                tracing::warn!(
                    "{} failed after {} applied step(s): {}",
                    step,
                    applied.len(),
                    error
                );
                return CommandOutcome::PartiallySucceeded {
                    applied,
                    failed: step.clone(),
                    error,
                };
            }
        }
    }

    CommandOutcome::Succeeded
}

fn run_step<T: Transport>(client: &WiimClient<T>, step: &PlanStep) -> Result<(), CommandError> {
    let command = match step {
        PlanStep::Send(command) => command.clone(),
        PlanStep::ReadModifyWrite(adjustment) => {
            let status = client.player_status()?;
            adjustment.resolve(&status)?
        }
    };
    tracing::debug!("Sending {}", command);
    client.send(&command)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn status(json: &str) -> PlayerStatus {
        serde_json::from_str(json).unwrap()
    }

    #[rstest]
    #[case(Adjustment::Volume(5), r#"{"vol":"30"}"#, DeviceCommand::SetVolume(35))]
    #[case(Adjustment::Volume(5), r#"{"vol":"98"}"#, DeviceCommand::SetVolume(100))]
    #[case(Adjustment::Volume(-5), r#"{"vol":"3"}"#, DeviceCommand::SetVolume(0))]
    #[case(Adjustment::ToggleMute, r#"{"mute":"0"}"#, DeviceCommand::SetMute(true))]
    #[case(Adjustment::ToggleMute, r#"{"mute":"1"}"#, DeviceCommand::SetMute(false))]
    #[case(Adjustment::ToggleShuffle, r#"{"loop":"0"}"#, DeviceCommand::SetLoopMode(2))]
    #[case(Adjustment::ToggleShuffle, r#"{"loop":"3"}"#, DeviceCommand::SetLoopMode(4))]
    #[case(Adjustment::CycleRepeat, r#"{"loop":"4"}"#, DeviceCommand::SetLoopMode(0))]
    #[case(Adjustment::CycleRepeat, r#"{"loop":"0"}"#, DeviceCommand::SetLoopMode(1))]
    #[case(Adjustment::CycleRepeat, r#"{"loop":"5"}"#, DeviceCommand::SetLoopMode(3))]
    #[case(Adjustment::SetRepeat(RepeatMode::One), r#"{"loop":"2"}"#, DeviceCommand::SetLoopMode(5))]
    #[case(Adjustment::SetShuffle(false), r#"{"loop":"5"}"#, DeviceCommand::SetLoopMode(1))]
    fn test_adjustment_resolve(
        #[case] adjustment: Adjustment,
        #[case] raw: &str,
        #[case] expected: DeviceCommand,
    ) {
        assert_eq!(adjustment.resolve(&status(raw)).unwrap(), expected);
    }

    #[test]
    fn test_adjustment_needs_its_field() {
        let err = Adjustment::ToggleShuffle.resolve(&status(r#"{"vol":"30"}"#)).unwrap_err();
        assert!(err.is_malformed());
        assert!(Adjustment::Volume(5).resolve(&status(r#"{"vol":"loud"}"#)).is_err());
    }
}
