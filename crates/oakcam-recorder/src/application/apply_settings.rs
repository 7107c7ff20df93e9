//! ApplySettingsUseCase: startup camera commands from saved settings.
//!
//! Before recording starts, the saved settings are pushed to the cameras:
//!
//! - Grey (`grey.yaml`): when both `exp` and `iso` are set, the mono cameras
//!   get a manual exposure command.
//! - Color (`color.yaml`): when `autofocus` is set to `false`, the color
//!   camera switches to single-shot autofocus and triggers it once, which
//!   leaves focus fixed for the recording.
//!
//! Keys that are absent (or explicitly `null`) leave the camera on its
//! automatic defaults.

use oakcam_core::controls::{AUTOFOCUS_KEY, EXPOSURE_KEY, EXPOSURE_US, ISO_KEY, SENSITIVITY_ISO};
use oakcam_core::{AutoFocusMode, CameraCommand, SettingsMap};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::infrastructure::control_sink::{ControlChannel, ControlSink, ControlSinkError};

/// Commands derived from the saved settings, per control channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartupCommands {
    pub grey: Option<CameraCommand>,
    pub color: Option<CameraCommand>,
}

/// Works out which commands the saved settings call for.
pub fn startup_commands<G: SettingsMap, C: SettingsMap>(grey: &G, color: &C) -> StartupCommands {
    let exposure = read_present::<_, i64>(grey, EXPOSURE_KEY);
    let iso = read_present::<_, i64>(grey, ISO_KEY);
    let grey_command = match (exposure, iso) {
        (Some(exposure), Some(iso)) => Some(CameraCommand::ManualExposure {
            exposure_us: EXPOSURE_US.clamp(exposure),
            iso: SENSITIVITY_ISO.clamp(iso),
        }),
        _ => None,
    };

    let color_command = match read_present::<_, bool>(color, AUTOFOCUS_KEY) {
        Some(false) => Some(CameraCommand::AutoFocus {
            mode: AutoFocusMode::Auto,
            trigger: true,
        }),
        _ => None,
    };

    StartupCommands {
        grey: grey_command,
        color: color_command,
    }
}

/// Sends the startup commands through `sink` and returns what was sent.
///
/// # Errors
///
/// Returns the first [`ControlSinkError`] reported by the sink.
pub fn apply_settings<G: SettingsMap, C: SettingsMap>(
    grey: &G,
    color: &C,
    sink: &dyn ControlSink,
) -> Result<StartupCommands, ControlSinkError> {
    let commands = startup_commands(grey, color);
    if let Some(command) = commands.grey {
        info!("applying saved grey settings: {command}");
        sink.send(ControlChannel::Grey, command)?;
    }
    if let Some(command) = commands.color {
        info!("applying saved color settings: {command}");
        sink.send(ControlChannel::Color, command)?;
    }
    Ok(commands)
}

/// Reads `key` as `T`, treating `null` like an absent key.
fn read_present<S: SettingsMap, T: DeserializeOwned>(settings: &S, key: &str) -> Option<T> {
    if settings.get(key).map_or(true, |value| value.is_null()) {
        return None;
    }
    match settings.get_as::<T>(key) {
        Ok(value) => value,
        Err(e) => {
            warn!("ignoring settings key `{key}`: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::control_sink::mock::MockControlSink;
    use oakcam_core::MemorySettings;
    use serde_yaml::Value;

    fn settings(pairs: &[(&str, Value)]) -> MemorySettings {
        let mut s = MemorySettings::new();
        for (key, value) in pairs {
            s.set(key, value.clone()).unwrap();
        }
        s
    }

    #[test]
    fn test_exposure_and_iso_produce_manual_exposure() {
        // Arrange
        let grey = settings(&[("exp", Value::from(8000)), ("iso", Value::from(400))]);
        let color = MemorySettings::new();

        // Act
        let commands = startup_commands(&grey, &color);

        // Assert
        assert_eq!(
            commands.grey,
            Some(CameraCommand::ManualExposure {
                exposure_us: 8000,
                iso: 400
            })
        );
        assert_eq!(commands.color, None);
    }

    #[test]
    fn test_exposure_without_iso_sends_nothing() {
        let grey = settings(&[("exp", Value::from(8000))]);
        let commands = startup_commands(&grey, &MemorySettings::new());
        assert_eq!(commands, StartupCommands::default());
    }

    #[test]
    fn test_null_iso_counts_as_absent() {
        let grey = settings(&[("exp", Value::from(8000)), ("iso", Value::Null)]);
        let commands = startup_commands(&grey, &MemorySettings::new());
        assert_eq!(commands.grey, None);
    }

    #[test]
    fn test_autofocus_false_triggers_single_shot_focus() {
        let color = settings(&[("autofocus", Value::Bool(false))]);
        let commands = startup_commands(&MemorySettings::new(), &color);
        assert_eq!(
            commands.color,
            Some(CameraCommand::AutoFocus {
                mode: AutoFocusMode::Auto,
                trigger: true
            })
        );
    }

    #[test]
    fn test_autofocus_true_leaves_color_camera_alone() {
        let color = settings(&[("autofocus", Value::Bool(true))]);
        let commands = startup_commands(&MemorySettings::new(), &color);
        assert_eq!(commands.color, None);
    }

    #[test]
    fn test_wrongly_typed_autofocus_is_ignored() {
        let color = settings(&[("autofocus", Value::from("sometimes"))]);
        let commands = startup_commands(&MemorySettings::new(), &color);
        assert_eq!(commands.color, None);
    }

    #[test]
    fn test_apply_settings_sends_to_matching_channels() {
        // Arrange
        let grey = settings(&[("exp", Value::from(40_000)), ("iso", Value::from(800))]);
        let color = settings(&[("autofocus", Value::Bool(false))]);
        let sink = MockControlSink::new();

        // Act
        apply_settings(&grey, &color, &sink).expect("sink accepts commands");

        // Assert: exposure is clamped to the sensor maximum.
        assert_eq!(
            sink.sent(),
            vec![
                (
                    ControlChannel::Grey,
                    CameraCommand::ManualExposure {
                        exposure_us: 33_000,
                        iso: 800
                    }
                ),
                (
                    ControlChannel::Color,
                    CameraCommand::AutoFocus {
                        mode: AutoFocusMode::Auto,
                        trigger: true
                    }
                ),
            ]
        );
    }

    #[test]
    fn test_apply_settings_propagates_sink_error() {
        let grey = settings(&[("exp", Value::from(100)), ("iso", Value::from(100))]);
        let sink = MockControlSink::new();
        sink.close();

        let result = apply_settings(&grey, &MemorySettings::new(), &sink);

        assert!(matches!(result, Err(ControlSinkError::Closed(ControlChannel::Grey))));
    }
}
