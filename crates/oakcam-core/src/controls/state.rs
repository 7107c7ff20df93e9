//! Current manual exposure and focus values.

use serde_yaml::Value;
use tracing::warn;

use super::command::{AutoFocusMode, CameraCommand};
use super::keymap::KeyAction;
use super::limits::{ControlRange, EXPOSURE_US, LENS_POSITION, SENSITIVITY_ISO};
use super::{EXPOSURE_KEY, FOCUS_KEY, ISO_KEY};
use crate::settings::SettingsMap;

/// What the control loop should do after a keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// Leave the loop.
    Quit,
    /// Send this command to the camera.
    Send(CameraCommand),
}

/// Manual exposure, ISO and lens position tracked by the control tool.
///
/// Every value stays inside its [`ControlRange`]; adjustments that would
/// leave the range are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualControls {
    lens_position: u32,
    exposure_us: u32,
    iso: u32,
}

impl Default for ManualControls {
    fn default() -> Self {
        Self {
            lens_position: LENS_POSITION.default,
            exposure_us: EXPOSURE_US.default,
            iso: SENSITIVITY_ISO.default,
        }
    }
}

impl ManualControls {
    /// Creates controls from explicit values, clamping each into its range.
    pub fn new(lens_position: u32, exposure_us: u32, iso: u32) -> Self {
        Self {
            lens_position: LENS_POSITION.clamp(i64::from(lens_position)),
            exposure_us: EXPOSURE_US.clamp(i64::from(exposure_us)),
            iso: SENSITIVITY_ISO.clamp(i64::from(iso)),
        }
    }

    /// Seeds the controls from previously saved settings.
    ///
    /// Missing keys fall back to the power-on defaults.  Values of the wrong
    /// type are logged and ignored; out-of-range numbers are clamped.
    pub fn from_settings<S: SettingsMap>(settings: &S) -> Self {
        Self {
            lens_position: read_clamped(settings, FOCUS_KEY, &LENS_POSITION),
            exposure_us: read_clamped(settings, EXPOSURE_KEY, &EXPOSURE_US),
            iso: read_clamped(settings, ISO_KEY, &SENSITIVITY_ISO),
        }
    }

    pub fn lens_position(&self) -> u32 {
        self.lens_position
    }

    pub fn exposure_us(&self) -> u32 {
        self.exposure_us
    }

    pub fn iso(&self) -> u32 {
        self.iso
    }

    /// Applies a keystroke action and returns what to do next.
    pub fn apply(&mut self, action: KeyAction) -> ControlOutcome {
        let command = match action {
            KeyAction::Quit => return ControlOutcome::Quit,
            KeyAction::CaptureStill => CameraCommand::CaptureStill,
            KeyAction::TriggerAutoFocus => CameraCommand::AutoFocus {
                mode: AutoFocusMode::Auto,
                trigger: true,
            },
            KeyAction::ContinuousAutoFocus => CameraCommand::AutoFocus {
                mode: AutoFocusMode::ContinuousVideo,
                trigger: false,
            },
            KeyAction::AutoExposure => CameraCommand::AutoExposure,
            KeyAction::Focus(direction) => {
                self.lens_position = LENS_POSITION.step(self.lens_position, direction);
                CameraCommand::ManualFocus {
                    lens_position: self.lens_position,
                }
            }
            KeyAction::Exposure(direction) => {
                self.exposure_us = EXPOSURE_US.step(self.exposure_us, direction);
                self.manual_exposure()
            }
            KeyAction::Iso(direction) => {
                self.iso = SENSITIVITY_ISO.step(self.iso, direction);
                self.manual_exposure()
            }
        };
        ControlOutcome::Send(command)
    }

    /// The manual exposure command for the current exposure time and ISO.
    pub fn manual_exposure(&self) -> CameraCommand {
        CameraCommand::ManualExposure {
            exposure_us: self.exposure_us,
            iso: self.iso,
        }
    }
}

/// Records the effect of a sent command in `settings`.
///
/// Manual focus saves `focus`; manual exposure saves `exp` and `iso`.  Going
/// back to auto exposure removes `exp` and `iso`, so the next recording
/// starts in auto exposure too.  Other commands leave `settings` untouched.
///
/// # Errors
///
/// Propagates the first error returned by the settings container.
pub fn persist_command<S: SettingsMap>(
    command: &CameraCommand,
    settings: &mut S,
) -> Result<(), S::Error> {
    match *command {
        CameraCommand::ManualFocus { lens_position } => {
            settings.set(FOCUS_KEY, Value::from(lens_position))
        }
        CameraCommand::ManualExposure { exposure_us, iso } => {
            settings.set(EXPOSURE_KEY, Value::from(exposure_us))?;
            settings.set(ISO_KEY, Value::from(iso))
        }
        CameraCommand::AutoExposure => {
            for key in [EXPOSURE_KEY, ISO_KEY] {
                if settings.contains_key(key) {
                    settings.delete(key)?;
                }
            }
            Ok(())
        }
        CameraCommand::CaptureStill | CameraCommand::AutoFocus { .. } => Ok(()),
    }
}

fn read_clamped<S: SettingsMap>(settings: &S, key: &str, range: &ControlRange) -> u32 {
    match settings.get_as::<i64>(key) {
        Ok(Some(value)) => range.clamp(value),
        Ok(None) => range.default,
        Err(e) => {
            warn!("ignoring settings key `{key}`: {e}");
            range.default
        }
    }
}
