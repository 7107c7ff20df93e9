//! Camera control commands as plain data.

use std::fmt;

/// Autofocus behaviour requested from the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoFocusMode {
    /// Single-shot: focus once when triggered, then hold.
    Auto,
    /// Keep refocusing continuously, tuned for video.
    ContinuousVideo,
}

/// A control message destined for one camera's control input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraCommand {
    CaptureStill,
    AutoFocus { mode: AutoFocusMode, trigger: bool },
    AutoExposure,
    ManualFocus { lens_position: u32 },
    ManualExposure { exposure_us: u32, iso: u32 },
}

impl fmt::Display for CameraCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraCommand::CaptureStill => write!(f, "capture still"),
            CameraCommand::AutoFocus {
                mode: AutoFocusMode::Auto,
                trigger: true,
            } => write!(f, "autofocus trigger (continuous disabled)"),
            CameraCommand::AutoFocus { mode, trigger } => {
                write!(f, "autofocus mode {mode:?}, trigger {trigger}")
            }
            CameraCommand::AutoExposure => write!(f, "autoexposure enable"),
            CameraCommand::ManualFocus { lens_position } => {
                write!(f, "manual focus, lens position: {lens_position}")
            }
            CameraCommand::ManualExposure { exposure_us, iso } => {
                write!(f, "manual exposure, time: {exposure_us} us, iso: {iso}")
            }
        }
    }
}
