//! Control message delivery to the device cameras.
//!
//! The recorder links one control input to both mono cameras (the grey
//! channel) and another to the color camera.  A [`ControlSink`] accepts a
//! [`CameraCommand`] for one of those channels.

use std::fmt;

use oakcam_core::CameraCommand;
use tracing::info;

pub mod mock;

/// Which camera control input a command is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlChannel {
    /// Both mono cameras.
    Grey,
    /// The color camera.
    Color,
}

impl ControlChannel {
    /// Name of the device input stream carrying this channel.
    pub fn stream_name(&self) -> &'static str {
        match self {
            ControlChannel::Grey => "controlGrey",
            ControlChannel::Color => "controlColor",
        }
    }
}

impl fmt::Display for ControlChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stream_name())
    }
}

/// Error type for control delivery.
#[derive(Debug, thiserror::Error)]
pub enum ControlSinkError {
    #[error("control input `{0}` is closed")]
    Closed(ControlChannel),
}

/// Trait abstracting the device's control inputs.
///
/// Tests use [`mock::MockControlSink`]; without a device the binary uses
/// [`LogControlSink`].
pub trait ControlSink: Send + Sync {
    fn send(&self, channel: ControlChannel, command: CameraCommand) -> Result<(), ControlSinkError>;
}

/// Dry-run sink: logs every command instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogControlSink;

impl ControlSink for LogControlSink {
    fn send(&self, channel: ControlChannel, command: CameraCommand) -> Result<(), ControlSinkError> {
        info!("[{channel}] {command}");
        Ok(())
    }
}
