//! Mock control sink for unit testing.

use std::sync::{Arc, Mutex};

use oakcam_core::CameraCommand;

use super::{ControlChannel, ControlSink, ControlSinkError};

/// Records every command sent through it.
#[derive(Clone, Default)]
pub struct MockControlSink {
    sent: Arc<Mutex<Vec<(ControlChannel, CameraCommand)>>>,
    closed: Arc<Mutex<bool>>,
}

impl MockControlSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all commands sent so far.
    pub fn sent(&self) -> Vec<(ControlChannel, CameraCommand)> {
        self.sent.lock().expect("lock poisoned").clone()
    }

    /// Makes every further `send` fail with [`ControlSinkError::Closed`].
    pub fn close(&self) {
        *self.closed.lock().expect("lock poisoned") = true;
    }
}

impl ControlSink for MockControlSink {
    fn send(&self, channel: ControlChannel, command: CameraCommand) -> Result<(), ControlSinkError> {
        if *self.closed.lock().expect("lock poisoned") {
            return Err(ControlSinkError::Closed(channel));
        }
        self.sent
            .lock()
            .expect("lock poisoned")
            .push((channel, command));
        Ok(())
    }
}
