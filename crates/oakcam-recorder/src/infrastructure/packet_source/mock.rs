//! Mock packet source for unit testing.
//!
//! Allows tests to inject synthetic [`EncodedPacket`]s without a device.

use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};

use super::{EncodedPacket, PacketSource, SourceError};

/// A mock implementation of [`PacketSource`] that allows tests to inject packets.
///
/// Clones share the same channel, so a test can keep one handle while the
/// recorder owns another.
#[derive(Clone)]
pub struct MockPacketSource {
    sender: Arc<Mutex<Option<Sender<EncodedPacket>>>>,
    stopped: Arc<Mutex<bool>>,
}

impl MockPacketSource {
    pub fn new() -> Self {
        Self {
            sender: Arc::new(Mutex::new(None)),
            stopped: Arc::new(Mutex::new(false)),
        }
    }

    /// Injects a packet, as if produced by the device encoder.
    ///
    /// Panics if `start()` has not been called or the source was closed.
    pub fn inject_packet(&self, data: &[u8]) {
        let guard = self.sender.lock().expect("lock poisoned");
        if let Some(ref sender) = *guard {
            sender
                .send(EncodedPacket::from(data.to_vec()))
                .expect("receiver has been dropped; call start() first");
        } else {
            panic!("MockPacketSource::inject_packet called before start()");
        }
    }

    /// Returns `true` while a started channel is open.
    pub fn is_started(&self) -> bool {
        self.sender.lock().expect("lock poisoned").is_some()
    }

    /// Closes the channel as if the device stream ended.
    pub fn close(&self) {
        *self.sender.lock().expect("lock poisoned") = None;
    }

    /// Returns `true` once [`PacketSource::stop`] has been called.
    pub fn was_stopped(&self) -> bool {
        *self.stopped.lock().expect("lock poisoned")
    }
}

impl Default for MockPacketSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketSource for MockPacketSource {
    fn start(&self) -> Result<mpsc::Receiver<EncodedPacket>, SourceError> {
        if self.was_stopped() {
            return Err(SourceError::AlreadyStopped);
        }
        let (tx, rx) = mpsc::channel();
        *self.sender.lock().expect("lock poisoned") = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        self.close();
        *self.stopped.lock().expect("lock poisoned") = true;
    }
}
