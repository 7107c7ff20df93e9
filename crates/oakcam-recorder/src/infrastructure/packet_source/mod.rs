//! Encoded packet sources.
//!
//! Each device encoder output is exposed as a [`PacketSource`].  Starting a
//! source yields an `mpsc` receiver; the recorder drains it without blocking
//! so that several streams can be serviced from one thread.  A source that
//! stops producing drops its sender, which the recorder observes as a
//! disconnected channel.

use std::path::PathBuf;
use std::sync::mpsc;

pub mod mock;
pub mod pipe;

/// One chunk of encoded bitstream, in device output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPacket {
    pub data: Vec<u8>,
}

impl From<Vec<u8>> for EncodedPacket {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

/// Error type for packet source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to open stream {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("packet source has already been stopped")]
    AlreadyStopped,
}

/// Trait abstracting an encoded stream output of the device.
///
/// [`pipe::PipePacketSource`] reads a stream written to a file or FIFO; tests
/// use [`mock::MockPacketSource`].
pub trait PacketSource: Send {
    /// Starts the source and returns a receiver for its packets.
    fn start(&self) -> Result<mpsc::Receiver<EncodedPacket>, SourceError>;
    /// Stops the source and closes its channel.
    fn stop(&self);
}
