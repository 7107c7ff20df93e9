//! Packet source reading an encoded stream from a file or named pipe.
//!
//! The device runtime writes each encoder output as a raw bitstream to a
//! FIFO (or a regular file when replaying).  A dedicated reader thread turns
//! the byte stream into [`EncodedPacket`]s of up to [`READ_CHUNK_SIZE`]
//! bytes.  End of file closes the channel.
//!
//! Opening a FIFO blocks until its writer has opened the other end.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use tracing::{debug, error};

use super::{EncodedPacket, PacketSource, SourceError};

/// Largest packet handed to the recorder.
pub const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Reads one encoded stream from `path`.
#[derive(Debug, Clone)]
pub struct PipePacketSource {
    path: PathBuf,
    stopped: Arc<AtomicBool>,
}

impl PipePacketSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PacketSource for PipePacketSource {
    fn start(&self) -> Result<mpsc::Receiver<EncodedPacket>, SourceError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(SourceError::AlreadyStopped);
        }

        let file = File::open(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let (tx, rx) = mpsc::channel();
        let stopped = Arc::clone(&self.stopped);
        let path = self.path.clone();

        thread::Builder::new()
            .name("oakcam-pipe-reader".to_string())
            .spawn(move || read_loop(file, &path, tx, &stopped))
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;

        Ok(rx)
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

/// The receive loop executed on the reader thread.
fn read_loop(mut file: File, path: &Path, tx: mpsc::Sender<EncodedPacket>, stopped: &AtomicBool) {
    let mut buf = vec![0u8; READ_CHUNK_SIZE];

    while !stopped.load(Ordering::SeqCst) {
        let len = match file.read(&mut buf) {
            Ok(0) => {
                debug!("end of stream {}", path.display());
                break;
            }
            Ok(len) => len,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                error!("read error on {}: {e}", path.display());
                break;
            }
        };

        if tx.send(EncodedPacket::from(buf[..len].to_vec())).is_err() {
            // Recorder has finished and dropped the receiver.
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_file(content: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("oakcam_pipe_{}.h264", Uuid::new_v4()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_reads_whole_file_then_closes_channel() {
        // Arrange
        let content: Vec<u8> = (0..(READ_CHUNK_SIZE * 2 + 10))
            .map(|i| (i % 251) as u8)
            .collect();
        let path = temp_file(&content);
        let source = PipePacketSource::new(&path);

        // Act: iteration ends once the reader thread drops its sender.
        let rx = source.start().unwrap();
        let packets: Vec<EncodedPacket> = rx.iter().collect();

        // Assert
        assert!(packets.iter().all(|p| p.data.len() <= READ_CHUNK_SIZE));
        let read: Vec<u8> = packets.into_iter().flat_map(|p| p.data).collect();
        assert_eq!(read, content);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join(format!("oakcam_absent_{}.h264", Uuid::new_v4()));
        let source = PipePacketSource::new(&path);

        let result = source.start();

        assert!(matches!(result, Err(SourceError::Io { path: ref p, .. }) if *p == path));
    }

    #[test]
    fn test_start_after_stop_is_rejected() {
        let path = temp_file(b"\x00\x00\x00\x01");
        let source = PipePacketSource::new(&path);
        source.stop();

        assert!(matches!(source.start(), Err(SourceError::AlreadyStopped)));

        std::fs::remove_file(&path).ok();
    }
}
