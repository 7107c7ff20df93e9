//! RecordStreamsUseCase: drain encoded streams into raw files.
//!
//! Each stream's packets are appended to its raw file in arrival order.  All
//! streams are serviced from the calling thread: every pass empties each
//! channel without blocking, and the loop only sleeps when a whole pass
//! found nothing to write.
//!
//! Recording ends when `running` is cleared (e.g. from a Ctrl-C handler) or when
//! every source has closed its channel.  Packets already queued at that
//! point are still written before the files are flushed.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use tracing::{debug, info};

use crate::domain::{RecordingSession, StreamKind};
use crate::infrastructure::packet_source::{EncodedPacket, PacketSource, SourceError};

/// Sleep between passes that found no packets.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Error type for recording.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start {kind} stream: {source}")]
    Source {
        kind: StreamKind,
        #[source]
        source: SourceError,
    },
    #[error("recording thread failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Per-stream totals for a finished recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    pub kind: StreamKind,
    pub packets: u64,
    pub bytes: u64,
}

struct ActiveStream {
    stats: StreamStats,
    path: PathBuf,
    rx: Receiver<EncodedPacket>,
    writer: BufWriter<File>,
    open: bool,
}

impl ActiveStream {
    /// Writes every queued packet.  Returns `true` if anything was written.
    fn drain(&mut self) -> Result<bool, RecordError> {
        let mut wrote = false;
        while self.open {
            match self.rx.try_recv() {
                Ok(packet) => {
                    self.writer
                        .write_all(&packet.data)
                        .map_err(|source| RecordError::Io {
                            path: self.path.clone(),
                            source,
                        })?;
                    self.stats.packets += 1;
                    self.stats.bytes += packet.data.len() as u64;
                    wrote = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("{} stream closed", self.stats.kind);
                    self.open = false;
                }
            }
        }
        Ok(wrote)
    }

    fn flush(&mut self) -> Result<(), RecordError> {
        self.writer.flush().map_err(|source| RecordError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Records `inputs` into the raw files of `session` until stopped.
///
/// The session directory must already exist.  Every source is stopped before
/// returning, also on error.
///
/// # Errors
///
/// Returns [`RecordError::Source`] if a source fails to start and
/// [`RecordError::Io`] if a raw file cannot be created or written.
pub fn record_streams(
    session: &RecordingSession,
    inputs: Vec<(StreamKind, Box<dyn PacketSource>)>,
    running: &AtomicBool,
) -> Result<Vec<StreamStats>, RecordError> {
    let result = record_until_stopped(session, &inputs, running);
    for (_, source) in &inputs {
        source.stop();
    }
    result
}

fn record_until_stopped(
    session: &RecordingSession,
    inputs: &[(StreamKind, Box<dyn PacketSource>)],
    running: &AtomicBool,
) -> Result<Vec<StreamStats>, RecordError> {
    let mut streams = Vec::with_capacity(inputs.len());
    for (kind, source) in inputs {
        let path = session.raw_path(*kind);
        let file = File::create(&path).map_err(|source| RecordError::Io {
            path: path.clone(),
            source,
        })?;
        let rx = source.start().map_err(|source| RecordError::Source {
            kind: *kind,
            source,
        })?;
        info!("recording {kind} to {}", path.display());
        streams.push(ActiveStream {
            stats: StreamStats {
                kind: *kind,
                packets: 0,
                bytes: 0,
            },
            path,
            rx,
            writer: BufWriter::new(file),
            open: true,
        });
    }

    while running.load(Ordering::Relaxed) {
        let mut wrote = false;
        for stream in &mut streams {
            wrote |= stream.drain()?;
        }
        if streams.iter().all(|s| !s.open) {
            info!("all streams closed");
            break;
        }
        if !wrote {
            std::thread::sleep(IDLE_POLL_INTERVAL);
        }
    }

    let mut stats = Vec::with_capacity(streams.len());
    for stream in &mut streams {
        stream.drain()?;
        stream.flush()?;
        info!(
            "{}: {} packets, {} bytes",
            stream.stats.kind, stream.stats.packets, stream.stats.bytes
        );
        stats.push(stream.stats);
    }
    Ok(stats)
}
