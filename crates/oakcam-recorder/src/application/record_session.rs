//! RecordSessionUseCase: one recording, from directory creation to stop.
//!
//! The session directory is named after `started_at`.  The synchronous drain
//! loop of [`record_streams`] runs on a blocking thread while a separate task
//! waits for `shutdown`; when it resolves, the shared `running` flag is
//! cleared and the drain loop winds down.  Recording also ends on its own
//! once every source has closed.

use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::info;

use super::record_streams::{record_streams, RecordError, StreamStats};
use crate::domain::{RecordingSession, StreamKind};
use crate::infrastructure::packet_source::PacketSource;

/// A finished recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSession {
    pub session: RecordingSession,
    pub streams: Vec<StreamStats>,
}

/// Records `inputs` into a new session under `base_dir` until `shutdown`
/// resolves or every source has closed.
///
/// # Errors
///
/// Returns [`RecordError::Io`] if the session directory cannot be created,
/// [`RecordError::Worker`] if the recording thread panicked, and any error of
/// [`record_streams`].
pub async fn record_session<F>(
    base_dir: &Path,
    started_at: NaiveDateTime,
    inputs: Vec<(StreamKind, Box<dyn PacketSource>)>,
    shutdown: F,
) -> Result<RecordedSession, RecordError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let session = RecordingSession::new(base_dir, started_at);
    session.create().map_err(|source| RecordError::Io {
        path: session.dir().to_path_buf(),
        source,
    })?;
    info!("recording into {}", session.dir().display());

    // Shutdown flag shared with the drain loop.
    let running = Arc::new(AtomicBool::new(true));

    let stopper = {
        let running = Arc::clone(&running);
        tokio::spawn(async move {
            shutdown.await;
            info!("stopping recording");
            running.store(false, Ordering::Relaxed);
        })
    };

    let result = tokio::task::spawn_blocking({
        let session = session.clone();
        let running = Arc::clone(&running);
        move || record_streams(&session, inputs, &running)
    })
    .await;
    stopper.abort();

    Ok(RecordedSession {
        session,
        streams: result??,
    })
}
