//! FinalizeSessionUseCase: turn raw bitstreams into playable MP4 files.
//!
//! For every stream whose raw file exists, the transcoder writes the `.mp4`
//! next to it and the raw file is deleted.  A failed transcode keeps the raw
//! file so nothing recorded is lost; the session can be finalized again
//! later with `oakcam-recorder transcode <dir>`.

use tracing::{debug, error, info, warn};

use crate::domain::{RecordingSession, StreamKind};
use crate::infrastructure::transcoder::Transcoder;

/// Options for [`finalize_session`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinalizeOptions {
    /// Keep the raw bitstream after a successful transcode.
    pub keep_raw: bool,
}

/// What happened to each stream of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizeReport {
    /// Streams now available as MP4.
    pub converted: Vec<StreamKind>,
    /// Streams whose transcode failed, with the reason.  Raw files are kept.
    pub failed: Vec<(StreamKind, String)>,
    /// Streams without a raw file in the session.
    pub missing: Vec<StreamKind>,
}

impl FinalizeReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Transcodes every raw stream of `session`.
pub async fn finalize_session(
    session: &RecordingSession,
    transcoder: &dyn Transcoder,
    options: FinalizeOptions,
) -> FinalizeReport {
    info!(
        "converting the stream files in {} into video files (.mp4)",
        session.dir().display()
    );

    let mut report = FinalizeReport::default();
    for kind in StreamKind::ALL {
        let raw = session.raw_path(kind);
        if !raw.exists() {
            debug!("no raw {kind} stream at {}", raw.display());
            report.missing.push(kind);
            continue;
        }

        let mp4 = session.mp4_path(kind);
        match transcoder.transcode(&raw, &mp4).await {
            Ok(()) => {
                if !options.keep_raw {
                    if let Err(e) = tokio::fs::remove_file(&raw).await {
                        warn!("failed to remove {}: {e}", raw.display());
                    }
                }
                report.converted.push(kind);
            }
            Err(e) => {
                error!("failed to convert {}: {e}", raw.display());
                report.failed.push((kind, e.to_string()));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::transcoder::mock::MockTranscoder;
    use uuid::Uuid;

    fn session_with(kinds: &[StreamKind]) -> RecordingSession {
        let session = RecordingSession::from_dir(
            std::env::temp_dir().join(format!("oakcam_fin_{}", Uuid::new_v4())),
        );
        session.create().expect("create session dir");
        for kind in kinds {
            std::fs::write(session.raw_path(*kind), kind.file_stem()).unwrap();
        }
        session
    }

    #[tokio::test]
    async fn test_successful_transcode_removes_raw_file() {
        // Arrange
        let session = session_with(&StreamKind::ALL);
        let transcoder = MockTranscoder::new();

        // Act
        let report = finalize_session(&session, &transcoder, FinalizeOptions::default()).await;

        // Assert
        assert_eq!(report.converted, StreamKind::ALL.to_vec());
        assert!(report.is_success());
        for kind in StreamKind::ALL {
            assert!(!session.raw_path(kind).exists());
            assert_eq!(
                std::fs::read_to_string(session.mp4_path(kind)).unwrap(),
                kind.file_stem()
            );
        }

        std::fs::remove_dir_all(session.dir()).ok();
    }

    #[tokio::test]
    async fn test_failed_transcode_keeps_raw_file() {
        // Arrange
        let session = session_with(&[StreamKind::MonoLeft, StreamKind::Color]);
        let transcoder = MockTranscoder::new();
        transcoder.fail_on(session.raw_path(StreamKind::Color));

        // Act
        let report = finalize_session(&session, &transcoder, FinalizeOptions::default()).await;

        // Assert
        assert_eq!(report.converted, vec![StreamKind::MonoLeft]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, StreamKind::Color);
        assert_eq!(report.missing, vec![StreamKind::MonoRight]);
        assert!(session.raw_path(StreamKind::Color).exists());
        assert!(!session.raw_path(StreamKind::MonoLeft).exists());

        std::fs::remove_dir_all(session.dir()).ok();
    }

    #[tokio::test]
    async fn test_keep_raw_option_preserves_raw_files() {
        let session = session_with(&[StreamKind::MonoRight]);
        let transcoder = MockTranscoder::new();

        let report =
            finalize_session(&session, &transcoder, FinalizeOptions { keep_raw: true }).await;

        assert_eq!(report.converted, vec![StreamKind::MonoRight]);
        assert!(session.raw_path(StreamKind::MonoRight).exists());
        assert!(session.mp4_path(StreamKind::MonoRight).exists());

        std::fs::remove_dir_all(session.dir()).ok();
    }

    #[tokio::test]
    async fn test_transcoder_receives_raw_and_mp4_paths() {
        let session = session_with(&[StreamKind::Color]);
        let transcoder = MockTranscoder::new();

        let _ = finalize_session(&session, &transcoder, FinalizeOptions::default()).await;

        assert_eq!(
            transcoder.calls(),
            vec![(
                session.raw_path(StreamKind::Color),
                session.mp4_path(StreamKind::Color)
            )]
        );
        std::fs::remove_dir_all(session.dir()).ok();
    }
}
