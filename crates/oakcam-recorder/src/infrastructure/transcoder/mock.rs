//! Mock transcoder for unit testing.
//!
//! Copies the raw file to the output path instead of running ffmpeg, and can
//! be told to fail for specific inputs.  Failures are reported as
//! [`TranscodeError::Spawn`] of the pseudo program `mock-transcoder`.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{TranscodeError, Transcoder};

#[derive(Clone, Default)]
pub struct MockTranscoder {
    calls: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
    failing_inputs: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every transcode of `input` fail.
    pub fn fail_on(&self, input: impl Into<PathBuf>) {
        self.failing_inputs
            .lock()
            .expect("lock poisoned")
            .push(input.into());
    }

    /// Returns every `(input, output)` pair seen so far.
    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push((input.to_path_buf(), output.to_path_buf()));

        let fails = self
            .failing_inputs
            .lock()
            .expect("lock poisoned")
            .iter()
            .any(|p| p == input);
        if fails {
            return Err(spawn_error(io::Error::new(
                io::ErrorKind::Other,
                format!("told to fail on {}", input.display()),
            )));
        }

        tokio::fs::copy(input, output)
            .await
            .map(|_| ())
            .map_err(spawn_error)
    }
}

fn spawn_error(source: io::Error) -> TranscodeError {
    TranscodeError::Spawn {
        program: PathBuf::from("mock-transcoder"),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_fail_on_reports_spawn_error_without_writing_output() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("oakcam_mock_tc_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("color.h265");
        let output = dir.join("color.mp4");
        std::fs::write(&input, b"raw").unwrap();
        let transcoder = MockTranscoder::new();
        transcoder.fail_on(&input);

        // Act
        let result = transcoder.transcode(&input, &output).await;

        // Assert
        assert!(matches!(result, Err(TranscodeError::Spawn { .. })));
        assert!(!output.exists());
        assert_eq!(transcoder.calls(), vec![(input, output)]);

        std::fs::remove_dir_all(&dir).ok();
    }
}
