//! Raw bitstream → MP4 transcoding via an external ffmpeg process.
//!
//! The device writes Annex-B elementary streams that most players refuse to
//! open.  ffmpeg copies them into an MP4 container without re-encoding:
//!
//! ```text
//! ffmpeg -y -framerate 30 -i mono1.h264 -c copy mono1.mp4
//! ```
//!
//! `-y` overwrites an `.mp4` left behind by an earlier failed attempt, so a
//! session can be finalized again.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

pub mod mock;

/// Default ffmpeg executable, resolved through `PATH`.
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Default input frame rate handed to ffmpeg.
pub const DEFAULT_FRAMERATE: u32 = 30;

/// Error type for transcoding.
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    /// The transcoder process could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The transcoder ran but reported failure.
    #[error("{program} exited with {status}: {message}")]
    Failed {
        program: PathBuf,
        status: ExitStatus,
        message: String,
    },
}

/// Trait abstracting the raw → MP4 conversion.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Converts the raw bitstream at `input` into an MP4 at `output`.
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError>;
}

/// Runs ffmpeg in stream-copy mode.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
    framerate: u32,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG, DEFAULT_FRAMERATE)
    }
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<PathBuf>, framerate: u32) -> Self {
        Self {
            program: program.into(),
            framerate,
        }
    }

    /// Command-line arguments for converting `input` into `output`.
    pub fn args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-framerate".to_string(),
            self.framerate.to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            output.display().to_string(),
        ]
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        let args = self.args(input, output);
        info!("executing: {} {}", self.program.display(), args.join(" "));

        let out = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| TranscodeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if out.status.success() {
            debug!("{} -> {}", input.display(), output.display());
            return Ok(());
        }

        // ffmpeg prints its diagnosis last.
        let stderr = String::from_utf8_lossy(&out.stderr);
        let message = stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or_default()
            .trim()
            .to_string();
        Err(TranscodeError::Failed {
            program: self.program.clone(),
            status: out.status,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_match_stream_copy_invocation() {
        let transcoder = FfmpegTranscoder::default();
        let args = transcoder.args(Path::new("rec/mono1.h264"), Path::new("rec/mono1.mp4"));
        assert_eq!(
            args,
            [
                "-y",
                "-framerate",
                "30",
                "-i",
                "rec/mono1.h264",
                "-c",
                "copy",
                "rec/mono1.mp4"
            ]
        );
    }

    #[test]
    fn test_args_use_configured_framerate() {
        let transcoder = FfmpegTranscoder::new("ffmpeg", 60);
        let args = transcoder.args(Path::new("a.h265"), Path::new("a.mp4"));
        assert_eq!(args[2], "60");
    }

    #[tokio::test]
    async fn test_missing_program_reports_spawn_error() {
        // Arrange
        let transcoder = FfmpegTranscoder::new("/nonexistent/oakcam/ffmpeg", 30);

        // Act
        let result = transcoder
            .transcode(Path::new("in.h264"), Path::new("out.mp4"))
            .await;

        // Assert
        assert!(matches!(result, Err(TranscodeError::Spawn { .. })));
    }
}
