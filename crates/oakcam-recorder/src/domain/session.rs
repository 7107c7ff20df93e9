//! Recording session layout.
//!
//! A session records three encoded streams side by side:
//!
//! ```text
//! record_20240131_14.05.09/
//!   mono1.h264   left mono camera,  H.264 1280x720 @ 30 fps
//!   mono2.h264   right mono camera, H.264 1280x720 @ 30 fps
//!   color.h265   color camera,      H.265 1920x1080 @ 30 fps
//! ```
//!
//! The raw files are Annex-B bitstreams straight from the device encoders and
//! are not playable on their own.  Finalizing the session copies each one
//! into an `.mp4` container next to it (`mono1.mp4`, ...).

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Directory name prefix for recording sessions.
pub const SESSION_DIR_PREFIX: &str = "record_";

/// Timestamp layout used in session directory names.
pub const SESSION_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H.%M.%S";

/// Video codec of an encoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
    H264,
    H265,
}

impl VideoCodec {
    /// File extension of the raw bitstream.
    pub fn extension(&self) -> &'static str {
        match self {
            VideoCodec::H264 => "h264",
            VideoCodec::H265 => "h265",
        }
    }
}

/// Encoder profile preset configured on the device for one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderPreset {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: VideoCodec,
}

/// One of the recorded camera streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Left mono (grey) camera.
    MonoLeft,
    /// Right mono (grey) camera.
    MonoRight,
    /// Color camera.
    Color,
}

impl StreamKind {
    /// All streams, in the order they are recorded and finalized.
    pub const ALL: [StreamKind; 3] = [StreamKind::MonoLeft, StreamKind::MonoRight, StreamKind::Color];

    /// File name without extension.
    pub fn file_stem(&self) -> &'static str {
        match self {
            StreamKind::MonoLeft => "mono1",
            StreamKind::MonoRight => "mono2",
            StreamKind::Color => "color",
        }
    }

    pub fn preset(&self) -> EncoderPreset {
        match self {
            StreamKind::MonoLeft | StreamKind::MonoRight => EncoderPreset {
                width: 1280,
                height: 720,
                fps: 30,
                codec: VideoCodec::H264,
            },
            StreamKind::Color => EncoderPreset {
                width: 1920,
                height: 1080,
                fps: 30,
                codec: VideoCodec::H265,
            },
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// The directory holding one recording and the paths of its streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSession {
    dir: PathBuf,
}

impl RecordingSession {
    /// Lays out a new session under `base_dir`, named after `started_at`.
    pub fn new(base_dir: &Path, started_at: NaiveDateTime) -> Self {
        let name = format!(
            "{SESSION_DIR_PREFIX}{}",
            started_at.format(SESSION_TIMESTAMP_FORMAT)
        );
        Self {
            dir: base_dir.join(name),
        }
    }

    /// Wraps an existing session directory, e.g. to finalize it later.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the session directory (and any missing parents).
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub fn create(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    /// Path of the raw encoded bitstream for `kind`.
    pub fn raw_path(&self, kind: StreamKind) -> PathBuf {
        self.dir
            .join(format!("{}.{}", kind.file_stem(), kind.preset().codec.extension()))
    }

    /// Path of the transcoded MP4 for `kind`.
    pub fn mp4_path(&self, kind: StreamKind) -> PathBuf {
        self.dir.join(format!("{}.mp4", kind.file_stem()))
    }
}
