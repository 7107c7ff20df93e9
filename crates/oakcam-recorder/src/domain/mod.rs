//! Domain types for the recorder.
//!
//! Nothing here touches the device or spawns processes.  The only side
//! effect is [`session::RecordingSession::create`], which makes the
//! recording directory.

pub mod session;

pub use session::{EncoderPreset, RecordingSession, StreamKind, VideoCodec};
