//! Infrastructure adapters for the recorder.
//!
//! - **`packet_source`** – Encoded bitstream packets coming off the device.
//! - **`control_sink`**  – Control messages going to the device cameras.
//! - **`transcoder`**    – The external ffmpeg process that wraps raw
//!   bitstreams into MP4 containers.
//!
//! The device itself is reached through the vendor runtime; the traits here
//! are the seams where that runtime plugs in, and the mocks let the
//! application layer run without hardware.

pub mod control_sink;
pub mod packet_source;
pub mod transcoder;
