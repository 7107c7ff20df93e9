//! Application layer use cases for the recorder.
//!
//! Use cases depend on the infrastructure traits, never on a concrete device
//! or process, so they run unchanged against the mocks in tests.
//!
//! # Sub-modules
//!
//! - **`apply_settings`**   – Derives the startup camera commands from the
//!   saved grey and color settings and sends them.
//! - **`control_loop`**     – Reads keystrokes and turns them into camera
//!   commands, saving manual values as they change.
//! - **`record_streams`**   – Drains every encoded stream into its raw file
//!   until recording stops.
//! - **`record_session`**   – Creates a timestamped session and records into
//!   it until a shutdown signal arrives.
//! - **`finalize_session`** – Transcodes the raw files of a session to MP4
//!   and removes them.

pub mod apply_settings;
pub mod control_loop;
pub mod finalize_session;
pub mod record_session;
pub mod record_streams;
