//! # oakcam-core
//!
//! Shared library for the oakcam depth-camera tools.
//!
//! The camera itself (pipeline topology, device I/O, hardware encoders) is
//! driven by the vendor runtime.  What this crate owns is everything around
//! it that the tools decide for themselves:
//!
//! - **`settings`** – A persistent key/value store backed by a YAML file.
//!   Every mutation is written straight back to disk, and new default keys
//!   can be merged in without losing values the user already saved.
//!
//! - **`controls`** – The keyboard mapping of the live control tool: which
//!   key adjusts exposure, ISO or focus, the sensor limits those values are
//!   clamped to, and the control commands that result.

pub mod controls;
pub mod settings;

pub use controls::{
    persist_command, AutoFocusMode, CameraCommand, ControlOutcome, ControlRange, KeyAction,
    ManualControls, StepDirection,
};
pub use settings::{
    KeyPath, MemorySettings, PathError, SettingsError, SettingsMap, SettingsStore, UpdateOutcome,
};
