//! Live camera controls driven from the keyboard.
//!
//! The live control tool shows a camera preview and listens for single
//! keystrokes.  Each keystroke becomes a [`KeyAction`], which
//! [`ManualControls`] turns into a [`CameraCommand`] for the device:
//!
//! ```text
//!   Control:          key[dec/inc]  min..max
//!   exposure time:        I   O      1..33000 [us]
//!   sensitivity iso:      K   L    100..1600
//!   focus:                ,   .      0..255 [far..near]
//!
//!   C  capture still          T  autofocus trigger (single shot)
//!   F  continuous autofocus   E  auto exposure
//!   Q  quit
//! ```
//!
//! Sending the command to the device is the caller's job; this module only
//! decides what to send.

pub mod command;
pub mod keymap;
pub mod limits;
pub mod state;

pub use command::{AutoFocusMode, CameraCommand};
pub use keymap::{KeyAction, StepDirection};
pub use limits::{ControlRange, EXPOSURE_US, LENS_POSITION, SENSITIVITY_ISO};
pub use state::{persist_command, ControlOutcome, ManualControls};

/// Settings key holding the manual exposure time in microseconds.
pub const EXPOSURE_KEY: &str = "exp";
/// Settings key holding the manual sensitivity ISO.
pub const ISO_KEY: &str = "iso";
/// Settings key holding the manual lens position.
pub const FOCUS_KEY: &str = "focus";
/// Settings key telling whether continuous autofocus stays enabled.
pub const AUTOFOCUS_KEY: &str = "autofocus";
