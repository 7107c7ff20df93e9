//! ControlLoopUseCase: keystrokes in, camera commands out.
//!
//! Every character read from the input is looked up in the key table.
//! Bound keys produce a command for the grey cameras.  Each sent command is
//! also recorded in the grey settings so the next recording starts from the
//! same state: manual focus saves `focus`, manual exposure saves `exp` and
//! `iso`, and auto exposure removes them again.  The loop ends on `q` or end
//! of input.

use std::fmt::Display;
use std::io::BufRead;

use oakcam_core::{persist_command, ControlOutcome, KeyAction, ManualControls, SettingsMap};
use tracing::{debug, info, warn};

use crate::infrastructure::control_sink::{ControlChannel, ControlSink, ControlSinkError};

/// Error type for the control loop.
#[derive(Debug, thiserror::Error)]
pub enum ControlLoopError {
    #[error("failed to read keyboard input: {0}")]
    Input(#[from] std::io::Error),
    #[error(transparent)]
    Sink(#[from] ControlSinkError),
}

/// Summary of a finished control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlLoopSummary {
    /// Commands delivered to the sink.
    pub commands_sent: usize,
    /// `true` if the loop ended on `q` rather than end of input.
    pub quit_requested: bool,
}

/// Runs the control loop until `q` or end of input.
///
/// Failures to save control state are logged and do not stop the loop.
///
/// # Errors
///
/// Returns [`ControlLoopError`] when the input cannot be read or the sink
/// rejects a command.
pub fn run_control_loop<R, S>(
    input: R,
    controls: &mut ManualControls,
    grey_settings: &mut S,
    sink: &dyn ControlSink,
) -> Result<ControlLoopSummary, ControlLoopError>
where
    R: BufRead,
    S: SettingsMap,
    S::Error: Display,
{
    let mut commands_sent = 0;

    for line in input.lines() {
        let line = line?;
        for key in line.chars() {
            let Some(action) = KeyAction::from_key(key) else {
                debug!("unbound key {key:?}");
                continue;
            };

            let command = match controls.apply(action) {
                ControlOutcome::Quit => {
                    info!("quit requested");
                    return Ok(ControlLoopSummary {
                        commands_sent,
                        quit_requested: true,
                    });
                }
                ControlOutcome::Send(command) => command,
            };

            info!("{command}");
            sink.send(ControlChannel::Grey, command)?;
            commands_sent += 1;

            if let Err(e) = persist_command(&command, grey_settings) {
                warn!("failed to save {command}: {e}");
            }
        }
    }

    Ok(ControlLoopSummary {
        commands_sent,
        quit_requested: false,
    })
}
