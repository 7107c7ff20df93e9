//! Keystroke → control action table.

/// Direction of a single-step adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Decrease,
    Increase,
}

/// What a keystroke asks the control tool to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// `q`: leave the control loop.
    Quit,
    /// `c`: capture a still image.
    CaptureStill,
    /// `t`: switch to single-shot autofocus and trigger it once.
    TriggerAutoFocus,
    /// `f`: enable continuous autofocus.
    ContinuousAutoFocus,
    /// `e`: hand exposure back to the auto-exposure loop.
    AutoExposure,
    /// `,` / `.`: move the lens far / near.
    Focus(StepDirection),
    /// `i` / `o`: shorter / longer exposure.
    Exposure(StepDirection),
    /// `k` / `l`: lower / higher ISO.
    Iso(StepDirection),
}

impl KeyAction {
    /// Maps a keystroke to its action.  Letters are case-insensitive.
    ///
    /// Returns `None` for keys without a binding.
    pub fn from_key(key: char) -> Option<Self> {
        use StepDirection::{Decrease, Increase};

        let action = match key.to_ascii_lowercase() {
            'q' => KeyAction::Quit,
            'c' => KeyAction::CaptureStill,
            't' => KeyAction::TriggerAutoFocus,
            'f' => KeyAction::ContinuousAutoFocus,
            'e' => KeyAction::AutoExposure,
            ',' => KeyAction::Focus(Decrease),
            '.' => KeyAction::Focus(Increase),
            'i' => KeyAction::Exposure(Decrease),
            'o' => KeyAction::Exposure(Increase),
            'k' => KeyAction::Iso(Decrease),
            'l' => KeyAction::Iso(Increase),
            _ => return None,
        };
        Some(action)
    }
}
