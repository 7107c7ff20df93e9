//! Sensor limits and step sizes for the manual controls.

use super::keymap::StepDirection;

/// Valid range, power-on default and keyboard step of one manual control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRange {
    pub min: u32,
    pub max: u32,
    pub default: u32,
    pub step: u32,
}

impl ControlRange {
    /// Clamps an arbitrary value into `min..=max`.
    pub fn clamp(&self, value: i64) -> u32 {
        // min/max are u32, so the clamped value always fits.
        value.clamp(i64::from(self.min), i64::from(self.max)) as u32
    }

    /// Moves `current` one step in `direction`, staying within the range.
    pub fn step(&self, current: u32, direction: StepDirection) -> u32 {
        let delta = i64::from(self.step);
        let next = match direction {
            StepDirection::Decrease => i64::from(current) - delta,
            StepDirection::Increase => i64::from(current) + delta,
        };
        self.clamp(next)
    }
}

/// Lens position, 0 (far) to 255 (near).
pub const LENS_POSITION: ControlRange = ControlRange {
    min: 0,
    max: 255,
    default: 150,
    step: 3,
};

/// Exposure time in microseconds.
pub const EXPOSURE_US: ControlRange = ControlRange {
    min: 1,
    max: 33_000,
    default: 20_000,
    step: 500,
};

/// Sensitivity ISO.
pub const SENSITIVITY_ISO: ControlRange = ControlRange {
    min: 100,
    max: 1_600,
    default: 800,
    step: 50,
};
