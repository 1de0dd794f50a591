//! Data model for raw device samples and the normalized command derived from them.
//!
//! A [`RawDeviceSample`] is the per-tick snapshot read from a
//! [`DeviceSource`](crate::source::DeviceSource). The poller folds it into a
//! [`ConnectionState`] (raw view) and a [`NormalizedCommand`] (semantic view)
//! and then discards it. The command is a pure function of the most recent
//! sample and the configured deadzone; it carries no history.

use serde::{Deserialize, Serialize};

// Button slots in the fixed sample layout (standard gamepad order).
pub const BTN_SOUTH: usize = 0;
pub const BTN_EAST: usize = 1;
pub const BTN_WEST: usize = 2;
pub const BTN_NORTH: usize = 3;
pub const BTN_LEFT_BUMPER: usize = 4;
pub const BTN_RIGHT_BUMPER: usize = 5;
pub const BTN_SELECT: usize = 6;
pub const BTN_START: usize = 7;
pub const BTN_LEFT_THUMB: usize = 8;
pub const BTN_RIGHT_THUMB: usize = 9;

// Axis slots. Sticks are in [-1, 1], triggers in [0, 1].
pub const AXIS_LEFT_X: usize = 0;
pub const AXIS_LEFT_Y: usize = 1;
pub const AXIS_RIGHT_X: usize = 2;
pub const AXIS_RIGHT_Y: usize = 3;
pub const AXIS_LEFT_TRIGGER: usize = 4;
pub const AXIS_RIGHT_TRIGGER: usize = 5;

/// Opaque per-tick snapshot from an input source.
///
/// Immutable after creation. Short samples are legal: any index beyond the
/// stored sequences reads as `false` / `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDeviceSample {
    pub device_id: String,
    pub connected: bool,
    pub buttons: Vec<bool>,
    pub axes: Vec<f32>,
}

impl RawDeviceSample {
    /// Button at `index`, defaulting to released when absent.
    pub fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }

    /// Axis at `index`, defaulting to neutral when absent.
    pub fn axis(&self, index: usize) -> f32 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }
}

/// Connection view of the tracked device: raw button/axis sequences plus
/// identity. Reset to disconnected defaults when the tracked device detaches.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConnectionState {
    pub connected: bool,
    pub device_id: String,
    pub raw_buttons: Vec<bool>,
    pub raw_axes: Vec<f32>,
}

impl ConnectionState {
    pub fn from_sample(sample: &RawDeviceSample) -> Self {
        Self {
            connected: true,
            device_id: sample.device_id.clone(),
            raw_buttons: sample.buttons.clone(),
            raw_axes: sample.axes.clone(),
        }
    }
}

/// Semantic command view of the latest sample.
///
/// Stick channels follow the mode-2 assignment used for drone control:
/// roll = right stick X, pitch = right stick Y, throttle = left stick Y,
/// yaw = left stick X. Each stick channel has the deadzone applied
/// independently; buttons and triggers pass straight through.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedCommand {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub throttle: f32,

    pub south: bool,
    pub east: bool,
    pub west: bool,
    pub north: bool,
    pub left_bumper: bool,
    pub right_bumper: bool,
    pub left_thumb: bool,
    pub right_thumb: bool,

    pub left_trigger: f32,
    pub right_trigger: f32,
}

impl NormalizedCommand {
    /// Derives the command from a raw sample with the given deadzone threshold.
    pub fn from_sample(sample: &RawDeviceSample, deadzone: f32) -> Self {
        Self {
            roll: apply_deadzone(sample.axis(AXIS_RIGHT_X), deadzone),
            pitch: apply_deadzone(sample.axis(AXIS_RIGHT_Y), deadzone),
            yaw: apply_deadzone(sample.axis(AXIS_LEFT_X), deadzone),
            throttle: apply_deadzone(sample.axis(AXIS_LEFT_Y), deadzone),

            south: sample.button(BTN_SOUTH),
            east: sample.button(BTN_EAST),
            west: sample.button(BTN_WEST),
            north: sample.button(BTN_NORTH),
            left_bumper: sample.button(BTN_LEFT_BUMPER),
            right_bumper: sample.button(BTN_RIGHT_BUMPER),
            left_thumb: sample.button(BTN_LEFT_THUMB),
            right_thumb: sample.button(BTN_RIGHT_THUMB),

            left_trigger: sample.axis(AXIS_LEFT_TRIGGER).clamp(0.0, 1.0),
            right_trigger: sample.axis(AXIS_RIGHT_TRIGGER).clamp(0.0, 1.0),
        }
    }
}

/// Applies deadzone correction to a single axis value.
///
/// Values inside the deadzone collapse to exactly 0.0; the remaining travel
/// range `[deadzone, 1]` is rescaled to `[0, 1]` so that full deflection still
/// yields ±1.0 and the output is continuous at the deadzone boundary.
pub fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if value.abs() < deadzone {
        0.0
    } else {
        let sign = if value < 0.0 { -1.0 } else { 1.0 };
        sign * (value.abs() - deadzone) / (1.0 - deadzone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: f32 = 0.15;

    fn sample(buttons: Vec<bool>, axes: Vec<f32>) -> RawDeviceSample {
        RawDeviceSample {
            device_id: "Test Pad".to_string(),
            connected: true,
            buttons,
            axes,
        }
    }

    #[test]
    fn deadzone_zeroes_values_inside_threshold() {
        for v in [0.0, 0.05, 0.10, 0.149, -0.05, -0.149] {
            assert_eq!(apply_deadzone(v, D), 0.0);
        }
    }

    #[test]
    fn deadzone_rescales_half_deflection() {
        let corrected = apply_deadzone(0.5, D);
        assert!((corrected - (0.5 - D) / (1.0 - D)).abs() < 1e-6);
        assert!((corrected - 0.4118).abs() < 1e-3);
    }

    #[test]
    fn deadzone_full_deflection_is_exact() {
        assert_eq!(apply_deadzone(1.0, D), 1.0);
        assert_eq!(apply_deadzone(-1.0, D), -1.0);
    }

    #[test]
    fn deadzone_is_continuous_at_boundary() {
        assert_eq!(apply_deadzone(D, D), 0.0);
        assert!(apply_deadzone(D + 1e-4, D).abs() < 1e-3);
        assert!(apply_deadzone(-D - 1e-4, D).abs() < 1e-3);
    }

    #[test]
    fn deadzone_preserves_sign() {
        assert!(apply_deadzone(0.6, D) > 0.0);
        assert!(apply_deadzone(-0.6, D) < 0.0);
    }

    #[test]
    fn command_uses_mode_two_channel_assignment() {
        let s = sample(vec![], vec![0.5, -0.8, 1.0, -1.0]);
        let cmd = NormalizedCommand::from_sample(&s, D);
        assert_eq!(cmd.roll, 1.0);
        assert_eq!(cmd.pitch, -1.0);
        assert!((cmd.yaw - apply_deadzone(0.5, D)).abs() < 1e-6);
        assert!((cmd.throttle - apply_deadzone(-0.8, D)).abs() < 1e-6);
    }

    #[test]
    fn command_passes_buttons_and_triggers_through() {
        let s = sample(
            vec![
                true, false, true, false, true, false, false, false, true, false,
            ],
            vec![0.0, 0.0, 0.0, 0.0, 0.3, 1.0],
        );
        let cmd = NormalizedCommand::from_sample(&s, D);
        assert!(cmd.south && cmd.west && cmd.left_bumper && cmd.left_thumb);
        assert!(!cmd.east && !cmd.north && !cmd.right_bumper && !cmd.right_thumb);
        assert!((cmd.left_trigger - 0.3).abs() < 1e-6);
        assert_eq!(cmd.right_trigger, 1.0);
    }

    #[test]
    fn short_sample_reads_as_neutral() {
        let s = sample(vec![true, true], vec![0.5]);
        let cmd = NormalizedCommand::from_sample(&s, D);
        // Only left stick X is present; everything else defaults.
        assert!((cmd.yaw - apply_deadzone(0.5, D)).abs() < 1e-6);
        assert_eq!(cmd.roll, 0.0);
        assert_eq!(cmd.pitch, 0.0);
        assert_eq!(cmd.throttle, 0.0);
        assert!(cmd.south && cmd.east);
        assert!(!cmd.left_bumper && !cmd.left_thumb);
        assert_eq!(cmd.left_trigger, 0.0);
        assert_eq!(cmd.right_trigger, 0.0);
    }

    #[test]
    fn trigger_values_are_clamped_to_unit_range() {
        let s = sample(vec![], vec![0.0, 0.0, 0.0, 0.0, -0.4, 1.6]);
        let cmd = NormalizedCommand::from_sample(&s, D);
        assert_eq!(cmd.left_trigger, 0.0);
        assert_eq!(cmd.right_trigger, 1.0);
    }

    #[test]
    fn connection_state_defaults_are_disconnected() {
        let state = ConnectionState::default();
        assert!(!state.connected);
        assert!(state.device_id.is_empty());
        assert!(state.raw_buttons.is_empty());
        assert!(state.raw_axes.is_empty());
    }
}
