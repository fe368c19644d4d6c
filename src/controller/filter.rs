//! Deadzone and edge filtering for analog inputs
//!
//! Converts raw analog samples into the digital-style signals the action
//! dispatch expects: a direction plus a magnitude in `[0, MAX_VALUE]`, where a
//! magnitude of 0 is a release.
//!
//! Joystick axes and relative mouse motion are treated differently:
//!
//! ```text
//! stick axis:   sample ─► threshold ─► press / explicit release (edge, once)
//! mouse motion: delta ─► accumulator ─► per-tick level check ─► press or silence
//! ```
//!
//! The mouse never reports an explicit release; once the accumulator falls
//! back into the deadzone it is zeroed and simply stops being reported.

use crate::mapping::input::{AxisDirection, MAX_VALUE};

/// Default deadzone for the per-tick mouse accumulator check
pub const DEADZONE_MOUSE: i32 = 150;
/// Default deadzone for relative mouse motion while sensing input
pub const DEADZONE_MOUSE_SENSE: i32 = 200;
/// Default deadzone for joystick axes
pub const DEADZONE_JOYSTICK: i32 = 1000;
/// Default scale applied to relative mouse deltas
pub const MULTIPLIER_MOUSE: i32 = 750;

/// Digital-style signal produced from an analog sample
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisSignal {
    pub direction: AxisDirection,
    pub value: i32,
}

impl AxisSignal {
    pub fn press(direction: AxisDirection, value: i32) -> Self {
        Self {
            direction,
            value: value.min(MAX_VALUE),
        }
    }

    pub fn release(direction: AxisDirection) -> Self {
        Self {
            direction,
            value: 0,
        }
    }
}

fn beyond_deadzone(value: i32, deadzone: i32) -> Option<AxisSignal> {
    if value <= -deadzone {
        Some(AxisSignal::press(AxisDirection::Negative, value.saturating_neg()))
    } else if value >= deadzone {
        Some(AxisSignal::press(AxisDirection::Positive, value))
    } else {
        None
    }
}

/// Filters one joystick axis sample against the last reported direction.
///
/// `last` is updated to the direction reported by this call. A sample inside
/// the deadzone releases the previously reported direction exactly once;
/// further idle samples produce nothing. Flipping straight from one side to the
/// other releases the old direction before pressing the new one.
pub fn filter_stick_axis(last: &mut AxisDirection, value: i32, deadzone: i32) -> Vec<AxisSignal> {
    match beyond_deadzone(value, deadzone) {
        Some(press) => {
            let previous = std::mem::replace(last, press.direction);
            if previous != AxisDirection::Neutral && previous != press.direction {
                vec![AxisSignal::release(previous), press]
            } else {
                vec![press]
            }
        }
        None => match std::mem::replace(last, AxisDirection::Neutral) {
            AxisDirection::Neutral => Vec::new(),
            previous => vec![AxisSignal::release(previous)],
        },
    }
}

/// Direction-only mouse signals used while sensing input.
///
/// Returns one entry per axis (x, y). The larger sensing deadzone keeps normal
/// pointer jitter from being picked up as a binding.
pub fn sense_mouse_motion(xrel: i32, yrel: i32, deadzone: i32) -> [Option<AxisDirection>; 2] {
    [xrel, yrel].map(|rel| beyond_deadzone(rel, deadzone).map(|signal| signal.direction))
}

/// Accumulated relative mouse motion, making the mouse behave like an analog
/// stick. Both axes stay within `[-MAX_VALUE, MAX_VALUE]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MouseAxisAccumulator {
    x: i32,
    y: i32,
}

impl MouseAxisAccumulator {
    pub fn accumulate(&mut self, xrel: i32, yrel: i32, multiplier: i32) {
        self.x = Self::saturate(self.x, xrel, multiplier);
        self.y = Self::saturate(self.y, yrel, multiplier);
    }

    fn saturate(current: i32, rel: i32, multiplier: i32) -> i32 {
        let next = current as i64 + rel as i64 * multiplier as i64;
        next.clamp(-(MAX_VALUE as i64), MAX_VALUE as i64) as i32
    }

    /// Level check run once per tick.
    ///
    /// Axes at or beyond the deadzone yield a signal carrying their magnitude;
    /// axes inside it are zeroed and yield nothing.
    pub fn evaluate(&mut self, deadzone: i32) -> [Option<AxisSignal>; 2] {
        let x = beyond_deadzone(self.x, deadzone);
        if x.is_none() {
            self.x = 0;
        }
        let y = beyond_deadzone(self.y, deadzone);
        if y.is_none() {
            self.y = 0;
        }
        [x, y]
    }

    pub fn reset(&mut self) {
        self.x = 0;
        self.y = 0;
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }
}
