//! Raw input identities shared by every device type.
//!
//! Digital inputs report [`MAX_VALUE`] when pressed and 0 when released.
//! Analog axes report a magnitude in `[0, MAX_VALUE]`; the sign lives in the
//! [`AxisDirection`] of the identity, so the two directions of an axis behave
//! like two independent buttons.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a pressed digital input and of a saturated axis.
pub const MAX_VALUE: i32 = 32768;

/// Direction of an axis relative to its rest position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisDirection {
    Negative,
    #[default]
    Neutral,
    Positive,
}

impl AxisDirection {
    fn sign(self) -> &'static str {
        match self {
            AxisDirection::Negative => "-",
            AxisDirection::Neutral => "0",
            AxisDirection::Positive => "+",
        }
    }
}

/// Identity of a single physical control.
///
/// Used as the key of action maps and as the result of input sensing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Input {
    Keyboard {
        key: i32,
    },
    MouseMotion {
        axis: u8,
        direction: AxisDirection,
    },
    MouseButton {
        button: u8,
    },
    StickMotion {
        stick: u32,
        axis: u32,
        direction: AxisDirection,
    },
    StickButton {
        stick: u32,
        button: u32,
    },
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Keyboard { key } => write!(f, "key {}", key),
            Input::MouseMotion { axis, direction } => {
                write!(f, "mouse axis {}{}", axis, direction.sign())
            }
            Input::MouseButton { button } => write!(f, "mouse button {}", button),
            Input::StickMotion {
                stick,
                axis,
                direction,
            } => write!(f, "stick {} axis {}{}", stick, axis, direction.sign()),
            Input::StickButton { stick, button } => {
                write!(f, "stick {} button {}", stick, button)
            }
        }
    }
}

/// Key symbols as reported by the windowing layer (SDL numbering)
pub mod keys {
    pub const BACKSPACE: i32 = 8;
    pub const TAB: i32 = 9;
    pub const RETURN: i32 = 13;
    pub const ESCAPE: i32 = 27;
    pub const SPACE: i32 = 32;
    pub const A: i32 = 97;
    pub const D: i32 = 100;
    pub const E: i32 = 101;
    pub const Q: i32 = 113;
    pub const S: i32 = 115;
    pub const W: i32 = 119;
    pub const DELETE: i32 = 127;
    pub const UP: i32 = 273;
    pub const DOWN: i32 = 274;
    pub const RIGHT: i32 = 275;
    pub const LEFT: i32 = 276;
    pub const END: i32 = 279;
    pub const F11: i32 = 292;
    pub const RIGHT_SHIFT: i32 = 303;
    pub const LEFT_SHIFT: i32 = 304;
    pub const RIGHT_CTRL: i32 = 305;
    pub const LEFT_CTRL: i32 = 306;
}

/// Mouse button numbers
pub mod mouse_buttons {
    pub const LEFT: u8 = 1;
    pub const MIDDLE: u8 = 2;
    pub const RIGHT: u8 = 3;
    pub const WHEEL_UP: u8 = 4;
    pub const WHEEL_DOWN: u8 = 5;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_marks_axis_direction() {
        let axis = Input::StickMotion {
            stick: 0,
            axis: 2,
            direction: AxisDirection::Positive,
        };
        assert_eq!(axis.to_string(), "stick 0 axis 2+");

        let mouse = Input::MouseMotion {
            axis: 1,
            direction: AxisDirection::Negative,
        };
        assert_eq!(mouse.to_string(), "mouse axis 1-");
    }
}
