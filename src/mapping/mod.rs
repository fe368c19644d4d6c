//! Input identities, game actions and the tables between them
//!
//! ```text
//! Input (device, control, direction) ──► ActionMap ──► GameAction
//! ```

pub mod action;
pub mod action_map;
pub mod input;

pub use action::{GameAction, KartAction, PlayerId, MAX_PLAYERS};
pub use action_map::ActionMap;
pub use input::{keys, mouse_buttons, AxisDirection, Input, MAX_VALUE};
