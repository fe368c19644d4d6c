//! Abstract actions delivered to the active handler

use crate::error::DriverError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of local players that can have kart bindings
pub const MAX_PLAYERS: usize = 4;

/// Index of a local player, always below [`MAX_PLAYERS`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PlayerId(u8);

impl PlayerId {
    pub fn new(index: usize) -> Result<Self, DriverError> {
        if index < MAX_PLAYERS {
            Ok(Self(index as u8))
        } else {
            Err(DriverError::PlayerOutOfRange {
                index,
                limit: MAX_PLAYERS,
            })
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = DriverError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        PlayerId::new(value as usize)
    }
}

impl From<PlayerId> for u8 {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

/// Per-kart controls
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KartAction {
    Left,
    Right,
    Accel,
    Brake,
    Wheelie,
    Jump,
    Rescue,
    Fire,
    LookBack,
}

impl KartAction {
    pub const ALL: [KartAction; 9] = [
        KartAction::Left,
        KartAction::Right,
        KartAction::Accel,
        KartAction::Brake,
        KartAction::Wheelie,
        KartAction::Jump,
        KartAction::Rescue,
        KartAction::Fire,
        KartAction::LookBack,
    ];
}

/// Action resolved from an input through the active action map.
///
/// `SenseCancel` and `SenseComplete` are produced by the driver itself while
/// sensing and are never bound to an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameAction {
    SenseCancel,
    SenseComplete,

    Enter,
    Leave,
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    ClearMapping,

    ToggleFullscreen,
    Kart { player: PlayerId, action: KartAction },
}

impl GameAction {
    /// Actions a menu-mode map may bind
    pub fn is_menu(&self) -> bool {
        matches!(
            self,
            GameAction::Enter
                | GameAction::Leave
                | GameAction::CursorUp
                | GameAction::CursorDown
                | GameAction::CursorLeft
                | GameAction::CursorRight
                | GameAction::ClearMapping
        )
    }

    /// Actions an in-game map may bind
    pub fn is_ingame(&self) -> bool {
        matches!(
            self,
            GameAction::Leave | GameAction::ToggleFullscreen | GameAction::Kart { .. }
        )
    }
}
