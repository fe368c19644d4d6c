//! Driver modes and the transition table between them
//!
//! Menu is the hub: every other mode is entered from Menu and left back to
//! Menu. Bootstrap is the initial mode and is left exactly once.
//!
//! ```text
//!                 ┌──► InGame ─────┐
//! Bootstrap ──► Menu ──► InputSense ─┤
//!                 ▲└──► Lowlevel ───┤
//!                 └─────────────────┘
//! ```

use crate::error::DriverError;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DriverMode {
    /// Before initialization finished
    Bootstrap,
    /// Pointer visible, menu actions delivered, all sticks act as stick 0
    Menu,
    /// Pointer hidden, mouse acts as an analog stick, kart actions delivered
    InGame,
    /// Next released input is recorded instead of delivered
    InputSense,
    /// Like Menu, plus raw keyboard input with unicode for text entry
    Lowlevel,
}

impl DriverMode {
    pub const ALL: [DriverMode; 5] = [
        DriverMode::Bootstrap,
        DriverMode::Menu,
        DriverMode::InGame,
        DriverMode::InputSense,
        DriverMode::Lowlevel,
    ];
}

impl fmt::Display for DriverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriverMode::Bootstrap => "bootstrap",
            DriverMode::Menu => "menu",
            DriverMode::InGame => "ingame",
            DriverMode::InputSense => "input sense",
            DriverMode::Lowlevel => "lowlevel",
        };
        f.write_str(name)
    }
}

/// Side effect applied while switching modes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeEffect {
    InstallMenuMap,
    InstallInGameMap,
    ShowPointer,
    HidePointer,
    ResetMouse,
    OpenSenseSlot,
    CloseSenseSlot,
    EnableTextInput,
    DisableTextInput,
}

/// Effects of one legal transition, exit effects of the old mode first
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionPlan {
    pub from: DriverMode,
    pub to: DriverMode,
    pub exit: &'static [ModeEffect],
    pub entry: &'static [ModeEffect],
}

pub fn plan_transition(from: DriverMode, to: DriverMode) -> Result<TransitionPlan, DriverError> {
    use DriverMode::*;
    use ModeEffect::*;

    let (exit, entry): (&'static [ModeEffect], &'static [ModeEffect]) = match (from, to) {
        (Bootstrap, Menu) => (&[], &[InstallMenuMap]),
        (InGame, Menu) => (&[ResetMouse], &[InstallMenuMap, ShowPointer]),
        (InputSense, Menu) => (&[CloseSenseSlot], &[ShowPointer]),
        (Lowlevel, Menu) => (&[DisableTextInput], &[ShowPointer]),
        (Menu, InGame) => (&[], &[InstallInGameMap, HidePointer]),
        (Menu, InputSense) => (&[], &[ResetMouse, OpenSenseSlot, HidePointer]),
        (Menu, Lowlevel) => (&[], &[EnableTextInput, HidePointer]),
        _ => return Err(DriverError::IllegalTransition { from, to }),
    };

    Ok(TransitionPlan {
        from,
        to,
        exit,
        entry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use DriverMode::*;

    #[test]
    fn menu_reaches_every_other_mode_but_bootstrap() {
        for target in [InGame, InputSense, Lowlevel] {
            assert!(plan_transition(Menu, target).is_ok(), "menu -> {}", target);
        }
        assert!(plan_transition(Menu, Bootstrap).is_err());
        assert!(plan_transition(Menu, Menu).is_err());
    }

    #[test]
    fn other_modes_only_return_to_menu() {
        for from in [Bootstrap, InGame, InputSense, Lowlevel] {
            for to in DriverMode::ALL {
                let allowed = plan_transition(from, to).is_ok();
                assert_eq!(allowed, to == Menu, "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn rejected_transition_names_both_modes() {
        let err = plan_transition(InGame, Lowlevel).unwrap_err();
        assert!(matches!(
            err,
            DriverError::IllegalTransition {
                from: InGame,
                to: Lowlevel
            }
        ));
        assert_eq!(err.to_string(), "Illegal mode transition: ingame -> lowlevel");
    }

    #[test]
    fn pointer_shown_on_menu_entry_except_from_bootstrap() {
        let boot = plan_transition(Bootstrap, Menu).unwrap();
        assert!(!boot.exit.contains(&ModeEffect::ShowPointer));
        assert!(!boot.entry.contains(&ModeEffect::ShowPointer));

        for from in [InGame, InputSense, Lowlevel] {
            let plan = plan_transition(from, Menu).unwrap();
            assert!(plan.entry.contains(&ModeEffect::ShowPointer));
        }
    }

    #[test]
    fn leaving_ingame_resets_mouse_and_swaps_map() {
        let plan = plan_transition(InGame, Menu).unwrap();
        assert_eq!(plan.exit, &[ModeEffect::ResetMouse]);
        assert_eq!(
            plan.entry,
            &[ModeEffect::InstallMenuMap, ModeEffect::ShowPointer]
        );
    }

    #[test]
    fn sense_slot_opened_and_closed_symmetrically() {
        let enter = plan_transition(Menu, InputSense).unwrap();
        let leave = plan_transition(InputSense, Menu).unwrap();
        assert!(enter.entry.contains(&ModeEffect::OpenSenseSlot));
        assert!(leave.exit.contains(&ModeEffect::CloseSenseSlot));
    }
}
