//! Key rebinding dialog
//!
//! Lets a player press the control that should drive one of their kart
//! actions. The dialog puts the driver into input sense mode and waits for
//! the driver's verdict:
//!
//! ```text
//! open() ──► InputSense ──SenseComplete──► rebind, Menu   (Bound)
//!                 │
//!                 ├──SenseCancel──────────► Menu           (Cancelled)
//!                 └──assign_escape()──────► bind Escape, Menu (Bound)
//! ```
//!
//! Escape cannot be sensed because it resolves to Leave, which cancels the
//! sensing. `assign_escape` exists for exactly that key.

use crate::driver::handler::InputHandler;
use crate::driver::mode::DriverMode;
use crate::driver::state::DriverContext;
use crate::error::DriverError;
use crate::mapping::action::{GameAction, KartAction, PlayerId};
use crate::mapping::input::{keys, Input};
use tracing::{debug, error, info};

/// Where a rebinding dialog stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingOutcome {
    Pending,
    Bound {
        player: PlayerId,
        action: KartAction,
        input: Input,
        /// Input the action was bound to before
        displaced: Option<Input>,
    },
    Cancelled,
}

impl BindingOutcome {
    pub fn is_finished(&self) -> bool {
        !matches!(self, BindingOutcome::Pending)
    }
}

#[derive(Debug)]
pub struct KeyBindingDialog {
    player: PlayerId,
    action: KartAction,
    outcome: BindingOutcome,
}

impl KeyBindingDialog {
    /// Starts sensing for `action` of `player`. The driver must be in Menu.
    pub fn open(
        driver: &mut DriverContext<'_>,
        player: PlayerId,
        action: KartAction,
    ) -> Result<Self, DriverError> {
        let configured = driver.config().players.len();
        if player.index() >= configured {
            error!("Cannot rebind {}: only {} players configured", player, configured);
            return Err(DriverError::PlayerOutOfRange {
                index: player.index(),
                limit: configured,
            });
        }

        driver.set_mode(DriverMode::InputSense)?;
        info!("Waiting for input to bind to {} {:?}", player, action);
        Ok(Self {
            player,
            action,
            outcome: BindingOutcome::Pending,
        })
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn action(&self) -> KartAction {
        self.action
    }

    pub fn outcome(&self) -> BindingOutcome {
        self.outcome
    }

    /// Binds the Escape key and closes the dialog
    pub fn assign_escape(&mut self, driver: &mut DriverContext<'_>) -> Result<(), DriverError> {
        self.bind(driver, Input::Keyboard { key: keys::ESCAPE })
    }

    /// Closes the dialog without touching the bindings
    pub fn cancel(&mut self, driver: &mut DriverContext<'_>) -> Result<(), DriverError> {
        if self.outcome.is_finished() {
            return Ok(());
        }
        self.outcome = BindingOutcome::Cancelled;
        info!("Rebinding of {} {:?} cancelled", self.player, self.action);
        driver.set_mode(DriverMode::Menu)
    }

    fn bind(&mut self, driver: &mut DriverContext<'_>, input: Input) -> Result<(), DriverError> {
        if self.outcome.is_finished() {
            return Ok(());
        }
        let displaced = driver
            .config_mut()
            .rebind(self.player, self.action, input)?;
        self.outcome = BindingOutcome::Bound {
            player: self.player,
            action: self.action,
            input,
            displaced,
        };
        driver.set_mode(DriverMode::Menu)
    }

    fn complete(&mut self, driver: &mut DriverContext<'_>) -> Result<(), DriverError> {
        let input = driver.sensed_input()?;
        self.bind(driver, input)
    }
}

impl InputHandler for KeyBindingDialog {
    fn handle(&mut self, action: GameAction, _value: i32, driver: &mut DriverContext<'_>) {
        let result = match action {
            GameAction::SenseComplete => self.complete(driver),
            GameAction::SenseCancel => self.cancel(driver),
            other => {
                debug!("Binding dialog ignores {:?}", other);
                Ok(())
            }
        };
        if let Err(e) = result {
            error!("Rebinding {} {:?} failed: {}", self.player, self.action, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputConfig;
    use crate::controller::scripted::ScriptedPlatform;
    use crate::driver::state::DriverState;

    struct Fixture {
        state: DriverState,
        platform: ScriptedPlatform,
        config: InputConfig,
    }

    impl Fixture {
        fn in_menu() -> Self {
            let mut fixture = Self {
                state: DriverState::new(),
                platform: ScriptedPlatform::new(Vec::new(), 480),
                config: InputConfig::default_config(),
            };
            fixture
                .state
                .set_mode(DriverMode::Menu, &mut fixture.platform, &fixture.config)
                .unwrap();
            fixture
        }

        fn context(&mut self) -> DriverContext<'_> {
            DriverContext::new(&mut self.state, &mut self.platform, &mut self.config)
        }
    }

    fn p(index: usize) -> PlayerId {
        PlayerId::new(index).unwrap()
    }

    #[test]
    fn sensed_input_is_bound_and_menu_restored() {
        let mut fixture = Fixture::in_menu();
        let mut ctx = fixture.context();
        let mut dialog = KeyBindingDialog::open(&mut ctx, p(0), KartAction::Fire).unwrap();
        assert!(ctx.is_in_mode(DriverMode::InputSense));

        let z = Input::Keyboard { key: 122 };
        ctx.state.record_sensed(z);
        dialog.handle(GameAction::SenseComplete, 0, &mut ctx);

        assert!(ctx.is_in_mode(DriverMode::Menu));
        assert_eq!(
            dialog.outcome(),
            BindingOutcome::Bound {
                player: p(0),
                action: KartAction::Fire,
                input: z,
                displaced: Some(Input::Keyboard { key: keys::SPACE }),
            }
        );
        assert_eq!(ctx.config().kart_binding(p(0), KartAction::Fire), Some(z));
    }

    #[test]
    fn cancel_leaves_bindings_alone() {
        let mut fixture = Fixture::in_menu();
        let before = fixture.config.clone();
        let mut ctx = fixture.context();
        let mut dialog = KeyBindingDialog::open(&mut ctx, p(1), KartAction::Jump).unwrap();

        dialog.handle(GameAction::SenseCancel, 32768, &mut ctx);
        assert_eq!(dialog.outcome(), BindingOutcome::Cancelled);
        assert!(ctx.is_in_mode(DriverMode::Menu));
        assert_eq!(*ctx.config(), before);

        // A second cancel is a no-op and must not attempt Menu -> Menu.
        assert!(dialog.cancel(&mut ctx).is_ok());
    }

    #[test]
    fn escape_is_assigned_explicitly() {
        let mut fixture = Fixture::in_menu();
        let mut ctx = fixture.context();
        let mut dialog = KeyBindingDialog::open(&mut ctx, p(2), KartAction::LookBack).unwrap();

        dialog.assign_escape(&mut ctx).unwrap();
        let escape = Input::Keyboard { key: keys::ESCAPE };
        assert_eq!(
            ctx.config().kart_binding(p(2), KartAction::LookBack),
            Some(escape)
        );
        assert!(ctx.is_in_mode(DriverMode::Menu));
    }

    #[test]
    fn open_rejects_unconfigured_player_and_wrong_mode() {
        let mut fixture = Fixture::in_menu();
        fixture.config.players.truncate(2);
        let mut ctx = fixture.context();
        assert!(matches!(
            KeyBindingDialog::open(&mut ctx, p(3), KartAction::Left),
            Err(DriverError::PlayerOutOfRange { index: 3, limit: 2 })
        ));
        assert!(ctx.is_in_mode(DriverMode::Menu));

        ctx.set_mode(DriverMode::InGame).unwrap();
        assert!(matches!(
            KeyBindingDialog::open(&mut ctx, p(0), KartAction::Left),
            Err(DriverError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn other_actions_are_ignored_while_pending() {
        let mut fixture = Fixture::in_menu();
        let mut ctx = fixture.context();
        let mut dialog = KeyBindingDialog::open(&mut ctx, p(0), KartAction::Left).unwrap();
        dialog.handle(GameAction::CursorDown, 32768, &mut ctx);
        assert_eq!(dialog.outcome(), BindingOutcome::Pending);
        assert!(ctx.is_in_mode(DriverMode::InputSense));
    }
}
