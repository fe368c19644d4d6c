//! Capability interfaces of the screen layer the driver delivers to

use crate::driver::state::DriverContext;
use crate::mapping::action::GameAction;

/// Whatever screen, dialog or race view is currently receiving input
pub trait InputHandler {
    /// Resolved action with its value in `[0, MAX_VALUE]`, 0 meaning release
    fn handle(&mut self, action: GameAction, value: i32, driver: &mut DriverContext<'_>);

    /// Absolute pointer position with the origin at the bottom left, menu mode only
    fn input_pointer(&mut self, _x: i32, _y: i32) {}

    /// Raw key press in lowlevel mode, delivered before the press is
    /// dispatched as an action
    fn input_keyboard(&mut self, _key: i32, _unicode: u32, _driver: &mut DriverContext<'_>) {}

    /// Reserved platform timer tick
    fn countdown(&mut self) {}
}

/// Source of the currently active handler
pub trait HandlerStack {
    fn current_handler(&mut self) -> Option<&mut dyn InputHandler>;
}
