//! Input driver with statum lifecycle and the per-tick dispatch loop
//!
//! # Lifecycle
//!
//! ```text
//! Created ──init()──► Running ──shutdown()──► Stopped
//! ```
//!
//! # Dispatch
//!
//! ```text
//! Platform ──► PlatformEvent ──► normalize ──► (Input, value) ──► ActionMap ──► InputHandler
//!                                   │                                 ▲
//!                             StickRegistry                     sense slot
//!                          MouseAxisAccumulator               (InputSense)
//! ```
//!
//! Every call into a handler gets a [`DriverContext`], so a screen can switch
//! modes while it is being notified.

use crate::config::InputConfig;
use crate::controller::event_collector::{Platform, PlatformEvent};
use crate::controller::filter::sense_mouse_motion;
use crate::controller::sticks::{StickRecord, StickRegistry};
use crate::driver::handler::HandlerStack;
use crate::driver::mode::DriverMode;
use crate::driver::state::{DriverContext, DriverState};
use crate::error::DriverError;
use crate::mapping::action::GameAction;
use crate::mapping::input::{Input, MAX_VALUE};
use statum::{machine, state};
use tracing::{debug, error, info, warn};

/// Lifecycle of the input driver
#[state]
#[derive(Debug, Clone)]
pub enum DriverLifecycle {
    Created, // Configuration validated, no devices registered
    Running, // Sticks registered, dispatching in Menu or later modes
    Stopped, // Devices released
}

/// Outcome of one [`InputDriver::poll_and_dispatch`] tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Platform events drained this tick
    pub events: usize,
    /// The platform asked the application to quit
    pub quit_requested: bool,
}

/// Multiplexes keyboard, mouse and joystick input into game actions.
///
/// All processing happens on the caller's thread. A tick drains the platform
/// without blocking and returns once every pending event has been handled.
#[machine]
pub struct InputDriver<S: DriverLifecycle> {
    platform: Box<dyn Platform>,
    config: InputConfig,
    core: DriverState,
}

impl<S: DriverLifecycle> InputDriver<S> {
    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn mode(&self) -> DriverMode {
        self.core.mode()
    }

    pub fn is_in_mode(&self, mode: DriverMode) -> bool {
        self.core.is_in_mode(mode)
    }
}

impl InputDriver<Created> {
    pub fn create(platform: Box<dyn Platform>, config: InputConfig) -> Result<Self, DriverError> {
        config.validate().map_err(|e| {
            error!("Rejecting input configuration: {}", e);
            e
        })?;
        debug!(
            "Input driver created with {} player binding sets",
            config.players.len()
        );
        Ok(Self::new(platform, config, DriverState::new()))
    }

    /// Registers the connected sticks and enters Menu mode
    pub fn init(mut self) -> Result<InputDriver<Running>, DriverError> {
        let devices = self.platform.sticks();
        if devices.is_empty() {
            info!("No joysticks connected");
        }
        for device in devices {
            info!(
                "Joystick {} '{}' with {} axes",
                device.handle, device.name, device.axis_count
            );
            self.core.sticks_mut().attach(device);
        }

        self.core
            .set_mode(DriverMode::Menu, self.platform.as_mut(), &self.config)?;
        info!("Input driver running");
        Ok(self.transition())
    }
}

impl InputDriver<Running> {
    pub fn set_mode(&mut self, mode: DriverMode) -> Result<(), DriverError> {
        self.core
            .set_mode(mode, self.platform.as_mut(), &self.config)
    }

    /// Input recorded by the last completed sensing
    pub fn sensed_input(&self) -> Result<Input, DriverError> {
        self.core.sensed_input()
    }

    pub fn config_mut(&mut self) -> &mut InputConfig {
        &mut self.config
    }

    pub fn sticks(&self) -> &StickRegistry {
        self.core.sticks()
    }

    pub fn driver_state(&self) -> &DriverState {
        &self.core
    }

    /// Handler view of the driver, for work done outside a notification
    pub fn context(&mut self) -> DriverContext<'_> {
        DriverContext::new(&mut self.core, self.platform.as_mut(), &mut self.config)
    }

    /// Runs one tick: drains every pending platform event, then checks the
    /// mouse accumulator once.
    pub fn poll_and_dispatch(&mut self, handlers: &mut dyn HandlerStack) -> TickReport {
        let mut report = TickReport::default();
        while let Some(event) = self.platform.poll_event() {
            report.events += 1;
            if self.process_event(handlers, event) {
                report.quit_requested = true;
            }
        }

        let deadzone = self.config.sensitivity.mouse_deadzone;
        let signals = self.core.mouse_mut().evaluate(deadzone);
        for (axis, signal) in (0u8..).zip(signals) {
            if let Some(signal) = signal {
                let input = Input::MouseMotion {
                    axis,
                    direction: signal.direction,
                };
                self.dispatch(handlers, input, signal.value);
            }
        }

        report
    }

    /// Resolves `input` and notifies the current handler at most once.
    ///
    /// While sensing, the input is never delivered as its own action: Leave
    /// cancels the sensing, and the release of any input that is not fixed is
    /// recorded and completes it.
    pub fn dispatch(&mut self, handlers: &mut dyn HandlerStack, input: Input, value: i32) {
        let action = self.core.action_map().resolve(&input);

        if self.core.is_in_mode(DriverMode::InputSense) {
            if handlers.current_handler().is_none() {
                debug!("No handler while sensing, {} ignored", input);
                return;
            }
            if action == Some(GameAction::Leave) {
                self.notify(handlers, GameAction::SenseCancel, value);
            } else if value == 0 && !self.config.is_fixed_input(&input) {
                self.core.record_sensed(input);
                self.notify(handlers, GameAction::SenseComplete, 0);
            }
            return;
        }

        if let Some(action) = action {
            self.notify(handlers, action, value);
        }
    }

    fn notify(&mut self, handlers: &mut dyn HandlerStack, action: GameAction, value: i32) {
        match handlers.current_handler() {
            Some(handler) => {
                debug!("Delivering {:?} ({})", action, value);
                let mut context =
                    DriverContext::new(&mut self.core, self.platform.as_mut(), &mut self.config);
                handler.handle(action, value, &mut context);
            }
            None => debug!("No handler for {:?}, dropped", action),
        }
    }

    /// Returns true on a quit request
    fn process_event(&mut self, handlers: &mut dyn HandlerStack, event: PlatformEvent) -> bool {
        match event {
            PlatformEvent::Quit => {
                info!("Quit requested by platform");
                return true;
            }
            PlatformEvent::KeyDown { key, unicode } => {
                if self.core.is_in_mode(DriverMode::Lowlevel) {
                    if let Some(handler) = handlers.current_handler() {
                        let mut context = DriverContext::new(
                            &mut self.core,
                            self.platform.as_mut(),
                            &mut self.config,
                        );
                        handler.input_keyboard(key, unicode, &mut context);
                    }
                }
                self.dispatch(handlers, Input::Keyboard { key }, MAX_VALUE);
            }
            PlatformEvent::KeyUp { key } => {
                self.dispatch(handlers, Input::Keyboard { key }, 0);
            }
            PlatformEvent::MouseMotion { x, y, xrel, yrel } => {
                self.process_mouse_motion(handlers, x, y, xrel, yrel);
            }
            PlatformEvent::MouseButtonDown { button } => {
                self.dispatch(handlers, Input::MouseButton { button }, MAX_VALUE);
            }
            PlatformEvent::MouseButtonUp { button } => {
                self.dispatch(handlers, Input::MouseButton { button }, 0);
            }
            PlatformEvent::StickAxis { stick, axis, value } => {
                self.process_stick_axis(handlers, stick, axis, value);
            }
            PlatformEvent::StickButtonDown { stick, button } => {
                self.process_stick_button(handlers, stick, button, MAX_VALUE);
            }
            PlatformEvent::StickButtonUp { stick, button } => {
                self.process_stick_button(handlers, stick, button, 0);
            }
            PlatformEvent::StickAttached(device) => {
                info!("Joystick {} '{}' attached", device.handle, device.name);
                if let Some(replaced) = self.core.sticks_mut().attach(device) {
                    self.release_held_axes(handlers, &replaced);
                }
            }
            PlatformEvent::StickDetached { stick } => match self.core.sticks_mut().detach(stick) {
                Some(record) => self.release_held_axes(handlers, &record),
                None => warn!("Detach of unknown joystick {}", stick),
            },
            PlatformEvent::Timer => {
                if let Some(handler) = handlers.current_handler() {
                    handler.countdown();
                }
            }
        }
        false
    }

    fn process_mouse_motion(
        &mut self,
        handlers: &mut dyn HandlerStack,
        x: i32,
        y: i32,
        xrel: i32,
        yrel: i32,
    ) {
        match self.core.mode() {
            DriverMode::Menu => {
                // Handlers expect the origin at the bottom left
                let flipped = self.platform.surface_height() - y;
                if let Some(handler) = handlers.current_handler() {
                    handler.input_pointer(x, flipped);
                }
            }
            DriverMode::InputSense => {
                let deadzone = self.config.sensitivity.mouse_sense_deadzone;
                let directions = sense_mouse_motion(xrel, yrel, deadzone);
                for (axis, direction) in (0u8..).zip(directions) {
                    if let Some(direction) = direction {
                        self.dispatch(handlers, Input::MouseMotion { axis, direction }, 0);
                    }
                }
            }
            _ => {
                let multiplier = self.config.sensitivity.mouse_multiplier;
                self.core.mouse_mut().accumulate(xrel, yrel, multiplier);
            }
        }
    }

    fn process_stick_axis(
        &mut self,
        handlers: &mut dyn HandlerStack,
        stick: u32,
        axis: u32,
        value: i32,
    ) {
        let deadzone = self.config.sensitivity.joystick_deadzone;
        let signals = match self.core.sticks_mut().get_mut(stick) {
            Some(record) => record.filter_axis(axis, value, deadzone),
            None => {
                warn!("Axis event from unregistered joystick {}, dropped", stick);
                return;
            }
        };

        let id = self.stick_id(stick);
        for signal in signals {
            let input = Input::StickMotion {
                stick: id,
                axis,
                direction: signal.direction,
            };
            self.dispatch(handlers, input, signal.value);
        }
    }

    fn process_stick_button(
        &mut self,
        handlers: &mut dyn HandlerStack,
        stick: u32,
        button: u32,
        value: i32,
    ) {
        if self.core.sticks().get(stick).is_none() {
            warn!("Button event from unregistered joystick {}, dropped", stick);
            return;
        }
        let stick = self.stick_id(stick);
        self.dispatch(handlers, Input::StickButton { stick, button }, value);
    }

    /// Releases every axis a dropped or replaced record still holds
    fn release_held_axes(&mut self, handlers: &mut dyn HandlerStack, record: &StickRecord) {
        let id = self.stick_id(record.handle());
        for (axis, direction) in record.held_axes() {
            debug!("Releasing axis {} of '{}'", axis, record.name());
            let input = Input::StickMotion {
                stick: id,
                axis,
                direction,
            };
            self.dispatch(handlers, input, 0);
        }
    }

    /// Every stick acts as the first one in menu mode
    fn stick_id(&self, stick: u32) -> u32 {
        if self.core.is_in_mode(DriverMode::Menu) {
            0
        } else {
            stick
        }
    }

    /// Releases every device and the platform
    pub fn shutdown(mut self) -> InputDriver<Stopped> {
        info!(
            "Shutting down input driver in {} mode",
            self.core.mode()
        );
        self.core.sticks_mut().clear();
        self.platform.shutdown();
        self.transition()
    }
}

impl InputDriver<Stopped> {
    /// Hands back the configuration, including bindings changed at runtime
    pub fn into_config(self) -> InputConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::event_collector::StickDevice;
    use crate::controller::scripted::ScriptedPlatform;

    fn stick(handle: u32) -> StickDevice {
        StickDevice {
            handle,
            name: format!("pad {}", handle),
            axis_count: 2,
        }
    }

    #[test]
    fn init_registers_sticks_and_enters_menu() {
        let platform = ScriptedPlatform::new(vec![stick(3), stick(7)], 480);
        let driver = InputDriver::create(Box::new(platform), InputConfig::default_config())
            .unwrap()
            .init()
            .unwrap();

        assert!(driver.is_in_mode(DriverMode::Menu));
        assert_eq!(driver.sticks().len(), 2);
        assert!(driver.sticks().get(7).is_some());
        assert_eq!(driver.driver_state().action_map().name(), "menu");
    }

    #[test]
    fn init_without_sticks_is_fine() {
        let platform = ScriptedPlatform::new(Vec::new(), 480);
        let driver = InputDriver::create(Box::new(platform), InputConfig::default_config())
            .unwrap()
            .init()
            .unwrap();
        assert!(driver.sticks().is_empty());
    }

    #[test]
    fn create_rejects_invalid_configuration() {
        let mut config = InputConfig::default_config();
        config.sensitivity.joystick_deadzone = 0;
        let platform = ScriptedPlatform::new(Vec::new(), 480);
        let result = InputDriver::create(Box::new(platform), config);
        assert!(matches!(result, Err(DriverError::Config(_))));
    }

    #[test]
    fn shutdown_releases_platform() {
        let platform = ScriptedPlatform::new(vec![stick(0)], 480);
        let script = platform.clone();
        let mut driver = InputDriver::create(Box::new(platform), InputConfig::default_config())
            .unwrap()
            .init()
            .unwrap();
        driver.set_mode(DriverMode::InGame).unwrap();

        let stopped = driver.shutdown();
        assert!(script.is_shut_down());
        assert_eq!(stopped.mode(), DriverMode::InGame);
        assert_eq!(stopped.into_config(), InputConfig::default_config());
    }
}
