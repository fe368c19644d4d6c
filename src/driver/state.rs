//! Mutable driver state and the context handed to handlers

use crate::config::InputConfig;
use crate::controller::event_collector::Platform;
use crate::controller::filter::MouseAxisAccumulator;
use crate::controller::sticks::StickRegistry;
use crate::driver::mode::{plan_transition, DriverMode, ModeEffect};
use crate::error::DriverError;
use crate::mapping::action_map::ActionMap;
use crate::mapping::input::Input;
use tracing::{debug, error, info};

/// Storage for the input recorded while sensing
#[derive(Clone, Debug, Default)]
struct SenseSlot {
    recorded: Option<Input>,
}

/// Everything the driver mutates while processing input.
///
/// The sense slot exists exactly while the mode is [`DriverMode::InputSense`];
/// mode switches go through the transition table only.
#[derive(Debug)]
pub struct DriverState {
    mode: DriverMode,
    action_map: ActionMap,
    mouse: MouseAxisAccumulator,
    sense_slot: Option<SenseSlot>,
    sticks: StickRegistry,
}

impl Default for DriverState {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverState {
    pub fn new() -> Self {
        Self {
            mode: DriverMode::Bootstrap,
            action_map: ActionMap::new("none"),
            mouse: MouseAxisAccumulator::default(),
            sense_slot: None,
            sticks: StickRegistry::default(),
        }
    }

    pub fn mode(&self) -> DriverMode {
        self.mode
    }

    pub fn is_in_mode(&self, mode: DriverMode) -> bool {
        self.mode == mode
    }

    pub fn action_map(&self) -> &ActionMap {
        &self.action_map
    }

    pub fn mouse(&self) -> &MouseAxisAccumulator {
        &self.mouse
    }

    pub(crate) fn mouse_mut(&mut self) -> &mut MouseAxisAccumulator {
        &mut self.mouse
    }

    pub fn sticks(&self) -> &StickRegistry {
        &self.sticks
    }

    pub(crate) fn sticks_mut(&mut self) -> &mut StickRegistry {
        &mut self.sticks
    }

    /// Input recorded by the last completed sensing.
    ///
    /// Only meaningful right after a `SenseComplete` notification.
    pub fn sensed_input(&self) -> Result<Input, DriverError> {
        if self.mode != DriverMode::InputSense {
            error!("Sensed input requested in {} mode", self.mode);
            return Err(DriverError::NotSensing(self.mode));
        }
        match &self.sense_slot {
            Some(slot) => slot.recorded.ok_or(DriverError::NothingSensed),
            None => Err(DriverError::NotSensing(self.mode)),
        }
    }

    pub(crate) fn record_sensed(&mut self, input: Input) {
        if let Some(slot) = self.sense_slot.as_mut() {
            debug!("Sensed {}", input);
            slot.recorded = Some(input);
        }
    }

    /// Switches to `target`, applying the exit and entry effects of the
    /// transition. Illegal transitions leave the state untouched.
    pub fn set_mode(
        &mut self,
        target: DriverMode,
        platform: &mut dyn Platform,
        config: &InputConfig,
    ) -> Result<(), DriverError> {
        let plan = plan_transition(self.mode, target).map_err(|e| {
            error!("{}", e);
            e
        })?;

        for effect in plan.exit.iter().copied() {
            self.apply(effect, platform, config);
        }
        self.mode = target;
        for effect in plan.entry.iter().copied() {
            self.apply(effect, platform, config);
        }
        info!("Input driver mode: {} -> {}", plan.from, plan.to);
        Ok(())
    }

    fn apply(&mut self, effect: ModeEffect, platform: &mut dyn Platform, config: &InputConfig) {
        debug!("Applying {:?}", effect);
        match effect {
            ModeEffect::InstallMenuMap => self.action_map = config.menu_action_map(),
            ModeEffect::InstallInGameMap => self.action_map = config.ingame_action_map(),
            ModeEffect::ShowPointer => platform.set_pointer_visible(true),
            ModeEffect::HidePointer => platform.set_pointer_visible(false),
            ModeEffect::ResetMouse => self.mouse.reset(),
            ModeEffect::OpenSenseSlot => self.sense_slot = Some(SenseSlot::default()),
            ModeEffect::CloseSenseSlot => self.sense_slot = None,
            ModeEffect::EnableTextInput => platform.set_text_input(true),
            ModeEffect::DisableTextInput => platform.set_text_input(false),
        }
    }
}

/// Driver access for handlers.
///
/// Handed to [`InputHandler`](crate::driver::handler::InputHandler) callbacks
/// so a handler can switch modes or read sensed input while the driver is
/// dispatching. A mode switch made here affects the next event, not the one
/// being handled.
pub struct DriverContext<'a> {
    pub(crate) state: &'a mut DriverState,
    platform: &'a mut dyn Platform,
    config: &'a mut InputConfig,
}

impl<'a> DriverContext<'a> {
    pub(crate) fn new(
        state: &'a mut DriverState,
        platform: &'a mut dyn Platform,
        config: &'a mut InputConfig,
    ) -> Self {
        Self {
            state,
            platform,
            config,
        }
    }

    pub fn mode(&self) -> DriverMode {
        self.state.mode()
    }

    pub fn is_in_mode(&self, mode: DriverMode) -> bool {
        self.state.is_in_mode(mode)
    }

    pub fn set_mode(&mut self, mode: DriverMode) -> Result<(), DriverError> {
        self.state.set_mode(mode, &mut *self.platform, &*self.config)
    }

    pub fn sensed_input(&self) -> Result<Input, DriverError> {
        self.state.sensed_input()
    }

    pub fn config(&self) -> &InputConfig {
        &*self.config
    }

    /// Binding changes take effect the next time their mode's map is installed
    pub fn config_mut(&mut self) -> &mut InputConfig {
        &mut *self.config
    }
}
