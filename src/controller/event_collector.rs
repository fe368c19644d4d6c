use crate::error::DriverError;
use gilrs::{Axis, Button, Event, EventType, GamepadId, Gilrs};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Number of axis slots a gilrs gamepad is registered with
pub const GILRS_AXIS_COUNT: usize = 8;

/// Raw event as delivered by the platform, before any filtering
#[derive(Clone, Debug, PartialEq)]
pub enum PlatformEvent {
    Quit,
    KeyDown { key: i32, unicode: u32 },
    KeyUp { key: i32 },
    MouseMotion { x: i32, y: i32, xrel: i32, yrel: i32 },
    MouseButtonDown { button: u8 },
    MouseButtonUp { button: u8 },
    StickAxis { stick: u32, axis: u32, value: i32 },
    StickButtonDown { stick: u32, button: u32 },
    StickButtonUp { stick: u32, button: u32 },
    StickAttached(StickDevice),
    StickDetached { stick: u32 },
    /// Reserved timer tick, forwarded to the current handler as a countdown
    Timer,
}

/// Joystick found during enumeration or hot-plug
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StickDevice {
    pub handle: u32,
    pub name: String,
    pub axis_count: usize,
}

/// Event source and pointer/text controls of the windowing layer
pub trait Platform {
    /// Next pending event, never blocks
    fn poll_event(&mut self) -> Option<PlatformEvent>;

    /// Joysticks connected right now
    fn sticks(&self) -> Vec<StickDevice>;

    fn set_pointer_visible(&mut self, visible: bool);

    /// Enables unicode decoding of key presses
    fn set_text_input(&mut self, enabled: bool);

    /// Height of the drawing surface, used to flip pointer coordinates
    fn surface_height(&self) -> i32;

    fn shutdown(&mut self) {}
}

/// Requests the driver makes to the windowing host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostRequests {
    pub pointer_visible: bool,
    pub text_input: bool,
}

impl Default for HostRequests {
    fn default() -> Self {
        Self {
            pointer_visible: true,
            text_input: false,
        }
    }
}

/// Messages from the windowing host to [`GilrsPlatform`]
#[derive(Clone, Debug)]
pub enum HostEvent {
    Input(PlatformEvent),
    Resized { width: i32, height: i32 },
}

/// Host side of a [`GilrsPlatform`].
///
/// The windowing layer forwards keyboard and mouse events through it and
/// watches the pointer and text input requests coming back from the driver.
pub struct HostLink {
    events: mpsc::UnboundedSender<HostEvent>,
    requests: watch::Receiver<HostRequests>,
}

impl HostLink {
    pub fn send(&self, event: PlatformEvent) -> Result<(), DriverError> {
        self.events
            .send(HostEvent::Input(event))
            .map_err(|e| DriverError::Platform(format!("Input platform is gone: {}", e)))
    }

    pub fn resize(&self, width: i32, height: i32) -> Result<(), DriverError> {
        self.events
            .send(HostEvent::Resized { width, height })
            .map_err(|e| DriverError::Platform(format!("Input platform is gone: {}", e)))
    }

    /// Current requests, marking them as seen
    pub fn requests(&mut self) -> HostRequests {
        *self.requests.borrow_and_update()
    }

    /// Whether the requests changed since they were last read
    pub fn has_changed(&self) -> bool {
        self.requests.has_changed().unwrap_or(false)
    }
}

/// Platform backed by gilrs for joysticks and a host channel for keyboard
/// and mouse
pub struct GilrsPlatform {
    gilrs: Gilrs,
    host_events: mpsc::UnboundedReceiver<HostEvent>,
    requests: watch::Sender<HostRequests>,
    surface_height: i32,
}

impl GilrsPlatform {
    pub fn new(surface_height: i32) -> Result<(Self, HostLink), DriverError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(DriverError::Platform(e.to_string()));
            }
        };

        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        let (request_sender, request_receiver) = watch::channel(HostRequests::default());
        debug!("Created host event channel and request watch");

        let platform = Self {
            gilrs,
            host_events: event_receiver,
            requests: request_sender,
            surface_height,
        };
        let link = HostLink {
            events: event_sender,
            requests: request_receiver,
        };
        Ok((platform, link))
    }

    fn describe(&self, id: GamepadId) -> StickDevice {
        StickDevice {
            handle: stick_handle(id),
            name: self.gilrs.gamepad(id).name().to_string(),
            axis_count: GILRS_AXIS_COUNT,
        }
    }

    fn next_host_event(&mut self) -> Option<PlatformEvent> {
        loop {
            match self.host_events.try_recv() {
                Ok(HostEvent::Input(event)) => return Some(event),
                Ok(HostEvent::Resized { width, height }) => {
                    debug!("Surface resized to {}x{}", width, height);
                    self.surface_height = height;
                }
                Err(mpsc::error::TryRecvError::Empty) => return None,
                Err(mpsc::error::TryRecvError::Disconnected) => return None,
            }
        }
    }

    fn convert_gilrs_event(&self, id: GamepadId, event: EventType) -> Option<PlatformEvent> {
        let stick = stick_handle(id);
        match event {
            EventType::AxisChanged(axis, value, _) => match map_axis(axis) {
                Some((index, flip)) => Some(PlatformEvent::StickAxis {
                    stick,
                    axis: index,
                    value: scale_axis(value, flip),
                }),
                None => {
                    debug!("Ignoring unsupported axis: {:?}", axis);
                    None
                }
            },
            EventType::ButtonPressed(button, _) => map_button(button)
                .map(|button| PlatformEvent::StickButtonDown { stick, button }),
            EventType::ButtonReleased(button, _) => {
                map_button(button).map(|button| PlatformEvent::StickButtonUp { stick, button })
            }
            EventType::Connected => {
                info!("Controller connected event detected");
                Some(PlatformEvent::StickAttached(self.describe(id)))
            }
            EventType::Disconnected => {
                warn!("Controller disconnected event detected");
                Some(PlatformEvent::StickDetached { stick })
            }
            _ => {
                debug!("Unhandled event type: {:?}", event);
                None
            }
        }
    }

    fn publish(&self, update: impl FnOnce(&mut HostRequests)) {
        self.requests.send_modify(update);
    }
}

impl Platform for GilrsPlatform {
    fn poll_event(&mut self) -> Option<PlatformEvent> {
        if let Some(event) = self.next_host_event() {
            return Some(event);
        }

        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            if let Some(converted) = self.convert_gilrs_event(id, event) {
                return Some(converted);
            }
        }
        None
    }

    fn sticks(&self) -> Vec<StickDevice> {
        self.gilrs
            .gamepads()
            .map(|(id, _)| self.describe(id))
            .collect()
    }

    fn set_pointer_visible(&mut self, visible: bool) {
        debug!("Pointer visible: {}", visible);
        self.publish(|requests| requests.pointer_visible = visible);
    }

    fn set_text_input(&mut self, enabled: bool) {
        debug!("Text input: {}", enabled);
        self.publish(|requests| requests.text_input = enabled);
    }

    fn surface_height(&self) -> i32 {
        self.surface_height
    }

    fn shutdown(&mut self) {
        info!("Closing gilrs controller interface");
        self.host_events.close();
    }
}

fn stick_handle(id: GamepadId) -> u32 {
    usize::from(id) as u32
}

// Axis slot and whether the value is flipped so that down/right is positive
fn map_axis(axis: Axis) -> Option<(u32, bool)> {
    match axis {
        Axis::LeftStickX => Some((0, false)),
        Axis::LeftStickY => Some((1, true)),
        Axis::LeftZ => Some((2, false)),
        Axis::RightStickX => Some((3, false)),
        Axis::RightStickY => Some((4, true)),
        Axis::RightZ => Some((5, false)),
        Axis::DPadX => Some((6, false)),
        Axis::DPadY => Some((7, true)),
        _ => None,
    }
}

fn map_button(button: Button) -> Option<u32> {
    match button {
        Button::South => Some(0),
        Button::East => Some(1),
        Button::West => Some(2),
        Button::North => Some(3),
        Button::LeftTrigger => Some(4),
        Button::RightTrigger => Some(5),
        Button::LeftTrigger2 => Some(6),
        Button::RightTrigger2 => Some(7),
        Button::Select => Some(8),
        Button::Start => Some(9),
        Button::Mode => Some(10),
        Button::LeftThumb => Some(11),
        Button::RightThumb => Some(12),
        Button::DPadUp => Some(13),
        Button::DPadDown => Some(14),
        Button::DPadLeft => Some(15),
        Button::DPadRight => Some(16),
        _ => None,
    }
}

// gilrs reports [-1.0, 1.0]
fn scale_axis(value: f32, flip: bool) -> i32 {
    let scaled = (value.clamp(-1.0, 1.0) * 32767.0).round() as i32;
    if flip {
        -scaled
    } else {
        scaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_scaling_covers_full_range() {
        assert_eq!(scale_axis(1.0, false), 32767);
        assert_eq!(scale_axis(-1.0, false), -32767);
        assert_eq!(scale_axis(0.5, true), -16384);
        assert_eq!(scale_axis(3.0, false), 32767);
    }

    #[test]
    fn stick_y_axes_are_flipped() {
        assert_eq!(map_axis(Axis::LeftStickY), Some((1, true)));
        assert_eq!(map_axis(Axis::RightStickX), Some((3, false)));
        assert_eq!(map_axis(Axis::Unknown), None);
    }

    #[test]
    fn buttons_get_stable_indices() {
        assert_eq!(map_button(Button::South), Some(0));
        assert_eq!(map_button(Button::DPadRight), Some(16));
        assert_eq!(map_button(Button::Unknown), None);
    }
}
