//! Queue-backed platform for replaying input without hardware
//!
//! The platform is a cheap handle: clones share one event queue and one view
//! of the pointer and text input state, so a caller can keep a clone after
//! moving the platform into the driver.

use crate::controller::event_collector::{HostRequests, Platform, PlatformEvent, StickDevice};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Default)]
struct ScriptState {
    queue: VecDeque<PlatformEvent>,
    sticks: Vec<StickDevice>,
    requests: HostRequests,
    surface_height: i32,
    shut_down: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ScriptedPlatform {
    state: Rc<RefCell<ScriptState>>,
}

impl ScriptedPlatform {
    pub fn new(sticks: Vec<StickDevice>, surface_height: i32) -> Self {
        Self {
            state: Rc::new(RefCell::new(ScriptState {
                sticks,
                surface_height,
                ..Default::default()
            })),
        }
    }

    pub fn push(&self, event: PlatformEvent) {
        self.state.borrow_mut().queue.push_back(event);
    }

    pub fn push_all(&self, events: impl IntoIterator<Item = PlatformEvent>) {
        self.state.borrow_mut().queue.extend(events);
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    pub fn requests(&self) -> HostRequests {
        self.state.borrow().requests
    }

    pub fn pointer_visible(&self) -> bool {
        self.requests().pointer_visible
    }

    pub fn text_input_enabled(&self) -> bool {
        self.requests().text_input
    }

    pub fn is_shut_down(&self) -> bool {
        self.state.borrow().shut_down
    }
}

impl Platform for ScriptedPlatform {
    fn poll_event(&mut self) -> Option<PlatformEvent> {
        self.state.borrow_mut().queue.pop_front()
    }

    fn sticks(&self) -> Vec<StickDevice> {
        self.state.borrow().sticks.clone()
    }

    fn set_pointer_visible(&mut self, visible: bool) {
        self.state.borrow_mut().requests.pointer_visible = visible;
    }

    fn set_text_input(&mut self, enabled: bool) {
        self.state.borrow_mut().requests.text_input = enabled;
    }

    fn surface_height(&self) -> i32 {
        self.state.borrow().surface_height
    }

    fn shutdown(&mut self) {
        let mut state = self.state.borrow_mut();
        state.queue.clear();
        state.shut_down = true;
    }
}
