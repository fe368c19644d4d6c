//! Platform input subsystem
//!
//! Implements the device-facing half of the driver:
//!
//! 1. [`event_collector`] - Platform abstraction and the gilrs backend
//! 2. [`filter`] - Deadzone and edge filtering of analog samples
//! 3. [`sticks`] - Registry of connected joysticks
//! 4. [`scripted`] - Queue-backed platform for replay and tests
//!
//! # Architecture
//!
//! ```text
//! gilrs / host ──► Platform ──► PlatformEvent ──► filter ──► (Input, value)
//!                                                  ▲
//!                                            StickRegistry
//! ```

pub mod event_collector;
pub mod filter;
pub mod scripted;
pub mod sticks;

pub use event_collector::{
    GilrsPlatform, HostEvent, HostLink, HostRequests, Platform, PlatformEvent, StickDevice,
};
pub use filter::{AxisSignal, MouseAxisAccumulator};
pub use scripted::ScriptedPlatform;
pub use sticks::{StickRecord, StickRegistry};
