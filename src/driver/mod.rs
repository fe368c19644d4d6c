//! Input driver: modes, dispatch and the handler interface
//!
//! 1. [`mode`] - Driver modes and their transition table
//! 2. [`state`] - Mutable driver state and the handler context
//! 3. [`handler`] - Interfaces implemented by the screen layer
//! 4. [`input_driver`] - Lifecycle and per-tick dispatch loop
//!
//! # Modes
//!
//! ```text
//!                 ┌──► InGame ─────┐
//! Bootstrap ──► Menu ──► InputSense ─┤
//!                 ▲└──► Lowlevel ───┤
//!                 └─────────────────┘
//! ```

pub mod handler;
pub mod input_driver;
pub mod mode;
pub mod state;

pub use handler::{HandlerStack, InputHandler};
pub use input_driver::{Created, DriverLifecycle, InputDriver, Running, Stopped, TickReport};
pub use mode::{plan_transition, DriverMode, ModeEffect, TransitionPlan};
pub use state::{DriverContext, DriverState};
