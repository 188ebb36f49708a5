//! Application layer managing state and the quiz workflow.
//!
//! This module coordinates between the quiz controller, the timers that
//! drive it and the presentation layer.

pub mod state;

pub use state::*;
