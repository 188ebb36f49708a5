//! Infrastructure layer providing system-level services.
//!
//! This module contains the wall-clock timer driver behind the question
//! countdown and the tracing setup.

pub mod timer;
pub mod logging;

pub use timer::*;
pub use logging::*;
