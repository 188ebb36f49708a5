//! Presentation layer handling terminal UI and user input.
//!
//! This module renders the quiz screens with ratatui and maps keyboard
//! input onto quiz actions.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
