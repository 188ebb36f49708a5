//! Pokequiz - Terminal Trivia Library
//!
//! A timed multiple-choice Pokémon quiz for the terminal, built in Rust.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
