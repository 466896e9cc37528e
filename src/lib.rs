//! Games and patterns for a 32x32 RGB LED panel.
//!
//! Everything here is host independent: cores take elapsed time and input,
//! and hand back [`display::RenderCommands`].

pub mod clock;
pub mod components;
pub mod config;
pub mod display;
pub mod error;
pub mod game;
pub mod ghost;
pub mod input;
pub mod level;
pub mod mode;
pub mod palette;
pub mod player;
pub mod smoke;

/// Panel edge length in LEDs.
pub const PANEL_SIZE: usize = 32;
