//! Animated particle network for the terminal.
//!
//! Particles drift across a plane measured in Braille dots and are joined
//! by lines that fade with distance. Neighbour lookups go through a uniform
//! spatial [`grid::Grid`] so each particle only inspects nearby cells.

pub mod app;
pub mod braille;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod logging;
pub mod network;
pub mod particle;
pub mod renderer;
pub mod settings;
pub mod ui;
