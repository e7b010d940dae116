use crate::color::Rgba;
use serde::{Deserialize, Serialize};

/// Bounds for the grid cell size, in dots
pub const MIN_CELL_SIZE: f64 = 5.0;
pub const MAX_CELL_SIZE: f64 = 500.0;

/// Options recognised by the particle network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkOptions {
    /// Batch size generated on every (re)build (10-2000)
    pub number_of_particles: usize,
    /// Edge length of a grid cell, in dots
    pub grid_cell_size: f64,
    /// Radius within which particles connect to the pointer (0-600)
    pub mouse_connection_range: f64,
    pub particle_color: Rgba,
    pub background_color: Rgba,

    // === Particle generation ===
    /// Smallest particle radius (inclusive)
    pub particle_radius_min: f64,
    /// Largest particle radius (exclusive)
    pub particle_radius_max: f64,
    /// Connection range = radius * this
    pub range_multiplier: f64,
    /// Velocity components are drawn from [-max_speed, max_speed)
    pub max_speed: f64,

    /// Quiet period after the last resize before the network is rebuilt
    pub resize_debounce_ms: u64,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self {
            number_of_particles: 150,
            grid_cell_size: 50.0,
            mouse_connection_range: 150.0,
            particle_color: Rgba::WHITE,
            background_color: Rgba::BLACK,

            particle_radius_min: 1.0,
            particle_radius_max: 2.0,
            range_multiplier: 50.0,
            max_speed: 1.5,

            resize_debounce_ms: 300,
        }
    }
}

impl NetworkOptions {
    /// Adjust particle count within bounds
    pub fn adjust_number_of_particles(&mut self, delta: i32) {
        let new_val = (self.number_of_particles as i64 + delta as i64).clamp(10, 2000);
        self.number_of_particles = new_val as usize;
    }

    /// Adjust pointer connection range within bounds
    pub fn adjust_mouse_connection_range(&mut self, delta: f64) {
        self.mouse_connection_range = (self.mouse_connection_range + delta).clamp(0.0, 600.0);
    }

    /// Adjust cell size within bounds
    pub fn adjust_grid_cell_size(&mut self, delta: f64) {
        self.grid_cell_size = (self.grid_cell_size + delta).clamp(MIN_CELL_SIZE, MAX_CELL_SIZE);
    }

    pub fn set_colors(&mut self, particle_color: Rgba, background_color: Rgba) {
        self.particle_color = particle_color;
        self.background_color = background_color;
    }

    /// Reject values the grid or the particle generator cannot work with
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_CELL_SIZE..=MAX_CELL_SIZE).contains(&self.grid_cell_size) {
            return Err(format!(
                "grid cell size must be between {} and {}, got {}",
                MIN_CELL_SIZE, MAX_CELL_SIZE, self.grid_cell_size
            ));
        }
        if !(self.particle_radius_max > self.particle_radius_min) || self.particle_radius_min < 0.0 {
            return Err(format!(
                "particle radius range [{}, {}) is empty",
                self.particle_radius_min, self.particle_radius_max
            ));
        }
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return Err(format!("max speed must be positive, got {}", self.max_speed));
        }
        if !self.range_multiplier.is_finite() || self.range_multiplier <= 0.0 {
            return Err(format!("range multiplier must be positive, got {}", self.range_multiplier));
        }
        if !self.mouse_connection_range.is_finite() || self.mouse_connection_range < 0.0 {
            return Err(format!(
                "mouse connection range must be non-negative, got {}",
                self.mouse_connection_range
            ));
        }
        Ok(())
    }
}
