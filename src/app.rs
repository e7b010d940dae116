use crate::braille::{self, BrailleSurface};
use crate::config::AppConfig;
use crate::error::SimulationError;
use crate::network::{NetworkEvent, ParticleNetwork, TickOutcome};
use crate::settings::NetworkOptions;
use crate::ui;
use log::info;
use ratatui::layout::Rect;
use std::time::Instant;

/// Focus state for parameter editing in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    #[default]
    None,
    CellSize,
    MouseRange,
    Particles,
    // Controls box (not a param)
    Controls,
}

impl Focus {
    /// Tab cycles through parameters
    pub fn next(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::CellSize,
            Focus::CellSize => Focus::MouseRange,
            Focus::MouseRange => Focus::Particles,
            Focus::Particles => Focus::Controls,
        }
    }

    pub fn prev(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Particles,
            Focus::CellSize => Focus::Controls,
            Focus::MouseRange => Focus::CellSize,
            Focus::Particles => Focus::MouseRange,
        }
    }

    /// Check if focus is on a parameter (not Controls or None)
    pub fn is_param(&self) -> bool {
        !matches!(self, Focus::None | Focus::Controls)
    }
}

/// Main application state
pub struct App {
    pub network: ParticleNetwork,
    pub surface: BrailleSurface,
    pub focus: Focus,
    pub fullscreen_mode: bool,
    pub show_help: bool,
    pub help_scroll: u16,
    pub fps: u32,
    /// Terminal area the particles are drawn into (inside the canvas border)
    pub canvas_area: Rect,
    pub last_outcome: TickOutcome,
    pub frames: u64,
    terminal_area: Rect,
}

impl App {
    pub fn new(
        terminal_area: Rect,
        options: NetworkOptions,
        fps: u32,
        seed: Option<u64>,
    ) -> Result<Self, SimulationError> {
        let canvas_area = ui::get_canvas_area(terminal_area, false);
        let (width, height) = braille::calculate_plane_size(canvas_area.width, canvas_area.height);
        let network = match seed {
            Some(seed) => ParticleNetwork::with_seed(width, height, options, seed)?,
            None => ParticleNetwork::new(width, height, options)?,
        };

        Ok(Self {
            network,
            surface: BrailleSurface::new(canvas_area.width, canvas_area.height),
            focus: Focus::Controls,
            fullscreen_mode: false,
            show_help: false,
            help_scroll: 0,
            fps,
            canvas_area,
            last_outcome: TickOutcome::Suspended,
            frames: 0,
            terminal_area,
        })
    }

    /// Run one frame of the network onto the surface
    pub fn tick(&mut self, now: Instant) -> Result<(), SimulationError> {
        self.last_outcome = self.network.tick(&mut self.surface, now)?;
        if !matches!(self.last_outcome, TickOutcome::Suspended) {
            self.frames += 1;
        }
        Ok(())
    }

    /// The terminal changed size
    pub fn resize_terminal(&mut self, width: u16, height: u16, now: Instant) {
        self.terminal_area = Rect {
            x: 0,
            y: 0,
            width,
            height,
        };
        self.relayout(now);
    }

    fn relayout(&mut self, now: Instant) {
        let canvas_area = ui::get_canvas_area(self.terminal_area, self.fullscreen_mode);
        if canvas_area == self.canvas_area {
            return;
        }
        self.canvas_area = canvas_area;
        self.surface.resize(canvas_area.width, canvas_area.height);
        let (width, height) = braille::calculate_plane_size(canvas_area.width, canvas_area.height);
        self.network.handle_event(NetworkEvent::Resized { width, height }, now);
    }

    /// Mouse moved to a terminal cell; only positions over the canvas count
    pub fn pointer_moved(&mut self, column: u16, row: u16, now: Instant) {
        let area = self.canvas_area;
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        let event = if inside {
            NetworkEvent::PointerMoved(braille::cell_center(column - area.x, row - area.y))
        } else {
            NetworkEvent::PointerLeft
        };
        self.network.handle_event(event, now);
    }

    pub fn pointer_left(&mut self, now: Instant) {
        self.network.handle_event(NetworkEvent::PointerLeft, now);
    }

    /// Status label for the sidebar
    pub fn status(&self) -> &'static str {
        if self.network.is_rebuilding() {
            "REBUILDING"
        } else if self.network.grid().is_none() {
            "STOPPED"
        } else if self.network.is_paused() {
            "PAUSED"
        } else {
            "RUNNING"
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_up(&mut self) -> Result<(), SimulationError> {
        match self.focus {
            Focus::None | Focus::Controls => Ok(()),
            Focus::CellSize => self.adjust_cell_size(5.0),
            Focus::MouseRange => {
                self.adjust_mouse_range(10.0);
                Ok(())
            }
            Focus::Particles => self.adjust_particles(10),
        }
    }

    pub fn adjust_focused_down(&mut self) -> Result<(), SimulationError> {
        match self.focus {
            Focus::None | Focus::Controls => Ok(()),
            Focus::CellSize => self.adjust_cell_size(-5.0),
            Focus::MouseRange => {
                self.adjust_mouse_range(-10.0);
                Ok(())
            }
            Focus::Particles => self.adjust_particles(-10),
        }
    }

    /// Navigate to next parameter (Tab)
    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Navigate to previous parameter (Shift+Tab)
    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn toggle_pause(&mut self) {
        self.network.toggle_pause();
    }

    /// New particle batch at the current size
    pub fn regenerate(&mut self) -> Result<(), SimulationError> {
        info!("regenerating {} particles", self.network.options().number_of_particles);
        self.network.regenerate()
    }

    /// Change particle count; takes effect immediately
    pub fn adjust_particles(&mut self, delta: i32) -> Result<(), SimulationError> {
        self.network.options_mut().adjust_number_of_particles(delta);
        self.focus = Focus::Particles;
        self.network.regenerate()
    }

    /// Cell size only matters when the grid is built, so rebuild
    pub fn adjust_cell_size(&mut self, delta: f64) -> Result<(), SimulationError> {
        self.network.options_mut().adjust_grid_cell_size(delta);
        self.focus = Focus::CellSize;
        self.network.regenerate()
    }

    pub fn adjust_mouse_range(&mut self, delta: f64) {
        self.network.options_mut().adjust_mouse_connection_range(delta);
        self.focus = Focus::MouseRange;
    }

    pub fn toggle_fullscreen(&mut self, now: Instant) {
        self.fullscreen_mode = !self.fullscreen_mode;
        self.relayout(now);
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Snapshot of the current settings, for export
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            options: self.network.options().clone(),
            fps: self.fps,
            ..AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn terminal(width: u16, height: u16) -> Rect {
        Rect {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    fn app() -> App {
        App::new(terminal(120, 40), NetworkOptions::default(), 60, Some(9)).unwrap()
    }

    #[test]
    fn test_new_sizes_plane_to_canvas() {
        let app = app();
        let area = app.canvas_area;
        assert_eq!(
            app.network.plane(),
            braille::calculate_plane_size(area.width, area.height)
        );
        assert_eq!(app.surface.dot_width(), area.width as usize * 2);
        assert_eq!(app.network.particles().len(), 150);
    }

    #[test]
    fn test_pointer_mapping() {
        let mut app = app();
        let now = Instant::now();
        let area = app.canvas_area;

        app.pointer_moved(area.x + 3, area.y + 2, now);
        assert_eq!(app.network.pointer(), Some(braille::cell_center(3, 2)));

        // Over the sidebar
        app.pointer_moved(0, area.y, now);
        assert_eq!(app.network.pointer(), None);

        app.pointer_moved(area.x, area.y, now);
        app.pointer_left(now);
        assert_eq!(app.network.pointer(), None);
    }

    #[test]
    fn test_terminal_resize_goes_through_debounce() {
        let mut app = app();
        let t0 = Instant::now();
        app.resize_terminal(100, 30, t0);
        assert_eq!(app.status(), "REBUILDING");

        app.tick(t0 + Duration::from_millis(10)).unwrap();
        assert_eq!(app.last_outcome, TickOutcome::Suspended);
        assert_eq!(app.frames, 0);

        app.tick(t0 + Duration::from_millis(300)).unwrap();
        assert_eq!(app.status(), "RUNNING");
        assert_eq!(app.frames, 1);
        let area = app.canvas_area;
        assert_eq!(
            app.network.plane(),
            braille::calculate_plane_size(area.width, area.height)
        );
    }

    #[test]
    fn test_same_size_resize_is_ignored() {
        let mut app = app();
        app.resize_terminal(120, 40, Instant::now());
        assert!(!app.network.is_rebuilding());
    }

    #[test]
    fn test_adjust_particles_regenerates() {
        let mut app = app();
        app.adjust_particles(-100).unwrap();
        assert_eq!(app.network.particles().len(), 50);
        assert_eq!(app.focus, Focus::Particles);

        app.focus = Focus::MouseRange;
        app.adjust_focused_up().unwrap();
        assert_eq!(app.network.options().mouse_connection_range, 160.0);
    }

    #[test]
    fn test_to_config_reflects_adjustments() {
        let mut app = app();
        app.adjust_mouse_range(-50.0);
        app.adjust_particles(20).unwrap();

        let config = app.to_config();
        assert_eq!(config.version, 1);
        assert_eq!(config.fps, 60);
        assert_eq!(config.options.mouse_connection_range, 100.0);
        assert_eq!(config.options.number_of_particles, 170);
    }

    #[test]
    fn test_focus_cycle() {
        let mut focus = Focus::Controls;
        for _ in 0..4 {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Controls);
        assert_eq!(Focus::CellSize.prev(), Focus::Controls);
        assert!(Focus::Particles.is_param());
        assert!(!Focus::Controls.is_param());
    }

    #[test]
    fn test_pause_status() {
        let mut app = app();
        app.toggle_pause();
        assert_eq!(app.status(), "PAUSED");
        app.tick(Instant::now()).unwrap();
        assert!(matches!(app.last_outcome, TickOutcome::Paused(_)));
    }
}
