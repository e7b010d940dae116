use crate::color::Rgba;
use crate::error::SimulationError;
use crate::geometry::{distance_between, Point};
use crate::grid::{Grid, ParticleId};
use crate::particle::{generate_particles, Particle};
use crate::renderer::Renderer;
use crate::settings::NetworkOptions;
use log::{debug, error, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

/// Input delivered to the network between ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NetworkEvent {
    PointerMoved(Point),
    PointerLeft,
    Resized { width: f64, height: f64 },
}

/// What a single frame did
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    /// Particle-to-particle lines drawn
    pub connections: usize,
    /// Particle-to-pointer lines drawn
    pub pointer_connections: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// No world to draw: a rebuild is pending or the network was destroyed
    Suspended,
    /// Drawn without moving anything
    Paused(FrameStats),
    /// Particles moved and the grid was resynchronised
    Advanced(FrameStats),
}

/// Grid and particle batch for one plane size
#[derive(Debug)]
struct World {
    grid: Grid,
    particles: Vec<Particle>,
    width: f64,
    height: f64,
}

/// Rebuild waiting for the resize burst to settle
#[derive(Debug, Clone, Copy)]
struct PendingResize {
    width: f64,
    height: f64,
    due: Instant,
}

/// Particle network: owns the world, the pointer and the pending resize,
/// and advances everything one tick at a time.
pub struct ParticleNetwork {
    options: NetworkOptions,
    world: Option<World>,
    pending: Option<PendingResize>,
    pointer: Option<Point>,
    plane: (f64, f64),
    paused: bool,
    rng: StdRng,
    scratch: Vec<ParticleId>,
}

impl ParticleNetwork {
    pub fn new(width: f64, height: f64, options: NetworkOptions) -> Result<Self, SimulationError> {
        Self::with_rng(width, height, options, StdRng::from_entropy())
    }

    /// Deterministic network, for reproducible runs
    pub fn with_seed(
        width: f64,
        height: f64,
        options: NetworkOptions,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        Self::with_rng(width, height, options, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        width: f64,
        height: f64,
        options: NetworkOptions,
        rng: StdRng,
    ) -> Result<Self, SimulationError> {
        let mut network = Self::empty(width, height, options, rng);
        network.rebuild(width, height)?;
        Ok(network)
    }

    /// Network over a caller-supplied particle batch.
    ///
    /// The particles keep their own range multiplier;
    /// `options.range_multiplier` only applies to batches the network
    /// generates itself on rebuild.
    pub fn with_particles(
        width: f64,
        height: f64,
        options: NetworkOptions,
        mut particles: Vec<Particle>,
    ) -> Result<Self, SimulationError> {
        let mut grid = Grid::new(width, height, options.grid_cell_size)?;
        grid.add_particles(&mut particles)?;
        let mut network = Self::empty(width, height, options, StdRng::from_entropy());
        network.world = Some(World {
            grid,
            particles,
            width,
            height,
        });
        Ok(network)
    }

    fn empty(width: f64, height: f64, options: NetworkOptions, rng: StdRng) -> Self {
        Self {
            options,
            world: None,
            pending: None,
            pointer: None,
            plane: (width, height),
            paused: false,
            rng,
            scratch: Vec::new(),
        }
    }

    /// Build a fresh grid and particle batch for the given plane.
    fn rebuild(&mut self, width: f64, height: f64) -> Result<(), SimulationError> {
        self.plane = (width, height);
        let mut grid = Grid::new(width, height, self.options.grid_cell_size)?;
        let mut particles = if width > 0.0 && height > 0.0 {
            generate_particles(
                &mut self.rng,
                self.options.number_of_particles,
                width,
                height,
                &self.options,
            )?
        } else {
            Vec::new()
        };
        grid.add_particles(&mut particles)?;

        info!(
            "built network: {} particles on {}x{} plane, {}x{} grid of {} cells",
            particles.len(),
            width,
            height,
            grid.num_cols(),
            grid.num_rows(),
            grid.cell_size()
        );

        self.world = Some(World {
            grid,
            particles,
            width,
            height,
        });
        Ok(())
    }

    pub fn handle_event(&mut self, event: NetworkEvent, now: Instant) {
        match event {
            NetworkEvent::PointerMoved(point) => {
                if self.pointer.is_none() {
                    trace!("pointer entered at ({:.1}, {:.1})", point.x, point.y);
                }
                self.pointer = Some(point);
            }
            NetworkEvent::PointerLeft => {
                if self.pointer.take().is_some() {
                    trace!("pointer left");
                }
            }
            NetworkEvent::Resized { width, height } => {
                let due = now + self.debounce();
                if self.pending.is_some() {
                    debug!("resize to {}x{} replaces pending rebuild", width, height);
                } else {
                    debug!("resize to {}x{}, rebuilding in {:?}", width, height, self.debounce());
                }
                self.world = None;
                self.plane = (width, height);
                self.pending = Some(PendingResize { width, height, due });
            }
        }
    }

    fn debounce(&self) -> Duration {
        Duration::from_millis(self.options.resize_debounce_ms)
    }

    /// Run one frame.
    ///
    /// Every particle moves, connects to its grid neighbours and draws
    /// itself; then the pointer connects to the particles around it; then
    /// the grid is resynchronised. Queries during the frame see the buckets
    /// as they were at its start.
    pub fn tick<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        now: Instant,
    ) -> Result<TickOutcome, SimulationError> {
        if let Some(pending) = self.pending {
            if now < pending.due {
                return Ok(TickOutcome::Suspended);
            }
            self.pending = None;
            self.rebuild(pending.width, pending.height)?;
        }

        let Some(world) = self.world.as_mut() else {
            return Ok(TickOutcome::Suspended);
        };
        let World {
            grid,
            particles,
            width,
            height,
        } = world;
        let (width, height) = (*width, *height);
        let color = self.options.particle_color;
        let paused = self.paused;

        renderer.clear_region(width, height);
        renderer.fill_region(self.options.background_color, width, height);

        let mut stats = FrameStats::default();
        for id in 0..particles.len() {
            if !paused {
                particles[id].step(width, height);
            }
            let particle = &particles[id];
            stats.connections +=
                particle.connect(id, renderer, grid, particles.as_slice(), color, &mut self.scratch);
            particle.draw(renderer, color);
        }

        if let Some(pointer) = self.pointer {
            stats.pointer_connections = connect_pointer(
                pointer,
                self.options.mouse_connection_range,
                renderer,
                grid,
                particles,
                color,
                &mut self.scratch,
            );
        }

        if paused {
            return Ok(TickOutcome::Paused(stats));
        }

        if let Err(e) = grid.update_particles(particles) {
            error!("grid desynchronised: {}", e);
            return Err(e.into());
        }
        Ok(TickOutcome::Advanced(stats))
    }

    /// Throw the current batch away and build a new one at the current size.
    pub fn regenerate(&mut self) -> Result<(), SimulationError> {
        self.pending = None;
        let (width, height) = self.plane;
        self.rebuild(width, height)
    }

    /// Drop the world and any pending rebuild. Ticks stay suspended until
    /// the next resize or [`ParticleNetwork::regenerate`].
    pub fn destroy(&mut self) {
        info!("network destroyed");
        self.world = None;
        self.pending = None;
        self.pointer = None;
    }

    pub fn set_colors(&mut self, particle_color: Rgba, background_color: Rgba) {
        self.options.set_colors(particle_color, background_color);
    }

    /// Replace the options. Colors and ranges apply from the next tick,
    /// counts and cell size from the next rebuild.
    pub fn set_options(&mut self, options: NetworkOptions) {
        self.options = options;
    }

    pub fn options(&self) -> &NetworkOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut NetworkOptions {
        &mut self.options
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_rebuilding(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn particles(&self) -> &[Particle] {
        self.world.as_ref().map_or(&[], |w| w.particles.as_slice())
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.world.as_ref().map(|w| &w.grid)
    }

    /// Current (or pending) plane size
    pub fn plane(&self) -> (f64, f64) {
        self.plane
    }
}

fn connect_pointer<R: Renderer + ?Sized>(
    pointer: Point,
    range: f64,
    renderer: &mut R,
    grid: &Grid,
    particles: &[Particle],
    color: Rgba,
    scratch: &mut Vec<ParticleId>,
) -> usize {
    scratch.clear();
    grid.neighbors_into(grid.cell_containing(pointer), range, scratch);

    let mut drawn = 0;
    for &id in scratch.iter() {
        let particle = &particles[id];
        let distance = distance_between(pointer, particle.position);
        if distance < range {
            particle.draw_line_to(renderer, pointer, distance, range, color);
            drawn += 1;
        }
    }
    drawn
}
