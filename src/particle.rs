use crate::color::Rgba;
use crate::error::RangeError;
use crate::geometry::{distance_between, random_number, Point};
use crate::grid::{CellCoord, Grid, ParticleId};
use crate::renderer::Renderer;
use crate::settings::NetworkOptions;
use rand::Rng;

/// Connection range is the particle radius times this factor
pub const RANGE_MULTIPLIER: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
}

impl Velocity {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A moving point of the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Point,
    pub velocity: Velocity,
    radius: f64,
    range_multiplier: f64,
    /// Cell the grid stores this particle under. Written by the grid only.
    cell: CellCoord,
}

impl Particle {
    pub fn new(position: Point, velocity: Velocity, radius: f64) -> Self {
        Self {
            position,
            velocity,
            radius,
            range_multiplier: RANGE_MULTIPLIER,
            cell: CellCoord::default(),
        }
    }

    pub fn with_range_multiplier(mut self, multiplier: f64) -> Self {
        self.range_multiplier = multiplier;
        self
    }

    /// Random position inside the plane, random heading and speed, random radius.
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        width: f64,
        height: f64,
        options: &NetworkOptions,
    ) -> Result<Self, RangeError> {
        let position = Point::new(random_number(rng, 0.0, width)?, random_number(rng, 0.0, height)?);
        let velocity = Velocity::new(
            random_number(rng, -options.max_speed, options.max_speed)?,
            random_number(rng, -options.max_speed, options.max_speed)?,
        );
        let radius = random_number(rng, options.particle_radius_min, options.particle_radius_max)?;
        Ok(Particle::new(position, velocity, radius).with_range_multiplier(options.range_multiplier))
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Distance under which this particle connects to its neighbours
    pub fn range(&self) -> f64 {
        self.radius * self.range_multiplier
    }

    pub fn cell(&self) -> CellCoord {
        self.cell
    }

    pub(crate) fn set_cell(&mut self, cell: CellCoord) {
        self.cell = cell;
    }

    /// Advance one tick inside a `width` x `height` plane.
    ///
    /// Each axis is handled on its own: if the step would leave `[0, extent]`
    /// the velocity on that axis flips and the coordinate stays where it was
    /// for this tick. The reflected velocity takes effect from the next tick.
    pub fn step(&mut self, width: f64, height: f64) {
        let next_x = self.position.x + self.velocity.x;
        let next_y = self.position.y + self.velocity.y;

        if next_x < 0.0 || next_x > width {
            self.velocity.x = -self.velocity.x;
        } else {
            self.position.x = next_x;
        }

        if next_y < 0.0 || next_y > height {
            self.velocity.y = -self.velocity.y;
        } else {
            self.position.y = next_y;
        }
    }

    /// Draw lines to every grid neighbour closer than [`Particle::range`].
    /// Returns how many lines were drawn.
    pub fn connect<R: Renderer + ?Sized>(
        &self,
        id: ParticleId,
        renderer: &mut R,
        grid: &Grid,
        particles: &[Particle],
        color: Rgba,
        scratch: &mut Vec<ParticleId>,
    ) -> usize {
        let range = self.range();
        scratch.clear();
        grid.neighbors_into(self.cell, range, scratch);

        let mut drawn = 0;
        for &other in scratch.iter() {
            if other == id {
                continue;
            }
            let neighbor = &particles[other];
            let distance = distance_between(self.position, neighbor.position);
            if distance < range {
                self.draw_line_to(renderer, neighbor.position, distance, range, color);
                drawn += 1;
            }
        }
        drawn
    }

    /// Line towards `target`, fully opaque at distance 0 and transparent at `range`.
    pub fn draw_line_to<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        target: Point,
        distance: f64,
        range: f64,
        color: Rgba,
    ) {
        let alpha = 1.0 - distance / range;
        renderer.draw_line(self.position, target, color.with_alpha(alpha));
    }

    pub fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R, color: Rgba) {
        renderer.draw_circle(self.position, self.radius, color);
    }
}

/// Fresh batch of `count` random particles for a plane of the given size.
pub fn generate_particles<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    width: f64,
    height: f64,
    options: &NetworkOptions,
) -> Result<Vec<Particle>, RangeError> {
    (0..count)
        .map(|_| Particle::random(rng, width, height, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::recording::{DrawCommand, RecordingRenderer};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn still(x: f64, y: f64, radius: f64) -> Particle {
        Particle::new(Point::new(x, y), Velocity::new(0.0, 0.0), radius)
    }

    #[test]
    fn test_step_moves_by_velocity() {
        let mut p = Particle::new(Point::new(10.0, 10.0), Velocity::new(1.5, -0.5), 1.0);
        p.step(100.0, 100.0);
        assert_eq!(p.position, Point::new(11.5, 9.5));
        assert_eq!(p.velocity, Velocity::new(1.5, -0.5));
    }

    #[test]
    fn test_reflect_freezes_axis_for_one_tick() {
        let mut p = Particle::new(Point::new(0.0, 50.0), Velocity::new(-1.0, 1.0), 1.0);
        p.step(100.0, 100.0);
        assert_eq!(p.velocity.x, 1.0);
        assert_eq!(p.position.x, 0.0);
        // The other axis keeps going
        assert_eq!(p.position.y, 51.0);

        p.step(100.0, 100.0);
        assert_eq!(p.position.x, 1.0);
    }

    #[test]
    fn test_reflect_on_far_edges() {
        let mut p = Particle::new(Point::new(99.5, 99.0), Velocity::new(1.0, 1.0), 1.0);
        p.step(100.0, 100.0);
        assert_eq!(p.position, Point::new(99.5, 100.0));
        assert_eq!(p.velocity, Velocity::new(-1.0, 1.0));

        p.step(100.0, 100.0);
        assert_eq!(p.position, Point::new(98.5, 100.0));
        assert_eq!(p.velocity, Velocity::new(-1.0, -1.0));
    }

    #[test]
    fn test_step_never_leaves_plane() {
        let mut rng = StdRng::seed_from_u64(3);
        let options = NetworkOptions::default();
        let mut particles = generate_particles(&mut rng, 50, 40.0, 30.0, &options).unwrap();
        for _ in 0..2_000 {
            for p in particles.iter_mut() {
                p.step(40.0, 30.0);
                assert!((0.0..=40.0).contains(&p.position.x));
                assert!((0.0..=30.0).contains(&p.position.y));
            }
        }
    }

    #[test]
    fn test_random_respects_options() {
        let mut rng = StdRng::seed_from_u64(42);
        let options = NetworkOptions::default();
        let particles = generate_particles(&mut rng, 200, 320.0, 180.0, &options).unwrap();
        assert_eq!(particles.len(), 200);
        for p in &particles {
            assert!((0.0..320.0).contains(&p.position.x));
            assert!((0.0..180.0).contains(&p.position.y));
            assert!(p.velocity.x.abs() <= options.max_speed);
            assert!(p.velocity.y.abs() <= options.max_speed);
            assert!(p.radius() >= options.particle_radius_min);
            assert!(p.radius() < options.particle_radius_max);
            assert_eq!(p.range(), p.radius() * options.range_multiplier);
        }
    }

    #[test]
    fn test_random_on_empty_plane_fails() {
        let mut rng = StdRng::seed_from_u64(42);
        let options = NetworkOptions::default();
        assert!(Particle::random(&mut rng, 0.0, 10.0, &options).is_err());
    }

    #[test]
    fn test_connect_fades_with_distance() {
        let mut grid = Grid::new(400.0, 400.0, 50.0).unwrap();
        // range = 2 * 50 = 100
        let mut particles = vec![
            still(100.0, 100.0, 2.0),
            still(150.0, 100.0, 1.0),
            still(100.0, 175.0, 1.0),
            still(250.0, 100.0, 1.0),
        ];
        grid.add_particles(&mut particles).unwrap();

        let mut renderer = RecordingRenderer::default();
        let mut scratch = Vec::new();
        let drawn = particles[0].connect(0, &mut renderer, &grid, &particles, Rgba::WHITE, &mut scratch);
        assert_eq!(drawn, 2);

        let mut lines = renderer.lines();
        lines.sort_by(|a, b| b.2.a.partial_cmp(&a.2.a).unwrap());
        assert_eq!(lines[0].1, Point::new(150.0, 100.0));
        assert!((lines[0].2.a - 0.5).abs() < 1e-12);
        assert_eq!(lines[1].1, Point::new(100.0, 175.0));
        assert!((lines[1].2.a - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_connect_at_exact_range_is_skipped() {
        let mut grid = Grid::new(400.0, 400.0, 50.0).unwrap();
        let mut particles = vec![still(100.0, 100.0, 1.0), still(150.0, 100.0, 1.0)];
        grid.add_particles(&mut particles).unwrap();

        let mut renderer = RecordingRenderer::default();
        let mut scratch = Vec::new();
        let drawn = particles[0].connect(0, &mut renderer, &grid, &particles, Rgba::WHITE, &mut scratch);
        assert_eq!(drawn, 0);
        assert!(renderer.commands.is_empty());
    }

    #[test]
    fn test_draw_emits_circle() {
        let p = still(5.0, 6.0, 1.5);
        let mut renderer = RecordingRenderer::default();
        p.draw(&mut renderer, Rgba::WHITE);
        assert_eq!(
            renderer.commands,
            vec![DrawCommand::Circle {
                center: Point::new(5.0, 6.0),
                radius: 1.5,
                color: Rgba::WHITE
            }]
        );
    }
}
