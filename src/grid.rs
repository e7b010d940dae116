use crate::error::GridError;
use crate::geometry::Point;
use crate::particle::Particle;

/// Index of a particle in the network's particle vector.
pub type ParticleId = usize;

/// Upper bound on the number of buckets a grid may allocate
pub const MAX_CELLS: usize = 1 << 24;

/// Column/row address of a grid cell. Signed so that query centres may sit
/// outside the grid (the pointer can hover beyond the covered plane).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellCoord {
    pub col: i32,
    pub row: i32,
}

impl CellCoord {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

/// Uniform spatial partition of the plane into square cells.
///
/// Each cell holds the ids of the particles whose position falls inside it.
/// A particle is registered in exactly one cell at a time, and the cell
/// coordinate cached on the particle always names that cell.
#[derive(Debug, Clone)]
pub struct Grid {
    cell_size: f64,
    num_cols: usize,
    num_rows: usize,
    // Column-major: index = col * num_rows + row
    cells: Vec<Vec<ParticleId>>,
    len: usize,
}

impl Grid {
    pub fn new(width: f64, height: f64, cell_size: f64) -> Result<Grid, GridError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize(cell_size));
        }
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(GridError::InvalidPlane { width, height });
        }

        let num_cols = (width / cell_size).ceil() as usize;
        let num_rows = (height / cell_size).ceil() as usize;
        // Each axis is checked too: a zero-height plane makes the product 0
        let count = num_cols
            .checked_mul(num_rows)
            .filter(|&n| n <= MAX_CELLS && num_cols <= MAX_CELLS && num_rows <= MAX_CELLS)
            .ok_or(GridError::InvalidCellSize(cell_size))?;
        let cells = vec![Vec::new(); count];

        Ok(Grid {
            cell_size,
            num_cols,
            num_rows,
            cells,
            len: 0,
        })
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Total number of registered particles
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of cells holding at least one particle
    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Contents of a cell, or `None` if the coordinate is off the grid.
    pub fn cell(&self, coord: CellCoord) -> Option<&[ParticleId]> {
        self.index_of(coord).map(|i| self.cells[i].as_slice())
    }

    /// Cell that contains `point`, without any bounds check.
    pub fn cell_containing(&self, point: Point) -> CellCoord {
        CellCoord {
            col: (point.x / self.cell_size).floor() as i32,
            row: (point.y / self.cell_size).floor() as i32,
        }
    }

    /// Cell a particle at `point` is stored under.
    ///
    /// The far plane edge belongs to the last column/row, so a particle
    /// sitting exactly on `x == width` is still addressable. Anything else
    /// off the covered plane is rejected.
    pub fn cell_for(&self, point: Point) -> Result<CellCoord, GridError> {
        let extent_x = self.num_cols as f64 * self.cell_size;
        let extent_y = self.num_rows as f64 * self.cell_size;
        let inside = self.num_cols > 0
            && self.num_rows > 0
            && (0.0..=extent_x).contains(&point.x)
            && (0.0..=extent_y).contains(&point.y);
        if !inside {
            return Err(GridError::OutOfBounds {
                x: point.x,
                y: point.y,
                width: extent_x,
                height: extent_y,
            });
        }

        let col = ((point.x / self.cell_size).floor() as usize).min(self.num_cols - 1);
        let row = ((point.y / self.cell_size).floor() as usize).min(self.num_rows - 1);
        Ok(CellCoord::new(col as i32, row as i32))
    }

    fn index_of(&self, coord: CellCoord) -> Option<usize> {
        if coord.col < 0 || coord.row < 0 {
            return None;
        }
        let (col, row) = (coord.col as usize, coord.row as usize);
        if col >= self.num_cols || row >= self.num_rows {
            return None;
        }
        Some(col * self.num_rows + row)
    }

    /// Register one particle under the cell its position falls in.
    pub fn add(&mut self, id: ParticleId, particle: &mut Particle) -> Result<(), GridError> {
        let coord = self.cell_for(particle.position)?;
        // cell_for only returns on-grid coordinates
        let index = coord.col as usize * self.num_rows + coord.row as usize;
        self.cells[index].push(id);
        self.len += 1;
        particle.set_cell(coord);
        Ok(())
    }

    /// Unregister one particle from the cell it is cached under.
    pub fn remove(&mut self, id: ParticleId, particle: &Particle) -> Result<(), GridError> {
        let coord = particle.cell();
        let desync = GridError::Desync {
            id,
            col: coord.col,
            row: coord.row,
        };
        let index = self.index_of(coord).ok_or_else(|| desync.clone())?;
        let bucket = &mut self.cells[index];
        let slot = bucket.iter().position(|&p| p == id).ok_or(desync)?;
        bucket.swap_remove(slot);
        self.len -= 1;
        Ok(())
    }

    /// Register every particle in the batch; ids are slice indices.
    pub fn add_particles(&mut self, particles: &mut [Particle]) -> Result<(), GridError> {
        for (id, particle) in particles.iter_mut().enumerate() {
            self.add(id, particle)?;
        }
        Ok(())
    }

    pub fn remove_particles(&mut self, particles: &[Particle]) -> Result<(), GridError> {
        for (id, particle) in particles.iter().enumerate() {
            self.remove(id, particle)?;
        }
        Ok(())
    }

    /// Re-bucket the batch after its positions changed.
    pub fn update_particles(&mut self, particles: &mut [Particle]) -> Result<(), GridError> {
        self.remove_particles(particles)?;
        self.add_particles(particles)
    }

    /// Candidate neighbours around `center`.
    ///
    /// Returns every particle in the square of cells `reach` steps out from
    /// `center`, where `reach = ceil(radius / cell_size)`, or 1 when `radius`
    /// is zero, negative or not a number. Cells off the grid are skipped. This is a
    /// superset of the particles within `radius`; callers filter by exact
    /// distance.
    pub fn neighbors(&self, center: CellCoord, radius: f64) -> Vec<ParticleId> {
        let mut out = Vec::new();
        self.neighbors_into(center, radius, &mut out);
        out
    }

    /// Same as [`Grid::neighbors`], appending into a reusable buffer.
    pub fn neighbors_into(&self, center: CellCoord, radius: f64, out: &mut Vec<ParticleId>) {
        if self.num_cols == 0 || self.num_rows == 0 {
            return;
        }
        let reach = self.reach(radius);

        let col_lo = (center.col as i64 - reach).max(0);
        let col_hi = (center.col as i64 + reach).min(self.num_cols as i64 - 1);
        let row_lo = (center.row as i64 - reach).max(0);
        let row_hi = (center.row as i64 + reach).min(self.num_rows as i64 - 1);

        for col in col_lo..=col_hi {
            for row in row_lo..=row_hi {
                let index = col as usize * self.num_rows + row as usize;
                out.extend_from_slice(&self.cells[index]);
            }
        }
    }

    /// Number of cells a query of `radius` inspects on each side of its centre.
    pub fn reach(&self, radius: f64) -> i64 {
        if radius > 0.0 {
            let cells = (radius / self.cell_size).ceil();
            // Anything past the grid dimensions covers the whole grid anyway
            cells.min((self.num_cols.max(self.num_rows) + 1) as f64) as i64
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Velocity;
    use std::collections::HashSet;

    fn particle_at(x: f64, y: f64) -> Particle {
        Particle::new(Point::new(x, y), Velocity::new(0.0, 0.0), 1.0)
    }

    fn as_set(ids: Vec<ParticleId>) -> HashSet<ParticleId> {
        ids.into_iter().collect()
    }

    #[test]
    fn test_dimensions_use_ceiling_division() {
        let grid = Grid::new(200.0, 200.0, 50.0).unwrap();
        assert_eq!((grid.num_cols(), grid.num_rows()), (4, 4));

        let grid = Grid::new(210.0, 99.0, 50.0).unwrap();
        assert_eq!((grid.num_cols(), grid.num_rows()), (5, 2));
    }

    #[test]
    fn test_invalid_construction() {
        assert_eq!(
            Grid::new(100.0, 100.0, 0.0).unwrap_err(),
            GridError::InvalidCellSize(0.0)
        );
        assert!(Grid::new(100.0, 100.0, -5.0).is_err());
        assert!(Grid::new(f64::INFINITY, 100.0, 5.0).is_err());
    }

    #[test]
    fn test_tiny_cell_size_is_rejected() {
        assert_eq!(
            Grid::new(200.0, 100.0, 1e-300).unwrap_err(),
            GridError::InvalidCellSize(1e-300)
        );
        assert!(Grid::new(200.0, 100.0, 0.001).is_err());
        assert!(Grid::new(4097.0, 4096.0, 1.0).is_err());
        // An empty axis must not hide an oversized one
        assert!(Grid::new(200.0, 0.0, 1e-300).is_err());
    }

    #[test]
    fn test_corner_scenario() {
        let mut grid = Grid::new(200.0, 200.0, 50.0).unwrap();
        let mut particles = vec![particle_at(10.0, 10.0), particle_at(190.0, 190.0)];
        grid.add_particles(&mut particles).unwrap();

        assert_eq!(particles[0].cell(), CellCoord::new(0, 0));
        assert_eq!(particles[1].cell(), CellCoord::new(3, 3));

        // Zero radius falls back to a reach of one cell
        let near = grid.neighbors(CellCoord::new(0, 0), 0.0);
        assert_eq!(near, vec![0]);

        // Reach of six cells, clipped to the grid
        let far = as_set(grid.neighbors(CellCoord::new(0, 0), 300.0));
        assert_eq!(far, HashSet::from([0, 1]));
    }

    #[test]
    fn test_query_includes_self() {
        let mut grid = Grid::new(300.0, 170.0, 25.0).unwrap();
        let mut particles: Vec<Particle> = (0..40)
            .map(|i| particle_at((i * 7) as f64 % 300.0, (i * 13) as f64 % 170.0))
            .collect();
        grid.add_particles(&mut particles).unwrap();

        for radius in [0.0, 1.0, 25.0, 80.0] {
            for (id, p) in particles.iter().enumerate() {
                assert!(grid.neighbors(p.cell(), radius).contains(&id));
            }
        }
    }

    #[test]
    fn test_each_particle_in_exactly_one_cell() {
        let mut grid = Grid::new(100.0, 100.0, 10.0).unwrap();
        let mut particles: Vec<Particle> = (0..25)
            .map(|i| particle_at((i * 4) as f64, (99 - i * 4) as f64))
            .collect();
        grid.add_particles(&mut particles).unwrap();
        assert_eq!(grid.len(), 25);

        let all = grid.neighbors(CellCoord::new(5, 5), 1_000.0);
        assert_eq!(all.len(), 25);
        assert_eq!(as_set(all).len(), 25);

        for (id, p) in particles.iter().enumerate() {
            let bucket = grid.cell(p.cell()).unwrap();
            assert_eq!(bucket.iter().filter(|&&x| x == id).count(), 1);
        }
    }

    #[test]
    fn test_far_edge_maps_to_last_cell() {
        let mut grid = Grid::new(200.0, 200.0, 50.0).unwrap();
        let mut particles = vec![particle_at(200.0, 200.0), particle_at(200.0, 0.0)];
        grid.add_particles(&mut particles).unwrap();
        assert_eq!(particles[0].cell(), CellCoord::new(3, 3));
        assert_eq!(particles[1].cell(), CellCoord::new(3, 0));
    }

    #[test]
    fn test_out_of_bounds_insert_is_rejected() {
        let mut grid = Grid::new(200.0, 200.0, 50.0).unwrap();
        let mut outside = vec![particle_at(-0.5, 10.0)];
        assert!(matches!(
            grid.add_particles(&mut outside),
            Err(GridError::OutOfBounds { .. })
        ));
        let mut beyond = vec![particle_at(10.0, 250.1)];
        assert!(grid.add_particles(&mut beyond).is_err());
        assert!(grid.is_empty());
    }

    #[test]
    fn test_remove_then_add_restores_queries() {
        let mut grid = Grid::new(400.0, 300.0, 50.0).unwrap();
        let mut particles: Vec<Particle> = (0..30)
            .map(|i| particle_at((i * 13) as f64, (i * 9) as f64))
            .collect();
        grid.add_particles(&mut particles).unwrap();

        let center = CellCoord::new(3, 2);
        let before = as_set(grid.neighbors(center, 60.0));

        grid.remove_particles(&particles).unwrap();
        assert!(grid.is_empty());
        assert!(grid.neighbors(center, 60.0).is_empty());

        grid.add_particles(&mut particles).unwrap();
        assert_eq!(as_set(grid.neighbors(center, 60.0)), before);
    }

    #[test]
    fn test_remove_with_stale_cell_is_desync() {
        let mut grid = Grid::new(200.0, 200.0, 50.0).unwrap();
        let mut particles = vec![particle_at(10.0, 10.0)];
        grid.add_particles(&mut particles).unwrap();

        particles[0].set_cell(CellCoord::new(2, 2));
        assert_eq!(
            grid.remove_particles(&particles),
            Err(GridError::Desync { id: 0, col: 2, row: 2 })
        );

        // Removing twice is just as broken
        particles[0].set_cell(CellCoord::new(0, 0));
        grid.remove_particles(&particles).unwrap();
        assert!(matches!(
            grid.remove_particles(&particles),
            Err(GridError::Desync { .. })
        ));
    }

    #[test]
    fn test_update_tracks_new_position() {
        let mut grid = Grid::new(200.0, 200.0, 50.0).unwrap();
        let mut particles = vec![particle_at(10.0, 10.0)];
        grid.add_particles(&mut particles).unwrap();

        particles[0].position = Point::new(160.0, 120.0);
        // The index lags until update runs
        assert_eq!(grid.cell(CellCoord::new(0, 0)).unwrap(), &[0]);

        grid.update_particles(&mut particles).unwrap();
        assert_eq!(particles[0].cell(), CellCoord::new(3, 2));
        assert!(grid.cell(CellCoord::new(0, 0)).unwrap().is_empty());
        assert_eq!(grid.neighbors(CellCoord::new(3, 2), 0.0), vec![0]);
        assert!(grid.neighbors(CellCoord::new(0, 0), 0.0).is_empty());
    }

    #[test]
    fn test_query_centre_off_grid() {
        let mut grid = Grid::new(100.0, 100.0, 50.0).unwrap();
        let mut particles = vec![particle_at(99.0, 99.0)];
        grid.add_particles(&mut particles).unwrap();

        assert_eq!(grid.neighbors(CellCoord::new(2, 2), 0.0), vec![0]);
        assert!(grid.neighbors(CellCoord::new(3, 3), 0.0).is_empty());
        assert!(grid.neighbors(CellCoord::new(-10, -10), 50.0).is_empty());
    }

    #[test]
    fn test_reach() {
        let grid = Grid::new(500.0, 500.0, 50.0).unwrap();
        assert_eq!(grid.reach(0.0), 1);
        assert_eq!(grid.reach(f64::NAN), 1);
        assert_eq!(grid.reach(-30.0), 1);
        assert_eq!(grid.reach(50.0), 1);
        assert_eq!(grid.reach(51.0), 2);
        assert_eq!(grid.reach(150.0), 3);
        assert_eq!(grid.reach(f64::INFINITY), 11);
    }
}
