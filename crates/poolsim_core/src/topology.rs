//! Region grid geometry.
//!
//! The world is a square of side `pool_length * grid_size`, periodic in both
//! axes and cut into `pool_length²` regions numbered row-major. Particle
//! positions are stored relative to their region's origin between timesteps
//! and converted to world coordinates for the physics.

use crate::error::{Result, SimError};
use poolsim_data::{Particle, Vector2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Topology {
    pool_length: usize,
    grid_size: f64,
}

impl Topology {
    pub fn new(pool_length: usize, grid_size: f64) -> Result<Self> {
        if pool_length == 0 {
            return Err(SimError::config("pool length must be positive"));
        }
        if !(grid_size.is_finite() && grid_size > 0.0) {
            return Err(SimError::config(format!(
                "grid size must be positive and finite, got {grid_size}"
            )));
        }
        Ok(Self {
            pool_length,
            grid_size,
        })
    }

    /// Topology for a run on `workers` workers, one region each.
    pub fn for_workers(workers: usize, grid_size: f64) -> Result<Self> {
        Self::new(pool_length_for(workers)?, grid_size)
    }

    #[inline]
    #[must_use]
    pub fn pool_length(&self) -> usize {
        self.pool_length
    }

    #[inline]
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.pool_length * self.pool_length
    }

    #[inline]
    #[must_use]
    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    /// Side length of the whole world.
    #[inline]
    #[must_use]
    pub fn world_size(&self) -> f64 {
        self.grid_size * self.pool_length as f64
    }

    #[inline]
    #[must_use]
    pub fn region_x(&self, region: usize) -> usize {
        region % self.pool_length
    }

    #[inline]
    #[must_use]
    pub fn region_y(&self, region: usize) -> usize {
        region / self.pool_length
    }

    /// World coordinates of the region's lower-left corner.
    #[must_use]
    pub fn origin(&self, region: usize) -> Vector2 {
        Vector2::new(
            self.region_x(region) as f64 * self.grid_size,
            self.region_y(region) as f64 * self.grid_size,
        )
    }

    /// Column (or row) of the lattice containing world coordinate `coord`.
    ///
    /// Clamped to the lattice so round-off at the outer edge never yields an
    /// out-of-range cell.
    #[must_use]
    pub fn axis_cell(&self, coord: f64) -> usize {
        let mut cell = (coord / self.grid_size).floor();
        if cell.is_nan() || cell <= 0.0 {
            return 0;
        }
        // the quotient can round up across a cell boundary
        if cell * self.grid_size > coord {
            cell -= 1.0;
        }
        (cell as usize).min(self.pool_length - 1)
    }

    /// Region id containing the world position.
    #[must_use]
    pub fn region_of(&self, world: Vector2) -> usize {
        self.axis_cell(world.y) * self.pool_length + self.axis_cell(world.x)
    }

    pub fn denormalize(&self, local: f64, region: usize, axis: Axis) -> f64 {
        let cell = match axis {
            Axis::X => self.region_x(region),
            Axis::Y => self.region_y(region),
        };
        local + cell as f64 * self.grid_size
    }

    /// World position of a particle stored in its region's frame.
    #[must_use]
    pub fn to_world(&self, particle: &Particle) -> Vector2 {
        Vector2::new(
            self.denormalize(particle.position.x, particle.region_id, Axis::X),
            self.denormalize(particle.position.y, particle.region_id, Axis::Y),
        )
    }

    /// Inverse of [`Topology::to_world`] for a known region.
    #[must_use]
    pub fn to_local(&self, world: Vector2, region: usize) -> Vector2 {
        world - self.origin(region)
    }

    #[inline]
    #[must_use]
    pub fn normalize(&self, coord: f64) -> f64 {
        coord.rem_euclid(self.grid_size)
    }

    /// Wraps a world position back onto the torus.
    #[must_use]
    pub fn wrap_world(&self, world: Vector2) -> Vector2 {
        let max = self.world_size();
        Vector2::new(wrap(world.x, max), wrap(world.y, max))
    }

    /// Region and local-frame position of an in-bounds world position.
    ///
    /// The local coordinate is the exact offset from the region origin, so
    /// `region_of(to_world(..))` always gives back the same region.
    #[must_use]
    pub fn localize(&self, world: Vector2) -> (usize, Vector2) {
        let cx = self.axis_cell(world.x);
        let cy = self.axis_cell(world.y);
        let region = cy * self.pool_length + cx;
        let local = Vector2::new(
            world.x - cx as f64 * self.grid_size,
            world.y - cy as f64 * self.grid_size,
        );
        (region, local)
    }

    #[must_use]
    pub fn horizon_distance(&self, r1: usize, r2: usize) -> Option<usize> {
        horizon_distance(self.pool_length, r1, r2)
    }

    /// True when `r1` and `r2` share particles under horizon `horizon`.
    #[must_use]
    pub fn within_horizon(&self, r1: usize, r2: usize, horizon: usize) -> bool {
        self.horizon_distance(r1, r2)
            .is_some_and(|distance| distance <= horizon)
    }
}

/// Side of the region lattice for `workers` workers.
///
/// Fails unless `workers` is a non-zero perfect square.
pub fn pool_length_for(workers: usize) -> Result<usize> {
    let root = (workers as f64).sqrt().round() as usize;
    if workers == 0 || root * root != workers {
        return Err(SimError::config(format!(
            "worker count must be a perfect square, got {workers}"
        )));
    }
    Ok(root)
}

/// Brings `coord` into `[0, max)`.
#[must_use]
pub fn wrap(coord: f64, max: f64) -> f64 {
    let mut wrapped = coord.rem_euclid(max);
    // rem_euclid of a tiny negative value rounds up to max
    if wrapped >= max {
        wrapped -= max;
    }
    wrapped
}

/// Number of lattice rings between two regions.
///
/// Ring `i` around a region is every cell at row or column offset `i`,
/// diagonals included. The lattice is flat: opposite edges are not
/// neighbours here even though particle motion wraps. Returns `None` when
/// either id is outside the lattice.
#[must_use]
pub fn horizon_distance(pool_length: usize, r1: usize, r2: usize) -> Option<usize> {
    let regions = pool_length * pool_length;
    if r1 >= regions || r2 >= regions {
        return None;
    }
    let dx = (r1 % pool_length).abs_diff(r2 % pool_length);
    let dy = (r1 / pool_length).abs_diff(r2 / pool_length);
    Some(dx.max(dy))
}
