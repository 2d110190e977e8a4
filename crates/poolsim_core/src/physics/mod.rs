//! Physics kernels for one region.
//!
//! One timestep runs, strictly in this order:
//!
//! - `gravity`: accumulate softened gravitational acceleration into velocity
//! - `collision`: resolve overlapping pairs with an elastic bounce
//! - `walls`: reflect off the four outer walls of the pool
//! - `motion`: explicit-Euler step, torus wrap and region reassignment
//!
//! The first three kernels work on world-frame positions. [`advance`] does
//! the conversion from and back to each particle's region frame.

pub mod collision;
pub mod gravity;
pub mod motion;
pub mod walls;

use crate::config::PhysicsConfig;
use crate::error::Result;
use crate::store::{GhostSet, RegionBuckets};
use crate::topology::Topology;
use poolsim_data::Particle;

pub use collision::handle_collisions;
pub use gravity::update_velocity;
pub use motion::update_position;
pub use walls::handle_wall_collisions;

/// Everything the kernels read but never write.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsContext<'a> {
    pub topology: &'a Topology,
    pub config: &'a PhysicsConfig,
    pub dt: f64,
}

#[derive(Debug)]
pub struct StepOutcome {
    /// Owned particles bucketed by the region they moved into.
    pub buckets: RegionBuckets,
    pub collisions: usize,
    pub wall_hits: usize,
}

/// Runs one full timestep over the particles this worker owns.
///
/// `owned` and the ghost particles arrive in their region frames. Ghosts
/// are only read.
pub fn advance(
    ctx: &PhysicsContext<'_>,
    owned: Vec<Particle>,
    ghosts: &[GhostSet],
) -> Result<StepOutcome> {
    let mut bodies = into_world(ctx.topology, owned);
    let visible: Vec<Particle> = ghosts
        .iter()
        .flat_map(|set| set.particles.iter().cloned())
        .collect();
    let visible = into_world(ctx.topology, visible);

    update_velocity(&mut bodies, &visible, ctx.dt, ctx.config.softening)?;
    let collisions = handle_collisions(&mut bodies, &visible, ctx.config.collision_perturbation)?;
    let wall_hits = handle_wall_collisions(&mut bodies, ctx.topology.world_size())?;
    let buckets = update_position(bodies, ctx.topology, ctx.dt)?;

    Ok(StepOutcome {
        buckets,
        collisions,
        wall_hits,
    })
}

/// Rewrites every position from its region frame into the world frame.
#[must_use]
pub fn into_world(topology: &Topology, mut particles: Vec<Particle>) -> Vec<Particle> {
    for p in &mut particles {
        p.position = topology.to_world(p);
    }
    particles
}
