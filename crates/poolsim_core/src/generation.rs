//! Initial population.
//!
//! Every worker generates the particles of its own region only: the
//! configured number of small particles at uniform random positions, plus
//! each large particle whose configured position falls inside the region.
//! Ids are assigned deterministically so no two workers ever hand out the
//! same one.

use crate::config::SimulationConfig;
use crate::error::{Result, SimError};
use crate::topology::Topology;
use poolsim_data::{Particle, ParticleClass, Vector2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Id of small particle `index` in `region`.
#[must_use]
pub fn small_particle_id(config: &SimulationConfig, region: usize, index: u64) -> u64 {
    config.large.len() as u64 + region as u64 * config.small.count + index
}

/// Fails when a configured large particle lies outside the world.
pub fn check_large_particles(config: &SimulationConfig, topology: &Topology) -> Result<()> {
    let world = topology.world_size();
    for (k, large) in config.large.iter().enumerate() {
        let inside = (0.0..world).contains(&large.x) && (0.0..world).contains(&large.y);
        if !inside {
            return Err(SimError::config(format!(
                "large particle {k} at ({}, {}) is outside the {world}x{world} pool",
                large.x, large.y
            )));
        }
    }
    Ok(())
}

/// Builds the starting particles of `region`, in its local frame.
pub fn generate_region(
    config: &SimulationConfig,
    topology: &Topology,
    region: usize,
) -> Result<Vec<Particle>> {
    if region >= topology.region_count() {
        return Err(SimError::config(format!(
            "region {region} does not exist in a {}-region pool",
            topology.region_count()
        )));
    }
    check_large_particles(config, topology)?;

    let mut particles = Vec::with_capacity(config.small.count as usize);

    for (k, large) in config.large.iter().enumerate() {
        let (home, local) = topology.localize(Vector2::new(large.x, large.y));
        if home == region {
            particles.push(Particle::new(
                k as u64,
                region,
                ParticleClass::Large,
                large.mass,
                large.radius,
                local,
            ));
        }
    }

    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(region as u64)),
        None => ChaCha8Rng::from_entropy(),
    };
    let side = topology.grid_size();
    for i in 0..config.small.count {
        let position = Vector2::new(rng.gen_range(0.0..side), rng.gen_range(0.0..side));
        particles.push(Particle::new(
            small_particle_id(config, region, i),
            region,
            ParticleClass::Small,
            config.small.mass,
            config.small.radius,
            position,
        ));
    }

    tracing::debug!(region, count = particles.len(), "generated region");
    Ok(particles)
}
