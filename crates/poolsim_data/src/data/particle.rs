use super::vector::Vector2;
use serde::{Deserialize, Serialize};

/// Body class of a particle. Decides mass/radius defaults and heatmap weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleClass {
    Small,
    Large,
}

/// One body in the pool.
///
/// Between timesteps `position` is expressed in the frame of region
/// `region_id`. `pending_region` is scratch space written by the position
/// update and committed when the particle is bucketed into its new region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: u64,
    pub region_id: usize,
    #[serde(skip)]
    pub pending_region: Option<usize>,
    pub class: ParticleClass,
    pub mass: f64,
    pub radius: f64,
    pub position: Vector2,
    pub velocity: Vector2,
}

impl Particle {
    #[must_use]
    pub fn new(
        id: u64,
        region_id: usize,
        class: ParticleClass,
        mass: f64,
        radius: f64,
        position: Vector2,
    ) -> Self {
        Self {
            id,
            region_id,
            pending_region: None,
            class,
            mass,
            radius,
            position,
            velocity: Vector2::ZERO,
        }
    }

    #[must_use]
    pub fn with_velocity(mut self, velocity: Vector2) -> Self {
        self.velocity = velocity;
        self
    }

    #[inline]
    #[must_use]
    pub fn is_large(&self) -> bool {
        self.class == ParticleClass::Large
    }

    /// Region this particle should be stored under right now.
    #[inline]
    #[must_use]
    pub fn destination(&self) -> usize {
        self.pending_region.unwrap_or(self.region_id)
    }

    /// Makes `pending_region` authoritative.
    pub fn commit_region(&mut self) {
        if let Some(region) = self.pending_region.take() {
            self.region_id = region;
        }
    }

    #[must_use]
    pub fn momentum(&self) -> Vector2 {
        self.velocity * self.mass
    }
}
