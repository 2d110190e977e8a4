//! Configuration for one simulation run.
//!
//! A [`SimulationConfig`] is resolved once before the first timestep and is
//! immutable afterwards. It can be deserialized from TOML directly; the
//! legacy key/value spec-file format is parsed by `poolsim_io`.
//!
//! ## Example `pool.toml`
//!
//! ```toml
//! time_slots = 100
//! time_step = 0.01
//! horizon = 1
//! grid_size = 200
//! seed = 42
//!
//! [small]
//! count = 50
//! mass = 1.0
//! radius = 1.0
//!
//! [[large]]
//! mass = 1000.0
//! radius = 10.0
//! x = 150.0
//! y = 150.0
//!
//! [physics]
//! softening = 1e-8
//! collision_perturbation = 1e-6
//! ```

use serde::{Deserialize, Serialize};

/// Population parameters shared by every small particle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SmallParticleConfig {
    /// Small particles generated in every region.
    pub count: u64,
    pub mass: f64,
    pub radius: f64,
}

impl Default for SmallParticleConfig {
    fn default() -> Self {
        Self {
            count: 20,
            mass: 1.0,
            radius: 1.0,
        }
    }
}

/// One explicitly placed large particle, in world coordinates.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LargeParticleSpec {
    pub mass: f64,
    pub radius: f64,
    pub x: f64,
    pub y: f64,
}

/// Numerical tuning of the physics kernels.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Added to the squared distance in the gravity law.
    pub softening: f64,
    /// Velocity nudge applied to perfectly coincident, co-moving pairs.
    pub collision_perturbation: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            softening: 1e-8,
            collision_perturbation: 1e-6,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Number of timesteps to run.
    pub time_slots: u64,
    pub time_step: f64,
    /// Maximum lattice-ring distance at which regions share particles.
    pub horizon: usize,
    /// Side length of one region, in world units (and heatmap pixels).
    pub grid_size: u32,
    pub small: SmallParticleConfig,
    #[serde(default)]
    pub large: Vec<LargeParticleSpec>,
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Seeds small-particle placement; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_slots: 10,
            time_step: 0.01,
            horizon: 1,
            grid_size: 100,
            small: SmallParticleConfig::default(),
            large: Vec::new(),
            physics: PhysicsConfig::default(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a
    /// description of the first validation failure. Placement of large
    /// particles depends on the worker count and is checked at generation.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.time_slots > 0, "TimeSlots must be positive");
        anyhow::ensure!(
            self.time_step.is_finite() && self.time_step > 0.0,
            "TimeStep must be positive and finite"
        );
        anyhow::ensure!(self.grid_size > 0, "GridSize must be positive");

        anyhow::ensure!(
            self.small.mass.is_finite() && self.small.mass > 0.0,
            "SmallParticleMass must be positive"
        );
        anyhow::ensure!(
            self.small.radius.is_finite() && self.small.radius > 0.0,
            "SmallParticleRadius must be positive"
        );

        for (i, large) in self.large.iter().enumerate() {
            anyhow::ensure!(
                large.mass.is_finite() && large.mass > 0.0,
                "Large particle {i}: mass must be positive"
            );
            anyhow::ensure!(
                large.radius.is_finite() && large.radius > 0.0,
                "Large particle {i}: radius must be positive"
            );
            anyhow::ensure!(
                large.x.is_finite() && large.y.is_finite(),
                "Large particle {i}: position must be finite"
            );
        }

        anyhow::ensure!(
            self.physics.softening.is_finite() && self.physics.softening >= 0.0,
            "Softening must be non-negative"
        );
        anyhow::ensure!(
            self.physics.collision_perturbation.is_finite()
                && self.physics.collision_perturbation > 0.0,
            "Collision perturbation must be positive"
        );

        Ok(())
    }

    /// Parses and validates a TOML configuration.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Number of particles in a world of `regions` regions.
    #[must_use]
    pub fn total_particles(&self, regions: usize) -> u64 {
        self.small.count * regions as u64 + self.large.len() as u64
    }

    /// Stable digest of everything that influences the physics.
    ///
    /// The seed is excluded so repeated runs of one scenario compare equal.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.time_slots.to_le_bytes());
        hasher.update(self.time_step.to_le_bytes());
        hasher.update((self.horizon as u64).to_le_bytes());
        hasher.update(self.grid_size.to_le_bytes());
        hasher.update(format!("{:?}", self.small).as_bytes());
        hasher.update(format!("{:?}", self.large).as_bytes());
        hasher.update(format!("{:?}", self.physics).as_bytes());
        hex::encode(hasher.finalize())
    }
}
