use anyhow::{Context, Result};
use poolsim_core::config::SimulationConfig;
use poolsim_core::generation::check_large_particles;
use poolsim_core::physics::PhysicsContext;
use poolsim_core::Topology;
use std::path::PathBuf;

/// Immutable state shared by every worker for the lifetime of one run.
#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub config: SimulationConfig,
    pub topology: Topology,
    /// When set, worker 0 writes a heatmap here after every timestep.
    pub frames_dir: Option<PathBuf>,
}

impl SimulationContext {
    /// Validates `config` for a run on `workers` workers.
    pub fn new(config: SimulationConfig, workers: usize, frames_dir: Option<PathBuf>) -> Result<Self> {
        config.validate().context("invalid simulation configuration")?;
        let topology = Topology::for_workers(workers, f64::from(config.grid_size))?;
        check_large_particles(&config, &topology)?;
        Ok(Self {
            config,
            topology,
            frames_dir,
        })
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.topology.region_count()
    }

    #[must_use]
    pub fn physics(&self) -> PhysicsContext<'_> {
        PhysicsContext {
            topology: &self.topology,
            config: &self.config.physics,
            dt: self.config.time_step,
        }
    }
}
