use crate::error::Result;
use crate::serialization::write_json_file;
use poolsim_core::{SimulationConfig, Topology};
use poolsim_data::PhaseTotals;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub workers: usize,
    pub pool_length: usize,
    pub iterations: u64,
    pub fingerprint: String,
    pub total_particles: u64,
    pub wall_clock_secs: f64,
    /// Largest per-worker computation total.
    pub slowest_computation_secs: f64,
    /// Largest per-worker communication total.
    pub slowest_communication_secs: f64,
    pub avg_secs_per_iteration: f64,
    pub per_worker: Vec<PhaseTotals>,
}

impl RunReport {
    #[must_use]
    pub fn new(
        config: &SimulationConfig,
        topology: &Topology,
        per_worker: Vec<PhaseTotals>,
        wall_clock_secs: f64,
    ) -> Self {
        let slowest = |f: fn(&PhaseTotals) -> f64| per_worker.iter().map(f).fold(0.0, f64::max);
        let slowest_computation_secs = slowest(|t| t.computation_secs);
        let slowest_communication_secs = slowest(|t| t.communication_secs);
        let iterations = config.time_slots;

        Self {
            workers: per_worker.len(),
            pool_length: topology.pool_length(),
            iterations,
            fingerprint: config.fingerprint(),
            total_particles: config.total_particles(topology.region_count()),
            wall_clock_secs,
            slowest_computation_secs,
            slowest_communication_secs,
            avg_secs_per_iteration: wall_clock_secs / iterations.max(1) as f64,
            per_worker,
        }
    }

    /// Emits the end-of-run summary lines.
    pub fn log_summary(&self) {
        tracing::info!("Simulation of {} iteration(s) completed.", self.iterations);
        tracing::info!("Total running time: {:.6} seconds", self.wall_clock_secs);
        tracing::info!(
            "Average time per iteration: {:.6} seconds",
            self.avg_secs_per_iteration
        );
        tracing::info!(
            computation = self.slowest_computation_secs,
            communication = self.slowest_communication_secs,
            "Slowest worker phase totals"
        );
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_json_file(self, path)
    }
}
