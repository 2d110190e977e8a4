//! Running all workers of a simulation inside this process.

use crate::model::context::SimulationContext;
use crate::model::worker::{run_worker, WorkerOutcome};
use anyhow::{anyhow, Result};
use poolsim_core::SimError;
use poolsim_data::{Particle, PhaseTotals};
use poolsim_net::{LocalCluster, Transport, TransportError};
use std::time::Instant;

/// Result of a completed run, as seen from worker 0.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Final particles, indexed by region.
    pub regions: Vec<Vec<Particle>>,
    /// Phase totals, indexed by worker.
    pub timings: Vec<PhaseTotals>,
    pub collisions: usize,
    pub wall_hits: usize,
    pub wall_clock_secs: f64,
}

impl RunSummary {
    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.regions.iter().map(Vec::len).sum()
    }
}

/// Runs the simulation with one thread per region.
pub fn run_local(ctx: &SimulationContext) -> Result<RunSummary> {
    let cluster = LocalCluster::new(ctx.workers())?;
    tracing::info!(
        "Simulation is starting on {} core(s).",
        cluster.workers()
    );

    let start = Instant::now();
    let outcomes = cluster.run(|transport| {
        let span = tracing::info_span!("worker", id = transport.worker_id());
        let _guard = span.enter();
        let result = run_worker(ctx, transport);
        if let Err(e) = &result {
            tracing::error!("{e:#}");
        }
        result
    })?;
    let wall_clock_secs = start.elapsed().as_secs_f64();

    summarize(outcomes, wall_clock_secs)
}

/// Collapses per-worker results into one summary or the root cause error.
fn summarize(outcomes: Vec<Result<WorkerOutcome>>, wall_clock_secs: f64) -> Result<RunSummary> {
    let mut failures = Vec::new();
    let mut finished = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok(outcome) => finished.push(outcome),
            Err(e) => failures.push(e),
        }
    }

    // A failed worker makes its peers fail with disconnects; report the cause.
    if !failures.is_empty() {
        let root = failures
            .iter()
            .position(|e| !is_disconnect(e))
            .unwrap_or(0);
        return Err(failures.swap_remove(root));
    }

    let collisions = finished.iter().map(|o| o.collisions).sum();
    let wall_hits = finished.iter().map(|o| o.wall_hits).sum();
    let root = finished
        .into_iter()
        .find(|o| o.regions.is_some())
        .ok_or_else(|| anyhow!("no worker gathered the final particles"))?;

    Ok(RunSummary {
        regions: root.regions.unwrap_or_default(),
        timings: root.timings.unwrap_or_default(),
        collisions,
        wall_hits,
        wall_clock_secs,
    })
}

fn is_disconnect(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<SimError>()
            .is_some_and(SimError::is_disconnect)
            || matches!(
                cause.downcast_ref::<TransportError>(),
                Some(TransportError::Disconnected { .. })
            )
    })
}
