//! One worker's simulation loop.

use crate::model::context::SimulationContext;
use anyhow::{Context, Result};
use poolsim_core::exchange::synchronize;
use poolsim_core::generation::generate_region;
use poolsim_core::metrics::{Activity, PhaseTimer};
use poolsim_core::physics::advance;
use poolsim_core::RegionBuckets;
use poolsim_data::{Particle, PhaseTotals};
use poolsim_io::{write_frame, Canvas};
use poolsim_net::Transport;

/// What a worker hands back when its loop is over.
///
/// Only worker 0 carries the gathered particles and timings.
#[derive(Debug, Clone, Default)]
pub struct WorkerOutcome {
    pub region: usize,
    /// Final particles of every region, indexed by region.
    pub regions: Option<Vec<Vec<Particle>>>,
    pub timings: Option<Vec<PhaseTotals>>,
    pub collisions: usize,
    pub wall_hits: usize,
}

pub struct Worker<'a, T: Transport> {
    ctx: &'a SimulationContext,
    transport: T,
    timer: PhaseTimer,
    /// Particles computed here last step, bucketed by destination region.
    outgoing: RegionBuckets,
    iteration: u64,
    collisions: usize,
    wall_hits: usize,
}

impl<'a, T: Transport> Worker<'a, T> {
    /// Generates this worker's region.
    pub fn new(ctx: &'a SimulationContext, transport: T) -> Result<Self> {
        let region = transport.worker_id();
        let mut timer = PhaseTimer::new();
        let outgoing = timer.time(Activity::Computation, || -> poolsim_core::Result<_> {
            let particles = generate_region(&ctx.config, &ctx.topology, region)?;
            RegionBuckets::redistribute(ctx.topology.region_count(), particles)
        })?;

        Ok(Self {
            ctx,
            transport,
            timer,
            outgoing,
            iteration: 0,
            collisions: 0,
            wall_hits: 0,
        })
    }

    #[must_use]
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Exchange, physics and the end-of-step barrier for one timestep.
    pub fn step(&mut self) -> Result<()> {
        let topology = &self.ctx.topology;
        let horizon = self.ctx.config.horizon;
        let outgoing = std::mem::take(&mut self.outgoing);

        let view = self.timer.time(Activity::Communication, || {
            synchronize(&self.transport, topology, horizon, outgoing)
        })?;

        let physics = self.ctx.physics();
        let outcome = self
            .timer
            .time(Activity::Computation, || {
                advance(&physics, view.owned, &view.ghosts)
            })
            .with_context(|| format!("physics failed in iteration {}", self.iteration))?;

        self.collisions += outcome.collisions;
        self.wall_hits += outcome.wall_hits;
        self.outgoing = outcome.buckets;

        if self.ctx.frames_dir.is_some() {
            self.emit_frame()?;
        }

        self.timer
            .time(Activity::Communication, || self.transport.barrier())?;
        self.timer.finish_iteration(self.iteration);
        self.iteration += 1;
        Ok(())
    }

    /// Gathers the current particles on worker 0, which writes a heatmap.
    fn emit_frame(&mut self) -> Result<()> {
        let particles: Vec<Particle> = self
            .outgoing
            .iter()
            .flat_map(|(_, bucket)| bucket.iter().cloned())
            .collect();
        let gathered = self
            .timer
            .time(Activity::Communication, || self.transport.gather_particles(particles))?;

        if let (Some(regions), Some(dir)) = (gathered, self.ctx.frames_dir.as_ref()) {
            let canvas = Canvas::from_regions(&self.ctx.topology, &regions);
            write_frame(dir, self.iteration, &canvas)?;
        }
        Ok(())
    }

    /// Flushes a final exchange so every region is authoritative again,
    /// then gathers particles and timings on worker 0.
    pub fn finish(mut self) -> Result<WorkerOutcome> {
        let topology = &self.ctx.topology;
        let horizon = self.ctx.config.horizon;
        let outgoing = std::mem::take(&mut self.outgoing);
        let view = self.timer.time(Activity::Communication, || {
            synchronize(&self.transport, topology, horizon, outgoing)
        })?;

        let region = view.region;
        let regions = self
            .timer
            .time(Activity::Communication, || self.transport.gather_particles(view.owned))?;
        let totals = self.timer.totals();
        tracing::info!(
            computation = totals.computation_secs,
            communication = totals.communication_secs,
            iterations = totals.iterations,
            "worker finished"
        );
        let timings = self.transport.gather_timings(totals)?;

        Ok(WorkerOutcome {
            region,
            regions,
            timings,
            collisions: self.collisions,
            wall_hits: self.wall_hits,
        })
    }
}

/// Runs a whole simulation on one worker.
pub fn run_worker<T: Transport>(ctx: &SimulationContext, transport: T) -> Result<WorkerOutcome> {
    let mut worker = Worker::new(ctx, transport)?;
    while worker.iteration() < ctx.config.time_slots {
        worker.step()?;
    }
    worker.finish()
}
