use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::model::cluster::{run_local, RunSummary};
use crate::model::context::SimulationContext;
use poolsim_io::{load_config, write_json_file, write_ppm, Canvas, RunReport};

/// Everything one invocation of the binary needs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub spec: PathBuf,
    pub output: PathBuf,
    pub workers: usize,
    pub report: Option<PathBuf>,
    pub frames: Option<PathBuf>,
    pub dump: Option<PathBuf>,
}

/// Loads the configuration, runs the simulation and writes every requested
/// artifact.
pub fn run(options: &RunOptions) -> Result<RunSummary> {
    let config = load_config(&options.spec)
        .with_context(|| format!("failed to load {}", options.spec.display()))?;
    let ctx = SimulationContext::new(config, options.workers, options.frames.clone())?;

    let world = ctx.topology.world_size();
    tracing::info!(
        "Generated {} particles in {} regions of size {}x{} each; Total canvas size is {}x{}.",
        ctx.config.total_particles(ctx.workers()),
        ctx.workers(),
        ctx.config.grid_size,
        ctx.config.grid_size,
        world,
        world
    );
    tracing::info!(fingerprint = %ctx.config.fingerprint(), "configuration");

    let summary = run_local(&ctx)?;

    let canvas = Canvas::from_regions(&ctx.topology, &summary.regions);
    write_ppm(&options.output, &canvas)
        .with_context(|| format!("failed to write {}", options.output.display()))?;

    if let Some(path) = &options.dump {
        write_json_file(&summary.regions, path)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    }

    let report = RunReport::new(
        &ctx.config,
        &ctx.topology,
        summary.timings.clone(),
        summary.wall_clock_secs,
    );
    report.log_summary();
    tracing::info!(
        collisions = summary.collisions,
        wall_hits = summary.wall_hits,
        particles = summary.particle_count(),
        "run statistics"
    );
    if let Some(path) = &options.report {
        report
            .write(path)
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }

    Ok(summary)
}
