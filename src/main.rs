use anyhow::Result;
use clap::Parser;
use poolsim_core::metrics::init_logging;
use poolsim_lib::app::{run, RunOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Spec file describing the run (`.toml` or the legacy key/value format)
    specfile: PathBuf,

    /// Heatmap of the final state, written as a PPM image
    output: PathBuf,

    /// Number of workers; must be a perfect square
    #[arg(short, long, default_value_t = 1)]
    workers: usize,

    /// Write a JSON timing report here
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write a heatmap after every timestep into this directory
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Write the final particles as JSON here
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    fn into_options(self) -> RunOptions {
        RunOptions {
            spec: self.specfile,
            output: self.output,
            workers: self.workers,
            report: self.report,
            frames: self.frames,
            dump: self.dump,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level());

    let summary = run(&args.into_options())?;
    tracing::debug!(particles = summary.particle_count(), "exited clean");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let args = Args::try_parse_from(["poolsim", "pool.spec", "out.ppm"]).unwrap();
        assert_eq!(args.specfile, PathBuf::from("pool.spec"));
        assert_eq!(args.workers, 1);
        assert_eq!(args.log_level(), "info");
        assert!(args.report.is_none());
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "poolsim", "pool.toml", "out.ppm", "--workers", "9", "--report", "r.json",
            "--frames", "frames", "--dump", "final.json", "-vv",
        ])
        .unwrap();
        assert_eq!(args.log_level(), "trace");
        let options = args.into_options();
        assert_eq!(options.workers, 9);
        assert_eq!(options.frames, Some(PathBuf::from("frames")));
        assert_eq!(options.dump, Some(PathBuf::from("final.json")));
    }

    #[test]
    fn test_missing_output_rejected() {
        assert!(Args::try_parse_from(["poolsim", "pool.spec"]).is_err());
    }
}
