//! Phase timing and logging setup.
//!
//! Each worker owns a [`PhaseTimer`] and charges every piece of work either to
//! computation (physics, generation) or to communication (exchange, barrier,
//! gathers). Per-iteration samples are logged at debug level in a fixed,
//! line-oriented format that log-parsing scripts can rely on.

use poolsim_data::PhaseTotals;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "POOLSIM_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Computation,
    Communication,
}

/// Accumulates time per activity, per iteration and for the whole run.
#[derive(Debug, Default)]
pub struct PhaseTimer {
    computation: Duration,
    communication: Duration,
    iteration_computation: Duration,
    iteration_communication: Duration,
    iterations: u64,
}

impl PhaseTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` and charges its wall-clock time to `activity`.
    pub fn time<R>(&mut self, activity: Activity, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let result = f();
        self.record(activity, start.elapsed());
        result
    }

    pub fn record(&mut self, activity: Activity, elapsed: Duration) {
        match activity {
            Activity::Computation => self.iteration_computation += elapsed,
            Activity::Communication => self.iteration_communication += elapsed,
        }
    }

    /// Closes iteration `iteration`, logs its samples and folds them into the
    /// run totals.
    pub fn finish_iteration(&mut self, iteration: u64) {
        tracing::debug!(
            "Computation time for iteration {}: {} seconds",
            iteration,
            format_seconds(self.iteration_computation)
        );
        tracing::debug!(
            "Communication time for iteration {}: {} seconds",
            iteration,
            format_seconds(self.iteration_communication)
        );
        self.computation += std::mem::take(&mut self.iteration_computation);
        self.communication += std::mem::take(&mut self.iteration_communication);
        self.iterations += 1;
    }

    /// Run totals, including any iteration still open.
    #[must_use]
    pub fn totals(&self) -> PhaseTotals {
        PhaseTotals {
            computation_secs: (self.computation + self.iteration_computation).as_secs_f64(),
            communication_secs: (self.communication + self.iteration_communication).as_secs_f64(),
            iterations: self.iterations,
        }
    }
}

/// Seconds with microsecond resolution, e.g. `0.001250`.
#[must_use]
pub fn format_seconds(duration: Duration) -> String {
    format!("{:.6}", duration.as_secs_f64())
}

/// Initialize the tracing subscriber.
///
/// The filter comes from `POOLSIM_LOG` when set, `default` otherwise. Lines
/// go to stderr and carry the thread name, so every worker is
/// distinguishable. Calling this twice is harmless.
pub fn init_logging(default: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_charges_activity() {
        let mut timer = PhaseTimer::new();
        let value = timer.time(Activity::Computation, || 41 + 1);
        assert_eq!(value, 42);
        timer.record(Activity::Communication, Duration::from_millis(250));
        timer.finish_iteration(0);

        let totals = timer.totals();
        assert_eq!(totals.iterations, 1);
        assert!((totals.communication_secs - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_open_iteration_counts_in_totals() {
        let mut timer = PhaseTimer::new();
        timer.record(Activity::Computation, Duration::from_secs(2));
        assert_eq!(timer.totals().computation_secs, 2.0);
        assert_eq!(timer.totals().iterations, 0);
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(Duration::from_micros(1250)), "0.001250");
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging("warn");
        init_logging("debug");
    }
}
