use serde::{Deserialize, Serialize};

/// Cumulative time one worker spent in each phase of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseTotals {
    pub computation_secs: f64,
    pub communication_secs: f64,
    pub iterations: u64,
}

impl PhaseTotals {
    #[must_use]
    pub fn total_secs(&self) -> f64 {
        self.computation_secs + self.communication_secs
    }
}
