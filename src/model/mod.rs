pub mod cluster;
pub mod context;
pub mod worker;

pub use cluster::{run_local, RunSummary};
pub use context::SimulationContext;
pub use worker::{run_worker, Worker, WorkerOutcome};
