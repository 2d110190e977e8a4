//! # Poolsim Core
//!
//! The simulation engine for a pool of colliding, gravitating particles split
//! across many cooperating workers.
//!
//! The world is a `√P × √P` grid of square regions. Each worker owns exactly
//! one region and is the only one allowed to mutate the particles inside it.
//! Every timestep the workers run the [`exchange`] protocol to hand particles
//! to their new owners and to mirror read-only copies of nearby regions, then
//! apply the [`physics`] kernels to their own region.
//!
//! ## Example
//!
//! ```
//! use poolsim_core::topology::Topology;
//! use poolsim_data::Vector2;
//!
//! let topology = Topology::for_workers(4, 100.0).unwrap();
//! assert_eq!(topology.pool_length(), 2);
//! assert_eq!(topology.region_of(Vector2::new(150.0, 20.0)), 1);
//! assert_eq!(topology.horizon_distance(0, 3), Some(1));
//! ```

/// Run configuration and validation
pub mod config;
/// Error taxonomy for the simulation core
pub mod error;
/// Ownership exchange and horizon replication between workers
pub mod exchange;
/// Initial particle population per region
pub mod generation;
/// Phase timing and structured logging
pub mod metrics;
/// Gravity, collisions, wall reflection and integration
pub mod physics;
/// Per-region particle storage
pub mod store;
/// Region grid geometry and horizon distance
pub mod topology;

pub use config::SimulationConfig;
pub use error::{Result, SimError};
pub use exchange::{synchronize, RegionView};
pub use metrics::{init_logging, PhaseTimer};
pub use store::{GhostSet, RegionBuckets};
pub use topology::Topology;
