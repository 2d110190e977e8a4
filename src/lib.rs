//! # Poolsim
//!
//! A pool of colliding, gravitating particles simulated by a fixed grid of
//! cooperating workers, one per region. The workspace crates hold the
//! engine (`poolsim_core`), the messaging layer (`poolsim_net`) and file
//! output (`poolsim_io`). This crate wires them into a runnable simulation.

pub mod app;
pub mod model;
