//! # Poolsim Net
//!
//! Message-passing primitives the simulation workers are hosted on.
//!
//! A worker only needs to know who it is, how many peers exist, and how to
//! move [`Packet`]s to and from a specific peer. Collective operations
//! (sum-reduction, barrier, gather) are built on top of point-to-point
//! traffic in the [`Transport`] trait itself, so any backend that can deliver
//! ordered per-pair messages gets them for free.

/// Transport failures
pub mod error;
/// In-process cluster backed by channels and OS threads
pub mod local;
/// Wire messages exchanged between workers
pub mod message;
/// The `Transport` trait and its collective operations
pub mod transport;

pub use error::{Result, TransportError};
pub use local::{ChannelTransport, LocalCluster};
pub use message::Packet;
pub use transport::{Transport, ROOT_WORKER};
