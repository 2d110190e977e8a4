use thiserror::Error;

/// Failures while moving packets between workers.
///
/// None of these are retried: a run that loses a peer is aborted.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The peer hung up, usually because it already failed.
    #[error("worker {peer} disconnected")]
    Disconnected { peer: usize },

    /// A peer index outside `[0, worker_count)`.
    #[error("unknown worker {peer} (cluster has {count} workers)")]
    UnknownPeer { peer: usize, count: usize },

    /// A packet arrived that the protocol did not expect at this point.
    #[error("unexpected packet from worker {peer}: expected {expected}, got {got}")]
    UnexpectedPacket {
        peer: usize,
        expected: &'static str,
        got: &'static str,
    },

    /// A batch disagreed with the header announced before it.
    #[error("malformed batch from worker {peer}: {detail}")]
    MalformedBatch { peer: usize, detail: String },

    /// A worker thread panicked instead of returning.
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),

    /// The cluster could not be started.
    #[error("failed to start cluster: {0}")]
    Startup(String),
}

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
