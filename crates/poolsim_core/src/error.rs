//! Error types for the simulation core.
//!
//! Every variant is fatal for the run. The taxonomy only exists so the
//! diagnostic says which kind of invariant broke.

use poolsim_data::Particle;
use poolsim_net::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    /// Invalid run parameters, detected before any state is created.
    #[error("configuration error: {0}")]
    Config(String),

    /// A position or velocity stopped being finite.
    #[error("numeric divergence on particle {particle} during {stage}: {detail}")]
    NumericDivergence {
        particle: u64,
        stage: &'static str,
        detail: String,
    },

    /// Two distinct particles occupy exactly the same point.
    #[error("zero separation between distinct particles {a} and {b}")]
    ZeroDistance { a: u64, b: u64 },

    /// Bucketed particle counts disagree with the reduced totals.
    #[error("region {region} holds {actual} particles, expected {expected}")]
    CountMismatch {
        region: usize,
        expected: usize,
        actual: usize,
    },

    /// The exchange protocol saw something it can never legitimately see.
    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type alias for simulation core operations.
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    #[must_use]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    #[must_use]
    pub fn protocol<S: Into<String>>(msg: S) -> Self {
        Self::Protocol(msg.into())
    }

    /// True when this error only reports that a peer went away.
    ///
    /// Such errors are a consequence of a failure elsewhere in the cluster,
    /// never its cause.
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Disconnected { .. }))
    }
}

/// Fails when the particle's position or velocity is NaN or infinite.
pub fn ensure_finite(particle: &Particle, stage: &'static str) -> Result<()> {
    if particle.position.is_finite() && particle.velocity.is_finite() {
        return Ok(());
    }
    Err(SimError::NumericDivergence {
        particle: particle.id,
        stage,
        detail: format!(
            "position ({}, {}), velocity ({}, {})",
            particle.position.x, particle.position.y, particle.velocity.x, particle.velocity.y
        ),
    })
}
