use crate::error::{ensure_finite, Result, SimError};
use poolsim_data::{Particle, Vector2};

/// Acceleration on `target` from a single `source`.
///
/// Magnitude `m_source / (d² + softening)`, pointing from target to source.
pub fn pull(target: &Particle, source: &Particle, softening: f64) -> Result<Vector2> {
    let delta = source.position - target.position;
    let dist2 = delta.length_squared();
    if dist2 == 0.0 {
        return Err(SimError::ZeroDistance {
            a: target.id,
            b: source.id,
        });
    }
    let magnitude = source.mass / (dist2 + softening);
    Ok(delta * (magnitude / dist2.sqrt()))
}

/// Adds `dt` times the gravitational acceleration from every visible body
/// to the velocity of each owned body.
///
/// Positions must be in the world frame and are not modified.
pub fn update_velocity(
    bodies: &mut [Particle],
    ghosts: &[Particle],
    dt: f64,
    softening: f64,
) -> Result<()> {
    for i in 0..bodies.len() {
        let target = &bodies[i];
        let mut acceleration = Vector2::ZERO;

        for (j, source) in bodies.iter().enumerate() {
            if i != j {
                acceleration += pull(target, source, softening)?;
            }
        }
        for source in ghosts {
            acceleration += pull(target, source, softening)?;
        }

        let body = &mut bodies[i];
        body.velocity += acceleration * dt;
        ensure_finite(body, "velocity update")?;
    }
    Ok(())
}
