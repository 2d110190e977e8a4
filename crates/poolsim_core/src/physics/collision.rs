use crate::error::{ensure_finite, Result, SimError};
use poolsim_data::{Particle, Vector2};

/// Resolves every overlapping pair that involves an owned body.
///
/// Owned pairs are visited once each (`i < j`). A ghost takes part in the
/// bounce through a scratch copy, so only the owned side is written back.
/// Returns the number of pairs resolved.
pub fn handle_collisions(
    bodies: &mut [Particle],
    ghosts: &[Particle],
    perturbation: f64,
) -> Result<usize> {
    let mut resolved = 0;

    for j in 1..bodies.len() {
        let (head, tail) = bodies.split_at_mut(j);
        let second = &mut tail[0];
        for first in head.iter_mut() {
            if resolve(first, second, perturbation)? {
                resolved += 1;
            }
        }
    }

    for body in bodies.iter_mut() {
        for ghost in ghosts {
            let mut shadow = ghost.clone();
            if resolve(body, &mut shadow, perturbation)? {
                resolved += 1;
            }
        }
    }

    Ok(resolved)
}

/// Elastic bounce between two world-frame bodies, if they touch.
///
/// Overlapping bodies are first pushed apart along the line of centres by
/// half the penetration depth each, so the overlap never grows. A coincident
/// pair has no line of centres and separates along its relative velocity
/// instead; when that is zero too, the velocities are nudged apart by
/// `perturbation` first. Velocities are only reflected while the pair is
/// still closing.
pub fn resolve(a: &mut Particle, b: &mut Particle, perturbation: f64) -> Result<bool> {
    let reach = a.radius + b.radius;
    let dist = (a.position - b.position).length();
    if dist > reach {
        return Ok(false);
    }

    if dist == 0.0 && a.velocity.normalize() == b.velocity.normalize() {
        let nudge = Vector2::new(perturbation, perturbation);
        a.velocity += nudge;
        b.velocity -= nudge;
    }

    // unit normal pointing from b to a
    let normal = if dist > 0.0 {
        (a.position - b.position) * (1.0 / dist)
    } else {
        (a.velocity - b.velocity).normalize()
    };
    let backoff = (reach - dist) / 2.0;
    a.position += normal * backoff;
    b.position -= normal * backoff;

    let offset = a.position - b.position;
    let dist2 = offset.length_squared();
    if dist2 == 0.0 {
        return Err(SimError::ZeroDistance { a: a.id, b: b.id });
    }

    let closing = (a.velocity - b.velocity).dot(offset);
    if closing < 0.0 {
        let total_mass = a.mass + b.mass;
        let projection = closing / dist2;
        a.velocity -= offset * (2.0 * b.mass / total_mass * projection);
        b.velocity += offset * (2.0 * a.mass / total_mass * projection);
    }

    ensure_finite(a, "collision")?;
    ensure_finite(b, "collision")?;
    Ok(true)
}
