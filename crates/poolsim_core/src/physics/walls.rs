use crate::error::{ensure_finite, Result};
use poolsim_data::Particle;

/// Reflects world-frame bodies off the outer walls of a `world_size`
/// square pool. Region borders are transparent and never bounce.
///
/// Returns how many axis reflections happened.
pub fn handle_wall_collisions(bodies: &mut [Particle], world_size: f64) -> Result<usize> {
    let mut hits = 0;
    for body in bodies.iter_mut() {
        let radius = body.radius;
        if reflect(&mut body.position.x, &mut body.velocity.x, radius, world_size) {
            hits += 1;
        }
        if reflect(&mut body.position.y, &mut body.velocity.y, radius, world_size) {
            hits += 1;
        }
        ensure_finite(body, "wall reflection")?;
    }
    Ok(hits)
}

/// Mirrors the penetration back inside `[0, max]` and points the velocity
/// component away from the wall that was hit.
fn reflect(coord: &mut f64, velocity: &mut f64, radius: f64, max: f64) -> bool {
    let hit = if *coord - radius < 0.0 {
        *coord = radius + (radius - *coord);
        if *velocity < 0.0 {
            *velocity = -*velocity;
        }
        true
    } else if *coord + radius > max {
        *coord = (max - radius) - (*coord + radius - max);
        if *velocity > 0.0 {
            *velocity = -*velocity;
        }
        true
    } else {
        false
    };
    *coord = coord.clamp(0.0, max);
    hit
}
