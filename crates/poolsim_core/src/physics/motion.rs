use crate::error::{ensure_finite, Result};
use crate::store::RegionBuckets;
use crate::topology::Topology;
use poolsim_data::Particle;

/// Explicit-Euler step for world-frame bodies.
///
/// Each body is moved by `velocity * dt`, wrapped onto the torus, assigned
/// the region that now contains it and stored in that region's frame. The
/// result holds every body, bucketed by its new region.
pub fn update_position(
    mut bodies: Vec<Particle>,
    topology: &Topology,
    dt: f64,
) -> Result<RegionBuckets> {
    for body in &mut bodies {
        let moved = body.position + body.velocity * dt;
        body.position = moved;
        ensure_finite(body, "position update")?;

        let (region, local) = topology.localize(topology.wrap_world(moved));
        body.position = local;
        body.pending_region = Some(region);
    }
    RegionBuckets::redistribute(topology.region_count(), bodies)
}
