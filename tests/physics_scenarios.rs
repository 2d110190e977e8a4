mod common;

use common::total_momentum;
use poolsim_core::config::PhysicsConfig;
use poolsim_core::physics::{
    advance, handle_collisions, handle_wall_collisions, update_velocity, PhysicsContext,
};
use poolsim_core::{GhostSet, SimError, Topology};
use poolsim_data::{Particle, ParticleClass, Vector2};

fn body(id: u64, class: ParticleClass, mass: f64, radius: f64, x: f64, y: f64) -> Particle {
    Particle::new(id, 0, class, mass, radius, Vector2::new(x, y))
}

#[test]
fn test_two_body_gravity_single_step() {
    let topology = Topology::new(1, 100.0).unwrap();
    let config = PhysicsConfig::default();
    let dt = 0.1;
    let ctx = PhysicsContext {
        topology: &topology,
        config: &config,
        dt,
    };

    let small = body(1, ParticleClass::Small, 1.0, 1.0, 10.0, 50.0);
    let large = body(0, ParticleClass::Large, 1000.0, 5.0, 60.0, 50.0);
    let outcome = advance(&ctx, vec![large, small], &[]).unwrap();

    assert_eq!(outcome.collisions, 0);
    let particles = outcome.buckets.get(0);
    let small = particles.iter().find(|p| p.id == 1).unwrap();

    let expected_v = dt * 1000.0 / (50.0 * 50.0 + config.softening);
    assert!((small.velocity.x - expected_v).abs() < 1e-12);
    assert_eq!(small.velocity.y, 0.0);
    assert!((small.position.x - (10.0 + expected_v * dt)).abs() < 1e-12);
    assert_eq!(small.position.y, 50.0);
}

#[test]
fn test_head_on_equal_masses_bounce() {
    let mut bodies = vec![
        body(0, ParticleClass::Small, 2.0, 1.0, 10.0, 10.0).with_velocity(Vector2::new(3.0, 0.0)),
        body(1, ParticleClass::Small, 2.0, 1.0, 12.0, 10.0).with_velocity(Vector2::new(-3.0, 0.0)),
    ];
    let before = bodies[0].velocity - bodies[1].velocity;

    assert_eq!(handle_collisions(&mut bodies, &[], 1e-6).unwrap(), 1);

    let after = bodies[0].velocity - bodies[1].velocity;
    assert!((after.x + before.x).abs() < 1e-12);
    assert!((bodies[0].velocity.x + 3.0).abs() < 1e-12);
    assert!((bodies[1].velocity.x - 3.0).abs() < 1e-12);
}

#[test]
fn test_glancing_collision_conserves_momentum() {
    let mut bodies = vec![
        body(0, ParticleClass::Small, 1.0, 1.0, 0.0, 0.0).with_velocity(Vector2::new(2.0, 0.5)),
        body(1, ParticleClass::Large, 5.0, 2.0, 2.0, 1.5).with_velocity(Vector2::new(-0.5, 0.0)),
        body(2, ParticleClass::Small, 1.0, 1.0, 40.0, 40.0),
    ];
    let before = total_momentum(&bodies);
    handle_collisions(&mut bodies, &[], 1e-6).unwrap();
    let after = total_momentum(&bodies);
    assert!((before - after).length() < 1e-9);
}

#[test]
fn test_left_wall_reflection() {
    let radius = 2.0;
    let mut bodies = vec![body(0, ParticleClass::Small, 1.0, radius, radius / 2.0, 50.0)
        .with_velocity(Vector2::new(-4.0, 1.0))];

    handle_wall_collisions(&mut bodies, 100.0).unwrap();

    assert_eq!(bodies[0].position.x, radius + radius / 2.0);
    assert_eq!(bodies[0].velocity.x, 4.0);
    assert_eq!(bodies[0].velocity.y, 1.0);
}

#[test]
fn test_region_borders_are_transparent() {
    // world side 20, region border at x = 10
    let mut bodies = vec![body(0, ParticleClass::Small, 1.0, 1.0, 10.0, 5.0)
        .with_velocity(Vector2::new(1.0, 0.0))];
    assert_eq!(handle_wall_collisions(&mut bodies, 20.0).unwrap(), 0);
    assert_eq!(bodies[0].velocity.x, 1.0);
}

#[test]
fn test_ghosts_attract_but_are_untouched() {
    let topology = Topology::new(2, 10.0).unwrap();
    let config = PhysicsConfig::default();
    let ctx = PhysicsContext {
        topology: &topology,
        config: &config,
        dt: 0.01,
    };
    let own = body(1, ParticleClass::Small, 1.0, 0.1, 8.0, 5.0);
    let mut heavy = body(0, ParticleClass::Large, 500.0, 1.0, 2.0, 5.0);
    heavy.region_id = 1;
    let ghosts = vec![GhostSet {
        region: 1,
        particles: vec![heavy.clone()],
    }];

    let outcome = advance(&ctx, vec![own], &ghosts).unwrap();
    let moved = &outcome.buckets.get(0)[0];
    assert!(moved.velocity.x > 0.0, "pulled toward region 1");
    assert_eq!(ghosts[0].particles[0], heavy);
}

#[test]
fn test_coincident_particles_are_fatal() {
    let mut bodies = vec![
        body(4, ParticleClass::Small, 1.0, 1.0, 3.0, 3.0),
        body(5, ParticleClass::Small, 1.0, 1.0, 3.0, 3.0),
    ];
    let err = update_velocity(&mut bodies, &[], 0.1, 1e-8).unwrap_err();
    assert!(matches!(err, SimError::ZeroDistance { a: 4, b: 5 }));
}

#[test]
fn test_non_finite_velocity_is_fatal() {
    let topology = Topology::new(1, 10.0).unwrap();
    let config = PhysicsConfig::default();
    let ctx = PhysicsContext {
        topology: &topology,
        config: &config,
        dt: f64::MAX,
    };
    let bodies = vec![
        body(0, ParticleClass::Small, 1.0, 0.1, 1.0, 1.0),
        body(1, ParticleClass::Large, f64::MAX, 0.1, 1.0, 1.5),
    ];
    let err = advance(&ctx, bodies, &[]).unwrap_err();
    assert!(matches!(err, SimError::NumericDivergence { .. }));
}

#[test]
fn test_glancing_pair_separates_over_steps() {
    let topology = Topology::new(1, 100.0).unwrap();
    let config = PhysicsConfig::default();
    let ctx = PhysicsContext {
        topology: &topology,
        config: &config,
        dt: 0.05,
    };

    let mut bodies = vec![
        body(0, ParticleClass::Small, 1e-9, 1.0, 50.0, 50.0).with_velocity(Vector2::new(1.0, 0.0)),
        body(1, ParticleClass::Small, 1e-9, 1.0, 51.0, 51.2).with_velocity(Vector2::new(0.0, 3.0)),
    ];
    let mut collisions = Vec::new();
    for _ in 0..6 {
        let outcome = advance(&ctx, bodies, &[]).unwrap();
        collisions.push(outcome.collisions);
        bodies = outcome.buckets.into_inner().into_iter().flatten().collect();
    }

    assert_eq!(collisions, vec![1, 0, 0, 0, 0, 0]);
    bodies.sort_by_key(|p| p.id);
    let offset = bodies[0].position - bodies[1].position;
    assert!(offset.length() > 2.0);
}
