use super::*;
use crate::core::constants::DT;
use crate::core::error::SolverError;

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn position(world: &World, id: BodyId) -> Vec2 {
    world.body(id).map(|b| b.position()).unwrap_or(Vec2::new(f32::NAN, f32::NAN))
}

#[test]
fn ids_are_unique_and_start_at_one() {
    let mut world = World::new();
    let p = world.create_point(Vec2::ZERO).unwrap();
    let s = world.create_angular_state(0.0, 1.0);
    let q = world.create_particle(Vec2::new(1.0, 0.0), 1.0, 1.0, 0).unwrap();
    assert_eq!(p.object_id(), ObjectId(1));
    assert_eq!(s.object_id(), ObjectId(2));
    assert_eq!(q.object_id(), ObjectId(3));

    // ids keep counting after clear
    world.clear();
    let r = world.create_point(Vec2::ZERO).unwrap();
    assert_eq!(r.object_id(), ObjectId(4));
    assert_eq!(world.frame(), 0);
}

#[test]
fn invalid_creations_are_rejected() {
    let mut world = World::new();
    assert_eq!(
        world.create_particle(Vec2::ZERO, 1.0, 0.0, 0),
        Err(SolverError::InvalidShape("radius must be positive and finite"))
    );
    let a = world.create_linear_state(Vec2::ZERO, 1.0).unwrap();
    let missing = BodyId::from_object_id(ObjectId(999));
    assert_eq!(
        world.create_line_segment(a, missing, 1.0),
        Err(SolverError::UnknownEntity(ObjectId(999)))
    );
    assert_eq!(
        world.create_linear_spring(a, a, None),
        Err(SolverError::DegenerateLink(a.object_id()))
    );
    assert!(matches!(world.create_wheel(missing, 2.0), Err(SolverError::UnknownEntity(_))));
    let bad_position: std::result::Result<BodyId, SolverError> =
        Err(SolverError::InvalidShape("position must be finite"));
    assert_eq!(world.create_point(Vec2::new(f32::NAN, 0.0)), bad_position);
    assert_eq!(world.create_linear_state(Vec2::new(0.0, f32::INFINITY), 1.0), bad_position);
    assert_eq!(world.bodies().len(), 1);
    assert!(world.linear_springs().is_empty());
    assert!(world.line_segments().is_empty());
}

#[test]
fn gravity_moves_dynamic_bodies_only() {
    let mut world = World::new();
    world.set_gravity(Vec2::new(0.0, -10.0));
    let anchor = world.create_point(Vec2::ZERO).unwrap();
    let heavy = world.create_linear_state(Vec2::new(5.0, 0.0), 0.0).unwrap();
    let body = world.create_linear_state(Vec2::new(10.0, 0.0), 2.0).unwrap();

    world.update();

    assert_eq!(position(&world, anchor), Vec2::ZERO);
    assert_eq!(position(&world, heavy), Vec2::new(5.0, 0.0));
    let v = world.body(body).unwrap().velocity();
    assert!(approx(v.y, -10.0 * DT, 1e-6));
    assert!(approx(position(&world, body).y, -10.0 * DT * DT, 1e-7));
}

#[test]
fn overlapping_particles_settle_at_touching_distance() {
    let mut world = World::new();
    let a = world.create_particle(Vec2::ZERO, 1.0, 5.0, 0).unwrap();
    let b = world.create_particle(Vec2::new(8.0, 0.0), 1.0, 5.0, 0).unwrap();

    world.update();

    let collision = world.collision_between(a, b).expect("collision after first tick");
    assert!(approx(collision.distance(), 8.0, 1e-4));
    assert!((collision.normal() - Vec2::UNIT_X).length() < 1e-5);
    assert!(position(&world, a).x < 0.0);
    assert!(position(&world, b).x > 8.0);

    // equal masses: momentum stays zero
    let total = world.body(a).unwrap().velocity() + world.body(b).unwrap().velocity();
    assert!(total.length() < 1e-4);

    let limit = 10.0 + world.config().collision_buffer;
    let mut previous = 8.0;
    for tick in 0..60 {
        world.update();
        let separation = position(&world, b).x - position(&world, a).x;
        assert!(separation >= previous - 1e-4, "tick {tick}: {separation} < {previous}");
        assert!(separation < limit, "tick {tick}: {separation}");
        assert!(world.collision_between(a, b).is_some(), "tick {tick}: contact lost");
        previous = separation;
    }
    assert!(approx(previous, 10.0, 1e-2), "separation {previous}");
    assert_eq!(world.collision_count(), 1);

    // pulled past the buffer: the contact is dropped
    let far = position(&world, a) + Vec2::new(limit + 0.5, 0.0);
    assert!(world.set_body_position(b, far));
    world.update();
    assert_eq!(world.collision_count(), 0);
}

#[test]
fn far_and_oversized_shapes_step_cleanly() {
    let mut world = World::new();
    let a = world.create_point(Vec2::new(5e10, 0.0)).unwrap();
    let b = world.create_point(Vec2::new(5e10, 10.0)).unwrap();
    world.create_line_segment(a, b, 1.0).unwrap();
    world.create_particle(Vec2::ZERO, 1.0, 1e6, 0).unwrap();
    world.create_particle(Vec2::new(3.0, 0.0), 1.0, 1.0, 0).unwrap();

    world.update();
    assert_eq!(world.collision_count(), 1);
    assert_eq!(world.frame(), 1);
}

#[test]
fn spring_settles_at_rest_length() {
    let mut world = World::new();
    let a = world.create_linear_state(Vec2::ZERO, 1.0).unwrap();
    let b = world.create_linear_state(Vec2::new(10.0, 0.0), 1.0).unwrap();
    let spring = world.create_linear_spring(a, b, Some(5.0)).unwrap();

    for _ in 0..120 {
        world.update();
    }
    let length = (position(&world, b) - position(&world, a)).length();
    assert!(approx(length, 5.0, 1e-2), "length {length}");
    assert!(world.residual() < 1e-2);

    assert!(world.set_spring_rest_length(spring, 8.0));
    for _ in 0..120 {
        world.update();
    }
    let length = (position(&world, b) - position(&world, a)).length();
    assert!(approx(length, 8.0, 1e-2), "length {length}");
}

#[test]
fn motor_drives_relative_velocity() {
    let mut world = World::new();
    let a = world.create_angular_state(0.0, 1.0);
    let b = world.create_angular_state(0.0, 1.0);
    let motor = world.create_motor_constraint(a, b, 3.0).unwrap();

    world.update();
    let wa = world.angular_state(a).unwrap().angular_velocity;
    let wb = world.angular_state(b).unwrap().angular_velocity;
    assert!(approx(wb - wa, 3.0, 1e-4));
    assert!(approx(wa, -1.5, 1e-4));

    assert!(world.set_motor_velocity(motor, -1.0));
    world.update();
    let wa = world.angular_state(a).unwrap().angular_velocity;
    let wb = world.angular_state(b).unwrap().angular_velocity;
    assert!(approx(wb - wa, -1.0, 1e-4));
}

#[test]
fn gear_couples_angular_velocities() {
    let mut world = World::new();
    let a = world.create_angular_state(0.0, 1.0);
    let b = world.create_angular_state(0.0, 1.0);
    world.create_gear_constraint(a, b, 2.0).unwrap();
    assert!(world.set_angular_velocity(a, 1.0));

    world.update();
    let wa = world.angular_state(a).unwrap().angular_velocity;
    let wb = world.angular_state(b).unwrap().angular_velocity;
    assert!(approx(wb, 2.0 * wa, 1e-4), "wa {wa} wb {wb}");
    assert!(wa > 0.0);
}

#[test]
fn deleting_a_body_cascades() {
    let mut world = World::new();
    let p1 = world.create_particle(Vec2::ZERO, 1.0, 1.0, 0).unwrap();
    let p2 = world.create_particle(Vec2::new(10.0, 0.0), 1.0, 1.0, 0).unwrap();
    let p3 = world.create_particle(Vec2::new(10.0, 10.0), 1.0, 1.0, 0).unwrap();
    let s1 = world.create_linear_spring(p1, p2, None).unwrap();
    let s2 = world.create_fixed_spring(p2, p3).unwrap();
    let hinge = world.create_angular_spring(s1.into(), s2.into()).unwrap();
    let segment = world.create_line_segment(p1, p3, 0.5).unwrap();
    let wheel = world.create_wheel(p2, 2.0).unwrap();
    let spin = world.wheel(wheel).unwrap().angular;
    let other = world.create_angular_state(0.0, 1.0);
    let motor = world.create_motor_constraint(spin, other, 1.0).unwrap();

    assert!(world.delete_body(p2));

    assert!(world.linear_spring(s1).is_none());
    assert!(world.fixed_spring(s2).is_none());
    assert!(world.angular_spring(hinge).is_none());
    assert!(world.wheel(wheel).is_none());
    assert!(world.angular_state(spin).is_none());
    assert!(world.motor(motor).is_none());
    assert!(world.line_segment(segment).is_some());
    assert!(world.angular_state(other).is_some());
    assert!(!world.delete_body(p2));

    // the survivors still step cleanly
    world.update();
    assert_eq!(world.bodies().len(), 2);
}

#[test]
fn delete_object_dispatches_by_id() {
    let mut world = World::new();
    let a = world.create_linear_state(Vec2::ZERO, 1.0).unwrap();
    let b = world.create_linear_state(Vec2::new(1.0, 0.0), 1.0).unwrap();
    let spring = world.create_linear_spring(a, b, None).unwrap();

    assert!(world.delete_object(spring.object_id()));
    assert!(world.linear_springs().is_empty());
    assert!(world.body(a).is_some());
    assert!(!world.delete_object(ObjectId(12345)));
}

#[test]
fn perf_stats_are_filled_only_when_enabled() {
    let mut world = World::new();
    world.create_particle(Vec2::ZERO, 1.0, 5.0, 0).unwrap();
    world.create_particle(Vec2::new(8.0, 0.0), 1.0, 5.0, 0).unwrap();

    world.update();
    assert_eq!(world.perf_stats(), PerfStats::default());

    world.enable_perf_metrics(true);
    world.update();
    let stats = world.perf_stats();
    assert_eq!(stats.body_count(), 2);
    assert_eq!(stats.active_collisions(), 1);
    assert_eq!(stats.iterations(), world.config().iterations);
    assert!(stats.occupied_cells() > 0);
    assert!(stats.step_ms() >= 0.0);
}

#[test]
fn set_config_rejects_invalid_values() {
    let mut world = World::new();
    let mut config = world.config().clone();
    config.cell_size = 0.0;
    assert!(world.set_config(config).is_err());
    assert!(approx(world.config().cell_size, crate::core::constants::DEFAULT_CELL_SIZE, 0.0));

    let mut config = world.config().clone();
    config.iterations = 2;
    config.cell_size = 50.0;
    assert!(world.set_config(config).is_ok());
    assert_eq!(world.grid.cell_size(), 50.0);
}
