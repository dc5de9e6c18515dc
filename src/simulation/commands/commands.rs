use log::{debug, warn};

use crate::core::error::{Result, SolverError};
use crate::core::math::Vec2;
use crate::domain::{
    AngularId, AngularSpringId, AngularState, Body, BodyId, FixedSpringId, GearId, LineSegment,
    LinkId, MotorId, SegmentId, SpringId, SpringParams, Wheel, WheelId,
};
use crate::systems::constraints::{
    relative_angle_vector, AngularSpring, FixedSpring, GearConstraint, LinearLink, LinearSpring,
    MotorConstraint,
};

use super::World;

/// Log a rejected creation and pass the error through.
fn rejected<T>(what: &str, err: SolverError) -> Result<T> {
    warn!("create_{what} rejected: {err}");
    Err(err)
}

fn check_radius(radius: f32) -> Result<()> {
    if radius > 0.0 && radius.is_finite() {
        Ok(())
    } else {
        Err(SolverError::InvalidShape("radius must be positive and finite"))
    }
}

fn check_position(position: Vec2) -> Result<()> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(SolverError::InvalidShape("position must be finite"))
    }
}

/// Both bodies exist and differ.
fn check_body_pair(world: &World, a: BodyId, b: BodyId) -> Result<()> {
    for id in [a, b] {
        if !world.entities.bodies.contains(id.object_id()) {
            return Err(SolverError::UnknownEntity(id.object_id()));
        }
    }
    if a == b {
        return Err(SolverError::DegenerateLink(a.object_id()));
    }
    Ok(())
}

fn check_angular_pair(world: &World, a: AngularId, b: AngularId) -> Result<()> {
    for id in [a, b] {
        if !world.entities.angular.contains(id.object_id()) {
            return Err(SolverError::UnknownEntity(id.object_id()));
        }
    }
    if a == b {
        return Err(SolverError::DegenerateLink(a.object_id()));
    }
    Ok(())
}

/// Current offset `b - a` between two existing bodies.
fn offset(world: &World, a: BodyId, b: BodyId) -> Vec2 {
    let bodies = &world.entities.bodies;
    match (bodies.get(a.object_id()), bodies.get(b.object_id())) {
        (Some(a), Some(b)) => b.position() - a.position(),
        _ => Vec2::ZERO,
    }
}

pub(super) fn create_point(world: &mut World, position: Vec2) -> Result<BodyId> {
    if let Err(err) = check_position(position) {
        return rejected("point", err);
    }
    let id = BodyId::from_object_id(world.next_object_id());
    world.entities.bodies.insert(Body::point(id, position));
    Ok(id)
}

pub(super) fn create_linear_state(
    world: &mut World,
    position: Vec2,
    mass: f32,
) -> Result<BodyId> {
    if let Err(err) = check_position(position) {
        return rejected("linear_state", err);
    }
    let id = BodyId::from_object_id(world.next_object_id());
    world.entities.bodies.insert(Body::linear_state(id, position, mass));
    Ok(id)
}

pub(super) fn create_particle(
    world: &mut World,
    position: Vec2,
    mass: f32,
    radius: f32,
    color: u32,
) -> Result<BodyId> {
    if let Err(err) = check_radius(radius).and_then(|_| check_position(position)) {
        return rejected("particle", err);
    }
    let id = BodyId::from_object_id(world.next_object_id());
    world.entities.bodies.insert(Body::particle(id, position, mass, radius, color));
    Ok(id)
}

pub(super) fn create_angular_state(world: &mut World, angle: f32, inertia: f32) -> AngularId {
    let id = AngularId::from_object_id(world.next_object_id());
    world.entities.angular.insert(AngularState::new(id, angle, inertia));
    id
}

pub(super) fn create_wheel(
    world: &mut World,
    center: BodyId,
    radius: f32,
    inertia: Option<f32>,
) -> Result<WheelId> {
    if let Err(err) = check_radius(radius) {
        return rejected("wheel", err);
    }
    let Some(center_body) = world.entities.bodies.get(center.object_id()) else {
        return rejected("wheel", SolverError::UnknownEntity(center.object_id()));
    };
    let inertia = inertia.unwrap_or(0.5 * center_body.mass() * radius * radius);

    let angular = create_angular_state(world, 0.0, inertia);
    let id = world.next_object_id();
    world.entities.wheels.insert(Wheel { id, center, angular, radius });
    debug!("wheel {id} on body {center} (inertia {inertia})");
    Ok(WheelId::from_object_id(id))
}

pub(super) fn create_line_segment(
    world: &mut World,
    a: BodyId,
    b: BodyId,
    radius: f32,
) -> Result<SegmentId> {
    if let Err(err) = check_body_pair(world, a, b).and_then(|_| check_radius(radius)) {
        return rejected("line_segment", err);
    }
    let id = world.next_object_id();
    world.entities.segments.insert(LineSegment { id, a, b, radius });
    Ok(SegmentId::from_object_id(id))
}

pub(super) fn create_linear_spring(
    world: &mut World,
    a: BodyId,
    b: BodyId,
    rest_length: Option<f32>,
    params: SpringParams,
) -> Result<SpringId> {
    if let Err(err) = check_body_pair(world, a, b) {
        return rejected("linear_spring", err);
    }
    let rest_length = rest_length.unwrap_or_else(|| offset(world, a, b).length());
    let id = SpringId::from_object_id(world.next_object_id());
    let mut spring = LinearSpring::new(id, a, b, rest_length, params);
    spring.compute_data(&world.entities.bodies);
    world.linear_springs.insert(spring);
    Ok(id)
}

pub(super) fn create_fixed_spring(
    world: &mut World,
    a: BodyId,
    b: BodyId,
    rest_offset: Option<Vec2>,
    params: SpringParams,
) -> Result<FixedSpringId> {
    if let Err(err) = check_body_pair(world, a, b) {
        return rejected("fixed_spring", err);
    }
    let rest_offset = rest_offset.unwrap_or_else(|| offset(world, a, b));
    let id = FixedSpringId::from_object_id(world.next_object_id());
    let mut spring = FixedSpring::new(id, a, b, rest_offset, params);
    spring.compute_data(&world.entities.bodies);
    world.fixed_springs.insert(spring);
    Ok(id)
}

/// Link of a live spring, with derived data fresh against current positions.
pub(super) fn link_for(world: &World, link: LinkId) -> Option<LinearLink> {
    let mut link = match link {
        LinkId::Linear(id) => world.linear_springs.get(id.object_id())?.link.clone(),
        LinkId::Fixed(id) => world.fixed_springs.get(id.object_id())?.link.clone(),
    };
    link.compute_data(&world.entities.bodies);
    Some(link)
}

pub(super) fn create_angular_spring(
    world: &mut World,
    link_a: LinkId,
    link_b: LinkId,
    rest_angle: Option<f32>,
    params: SpringParams,
) -> Result<AngularSpringId> {
    let Some(a) = link_for(world, link_a) else {
        return rejected("angular_spring", SolverError::UnknownEntity(link_a.object_id()));
    };
    let Some(b) = link_for(world, link_b) else {
        return rejected("angular_spring", SolverError::UnknownEntity(link_b.object_id()));
    };
    if link_a == link_b {
        return rejected("angular_spring", SolverError::DegenerateLink(link_a.object_id()));
    }
    let rest_angle_vector = match rest_angle {
        Some(angle) => Vec2::from_angle(angle),
        None => relative_angle_vector(a.angle_vector(), b.angle_vector()),
    };
    if rest_angle_vector.length_squared() == 0.0 {
        return rejected("angular_spring", SolverError::DegenerateLink(link_a.object_id()));
    }
    let id = AngularSpringId::from_object_id(world.next_object_id());
    world
        .angular_springs
        .insert(AngularSpring::new(id, link_a, link_b, rest_angle_vector, params));
    Ok(id)
}

pub(super) fn create_motor_constraint(
    world: &mut World,
    a: AngularId,
    b: AngularId,
    rest_velocity: f32,
) -> Result<MotorId> {
    if let Err(err) = check_angular_pair(world, a, b) {
        return rejected("motor_constraint", err);
    }
    let id = MotorId::from_object_id(world.next_object_id());
    let params = world.config.motor;
    world.motors.insert(MotorConstraint::new(id, a, b, rest_velocity, params));
    Ok(id)
}

pub(super) fn create_gear_constraint(
    world: &mut World,
    a: AngularId,
    b: AngularId,
    gear_ratio: f32,
) -> Result<GearId> {
    if let Err(err) = check_angular_pair(world, a, b) {
        return rejected("gear_constraint", err);
    }
    if !gear_ratio.is_finite() {
        return rejected("gear_constraint", SolverError::InvalidConfig("gear ratio must be finite"));
    }
    let id = GearId::from_object_id(world.next_object_id());
    let angular = &world.entities.angular;
    let states = (angular.get(a.object_id()), angular.get(b.object_id()));
    let (Some(state_a), Some(state_b)) = states else {
        return rejected("gear_constraint", SolverError::UnknownEntity(a.object_id()));
    };
    let gear = GearConstraint::new(id, state_a, state_b, gear_ratio, world.config.spring);
    world.gears.insert(gear);
    Ok(id)
}

pub(super) fn clear(world: &mut World) {
    world.entities.clear();
    world.linear_springs.clear();
    world.fixed_springs.clear();
    world.angular_springs.clear();
    world.motors.clear();
    world.gears.clear();
    world.collisions.clear();
    world.grid.clear();
    world.frame = 0;
    world.residual = 0.0;
    world.perf_stats.reset();
}
