use crate::core::error::Result;
use crate::core::math::Vec2;
use crate::domain::{AngularId, AngularSpringId, BodyId, GearId, MotorId, SolverConfig, SpringId};
use crate::spatial::hash_grid::SpatialHashGrid;

use super::perf_stats::PerfStats;
use super::World;

pub(super) fn set_config(world: &mut World, config: SolverConfig) -> Result<()> {
    config.validate()?;
    world.collisions.set_material(config.contact);
    world.collisions.set_buffer(config.collision_buffer);
    if config.cell_size != world.config.cell_size {
        world.grid = SpatialHashGrid::new(config.cell_size, config.collision_buffer);
    } else {
        world.grid.set_buffer(config.collision_buffer);
    }
    world.config = config;
    Ok(())
}

pub(super) fn enable_perf_metrics(world: &mut World, enabled: bool) {
    world.config.perf_enabled = enabled;
    if !enabled {
        world.perf_stats.reset();
    }
}

pub(super) fn get_perf_stats(world: &World) -> PerfStats {
    world.perf_stats.clone()
}

pub(super) fn set_gravity(world: &mut World, gravity: Vec2) {
    if gravity.is_finite() {
        world.config.gravity = gravity;
    }
}

pub(super) fn set_body_position(world: &mut World, id: BodyId, position: Vec2) -> bool {
    match world.entities.bodies.get_mut(id.object_id()) {
        Some(body) if position.is_finite() => {
            body.point.position = position;
            true
        }
        _ => false,
    }
}

pub(super) fn set_body_velocity(world: &mut World, id: BodyId, velocity: Vec2) -> bool {
    match world.entities.bodies.get_mut(id.object_id()) {
        Some(body) if body.motion.is_some() && velocity.is_finite() => {
            body.set_velocity(velocity);
            true
        }
        _ => false,
    }
}

pub(super) fn set_angular_velocity(
    world: &mut World,
    id: AngularId,
    angular_velocity: f32,
) -> bool {
    match world.entities.angular.get_mut(id.object_id()) {
        Some(state) if angular_velocity.is_finite() => {
            state.angular_velocity = angular_velocity;
            true
        }
        _ => false,
    }
}

pub(super) fn set_spring_rest_length(world: &mut World, id: SpringId, rest_length: f32) -> bool {
    match world.linear_springs.get_mut(id.object_id()) {
        Some(spring) if rest_length.is_finite() => {
            spring.set_rest_length(rest_length);
            true
        }
        _ => false,
    }
}

pub(super) fn set_angular_spring_rest_angle(
    world: &mut World,
    id: AngularSpringId,
    rest_angle: f32,
) -> bool {
    match world.angular_springs.get_mut(id.object_id()) {
        Some(spring) if rest_angle.is_finite() => {
            spring.set_rest_angle(rest_angle);
            true
        }
        _ => false,
    }
}

pub(super) fn set_motor_velocity(world: &mut World, id: MotorId, rest_velocity: f32) -> bool {
    match world.motors.get_mut(id.object_id()) {
        Some(motor) if rest_velocity.is_finite() => {
            motor.set_rest_velocity(rest_velocity);
            true
        }
        _ => false,
    }
}

pub(super) fn set_gear_ratio(world: &mut World, id: GearId, gear_ratio: f32) -> bool {
    if !gear_ratio.is_finite() {
        return false;
    }
    let Some(gear) = world.gears.get_mut(id.object_id()) else {
        return false;
    };
    let (a, b) = gear.states();
    let angular = &world.entities.angular;
    let states = (angular.get(a.object_id()), angular.get(b.object_id()));
    let (Some(state_a), Some(state_b)) = states else {
        return false;
    };
    gear.set_gear_ratio(gear_ratio, state_a.angle, state_b.angle);
    true
}
