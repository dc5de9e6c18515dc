//! Cascade deletion. Removing an object removes everything that refers to it
//! so no constraint or collision is ever left pointing at a missing id.

use log::debug;

use crate::domain::{
    AngularId, AngularSpringId, BodyId, FixedSpringId, GearId, LinkId, MotorId, ObjectId, SegmentId,
    SpringId, WheelId,
};

use super::World;

pub(super) fn delete_body(world: &mut World, id: BodyId) -> bool {
    if world.entities.bodies.remove(id.object_id()).is_none() {
        return false;
    }
    world.collisions.remove_involving(id.object_id());

    for segment in world.entities.segments.ids_where(|s| s.has_endpoint(id)) {
        delete_line_segment(world, SegmentId::from_object_id(segment));
    }
    for spring in world.linear_springs.ids_where(|s| s.link().has_endpoint(id)) {
        delete_link(world, LinkId::Linear(SpringId::from_object_id(spring)));
    }
    for spring in world.fixed_springs.ids_where(|s| s.link().has_endpoint(id)) {
        delete_link(world, LinkId::Fixed(FixedSpringId::from_object_id(spring)));
    }
    for wheel in world.entities.wheels.ids_where(|w| w.center == id) {
        delete_wheel(world, WheelId::from_object_id(wheel));
    }
    debug!("deleted body {id}");
    true
}

pub(super) fn delete_angular_state(world: &mut World, id: AngularId) -> bool {
    if world.entities.angular.remove(id.object_id()).is_none() {
        return false;
    }
    for motor in world.motors.ids_where(|m| m.uses_state(id)) {
        world.motors.remove(motor);
    }
    for gear in world.gears.ids_where(|g| g.uses_state(id)) {
        world.gears.remove(gear);
    }
    // a wheel without its spin state is meaningless
    for wheel in world.entities.wheels.ids_where(|w| w.angular == id) {
        world.entities.wheels.remove(wheel);
        world.collisions.remove_involving(wheel);
    }
    true
}

pub(super) fn delete_wheel(world: &mut World, id: WheelId) -> bool {
    let Some(wheel) = world.entities.wheels.remove(id.object_id()) else {
        return false;
    };
    world.collisions.remove_involving(id.object_id());
    delete_angular_state(world, wheel.angular);
    true
}

pub(super) fn delete_line_segment(world: &mut World, id: SegmentId) -> bool {
    if world.entities.segments.remove(id.object_id()).is_none() {
        return false;
    }
    world.collisions.remove_involving(id.object_id());
    true
}

/// Remove a linear or fixed spring plus the angular springs measuring it.
pub(super) fn delete_link(world: &mut World, link: LinkId) -> bool {
    let removed = match link {
        LinkId::Linear(id) => world.linear_springs.remove(id.object_id()).is_some(),
        LinkId::Fixed(id) => world.fixed_springs.remove(id.object_id()).is_some(),
    };
    if removed {
        for spring in world.angular_springs.ids_where(|s| s.uses_link(link)) {
            world.angular_springs.remove(spring);
        }
    }
    removed
}

pub(super) fn delete_angular_spring(world: &mut World, id: AngularSpringId) -> bool {
    world.angular_springs.remove(id.object_id()).is_some()
}

pub(super) fn delete_motor_constraint(world: &mut World, id: MotorId) -> bool {
    world.motors.remove(id.object_id()).is_some()
}

pub(super) fn delete_gear_constraint(world: &mut World, id: GearId) -> bool {
    world.gears.remove(id.object_id()).is_some()
}

/// Dispatch on whichever store holds `id`.
pub(super) fn delete_object(world: &mut World, id: ObjectId) -> bool {
    if world.entities.bodies.contains(id) {
        delete_body(world, BodyId::from_object_id(id))
    } else if world.entities.wheels.contains(id) {
        delete_wheel(world, WheelId::from_object_id(id))
    } else if world.entities.angular.contains(id) {
        delete_angular_state(world, AngularId::from_object_id(id))
    } else if world.entities.segments.contains(id) {
        delete_line_segment(world, SegmentId::from_object_id(id))
    } else if world.linear_springs.contains(id) {
        delete_link(world, LinkId::Linear(SpringId::from_object_id(id)))
    } else if world.fixed_springs.contains(id) {
        delete_link(world, LinkId::Fixed(FixedSpringId::from_object_id(id)))
    } else if world.angular_springs.contains(id) {
        delete_angular_spring(world, AngularSpringId::from_object_id(id))
    } else if world.motors.contains(id) {
        delete_motor_constraint(world, MotorId::from_object_id(id))
    } else if world.gears.contains(id) {
        delete_gear_constraint(world, GearId::from_object_id(id))
    } else {
        false
    }
}
