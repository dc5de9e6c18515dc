#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::constants::DT;
use crate::core::math::Vec2;

use super::World;

/// Zero every accumulator, then seed it with this tick's gravity.
pub(super) fn begin_tick(world: &mut World) {
    let gravity_step: Vec2 = world.config.gravity * DT;
    for body in world.entities.bodies.iter_mut() {
        body.clear_impulse();
        body.add_velocity_change(gravity_step);
    }
    for state in world.entities.angular.iter_mut() {
        state.angular_impulse = 0.0;
    }
}

/// `v += impulse; x += v * DT` for every dynamic body and angular state.
pub(super) fn integrate(world: &mut World) {
    #[cfg(feature = "parallel")]
    {
        world
            .entities
            .bodies
            .as_mut_slice()
            .par_iter_mut()
            .for_each(|body| body.integrate(DT));
    }
    #[cfg(not(feature = "parallel"))]
    {
        for body in world.entities.bodies.iter_mut() {
            body.integrate(DT);
        }
    }

    for state in world.entities.angular.iter_mut() {
        state.integrate(DT);
    }
}
