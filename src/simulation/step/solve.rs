//! Sequential-impulse passes over every constraint.
//!
//! Order within a pass: motors, gears, angular springs, linear springs,
//! fixed springs, collisions. Each constraint reads the impulse
//! accumulators its predecessors wrote (Gauss-Seidel).

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::domain::{Entities, LinkId};
use crate::systems::constraints::LinkFrame;

use super::World;

/// Refresh slots and geometry of every constraint from current positions.
pub(super) fn compute_data(world: &mut World) {
    let World {
        entities,
        linear_springs,
        fixed_springs,
        angular_springs,
        motors,
        gears,
        collisions,
        ..
    } = world;
    let bodies = &entities.bodies;

    #[cfg(feature = "parallel")]
    {
        linear_springs
            .as_mut_slice()
            .par_iter_mut()
            .for_each(|spring| spring.compute_data(bodies));
        fixed_springs
            .as_mut_slice()
            .par_iter_mut()
            .for_each(|spring| spring.compute_data(bodies));
    }
    #[cfg(not(feature = "parallel"))]
    {
        for spring in linear_springs.iter_mut() {
            spring.compute_data(bodies);
        }
        for spring in fixed_springs.iter_mut() {
            spring.compute_data(bodies);
        }
    }

    // angular springs read the link frames computed just above
    let frame_of = |link: LinkId| -> Option<LinkFrame> {
        match link {
            LinkId::Linear(id) => linear_springs.get(id.object_id()).map(|s| s.link().frame()),
            LinkId::Fixed(id) => fixed_springs.get(id.object_id()).map(|s| s.link().frame()),
        }
    };
    for spring in angular_springs.iter_mut() {
        spring.compute_data(&frame_of);
    }

    for motor in motors.iter_mut() {
        motor.compute_data(&entities.angular);
    }
    for gear in gears.iter_mut() {
        gear.compute_data(&entities.angular);
    }
    collisions.compute_data(entities.bodies.as_slice(), entities.angular.as_slice());
}

pub(super) fn compute_rest_impulse(world: &mut World) {
    let World {
        entities,
        linear_springs,
        fixed_springs,
        angular_springs,
        motors,
        gears,
        collisions,
        ..
    } = world;
    let bodies = entities.bodies.as_slice();
    let angular = entities.angular.as_slice();

    for motor in motors.iter_mut() {
        motor.compute_rest_impulse(angular);
    }
    for gear in gears.iter_mut() {
        gear.compute_rest_impulse(angular);
    }
    for spring in angular_springs.iter_mut() {
        spring.compute_rest_impulse();
    }
    for spring in linear_springs.iter_mut() {
        spring.compute_rest_impulse(bodies);
    }
    for spring in fixed_springs.iter_mut() {
        spring.compute_rest_impulse(bodies);
    }
    collisions.compute_rest_impulse(bodies, angular);
}

/// Re-apply a fraction of last tick's accumulated impulses.
pub(super) fn warm_start(world: &mut World) {
    let World {
        entities,
        linear_springs,
        fixed_springs,
        angular_springs,
        motors,
        gears,
        collisions,
        ..
    } = world;
    let Entities { bodies, angular, .. } = entities;
    let bodies = bodies.as_mut_slice();
    let angular = angular.as_mut_slice();

    for motor in motors.iter_mut() {
        motor.apply_warm_start(angular);
    }
    for gear in gears.iter_mut() {
        gear.apply_warm_start(angular);
    }
    for spring in angular_springs.iter_mut() {
        spring.apply_warm_start(bodies);
    }
    for spring in linear_springs.iter_mut() {
        spring.apply_warm_start(bodies);
    }
    for spring in fixed_springs.iter_mut() {
        spring.apply_warm_start(bodies);
    }
    collisions.apply_warm_start(bodies, angular);
}

/// One corrective pass; returns the largest residual seen.
pub(super) fn corrective_pass(world: &mut World) -> f32 {
    let World {
        entities,
        linear_springs,
        fixed_springs,
        angular_springs,
        motors,
        gears,
        collisions,
        ..
    } = world;
    let Entities { bodies, angular, .. } = entities;
    let bodies = bodies.as_mut_slice();
    let angular = angular.as_mut_slice();
    let mut residual: f32 = 0.0;

    for motor in motors.iter_mut() {
        residual = residual.max(motor.apply_corrective_impulse(angular));
    }
    for gear in gears.iter_mut() {
        residual = residual.max(gear.apply_corrective_impulse(angular));
    }
    for spring in angular_springs.iter_mut() {
        residual = residual.max(spring.apply_corrective_impulse(bodies));
    }
    for spring in linear_springs.iter_mut() {
        residual = residual.max(spring.apply_corrective_impulse(bodies));
    }
    for spring in fixed_springs.iter_mut() {
        residual = residual.max(spring.apply_corrective_impulse(bodies));
    }
    residual.max(collisions.apply_corrective_impulse(bodies, angular))
}
