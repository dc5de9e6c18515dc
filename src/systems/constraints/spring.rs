//! Linear and fixed springs
//!
//! Both share the same velocity-level law with a Baumgarte position term:
//! `rest_impulse = -(position_error * stiffness * INV_DT + velocity_error * damping)`.
//! `rest_impulse` is the relative velocity change the spring wants this tick;
//! each Gauss-Seidel pass pushes the endpoints' accumulated relative impulse
//! toward it.

use crate::core::constants::INV_DT;
use crate::core::math::Vec2;
use crate::domain::{Body, BodyId, Identified, ObjectId, SpringId, SpringParams, Store};
use crate::domain::handle::FixedSpringId;

use super::link::LinearLink;

#[derive(Clone, Debug, PartialEq)]
pub struct LinearSpring {
    pub(crate) id: SpringId,
    pub(crate) link: LinearLink,
    pub(crate) stiffness: f32,
    pub(crate) damping: f32,
    pub(crate) warm_start: f32,
    pub(crate) rest_length: f32,
    pub(crate) rest_impulse: f32,
    pub(crate) accumulated_impulse: f32,
}

impl LinearSpring {
    pub(crate) fn new(
        id: SpringId,
        a: BodyId,
        b: BodyId,
        rest_length: f32,
        params: SpringParams,
    ) -> Self {
        Self {
            id,
            link: LinearLink::new(a, b),
            stiffness: params.stiffness,
            damping: params.damping,
            warm_start: params.warm_start,
            rest_length,
            rest_impulse: 0.0,
            accumulated_impulse: 0.0,
        }
    }

    pub fn id(&self) -> SpringId {
        self.id
    }

    pub fn link(&self) -> &LinearLink {
        &self.link
    }

    pub fn rest_length(&self) -> f32 {
        self.rest_length
    }

    pub fn rest_impulse(&self) -> f32 {
        self.rest_impulse
    }

    pub fn accumulated_impulse(&self) -> f32 {
        self.accumulated_impulse
    }

    pub(crate) fn set_rest_length(&mut self, rest_length: f32) {
        self.rest_length = rest_length.max(0.0);
    }

    pub(crate) fn compute_data(&mut self, bodies: &Store<Body>) {
        self.link.compute_data(bodies);
    }

    pub(crate) fn compute_rest_impulse(&mut self, bodies: &[Body]) {
        if !self.link.is_active() {
            self.rest_impulse = 0.0;
            return;
        }
        let axis = self.link.angle_vector;
        let position_error = axis.dot(self.link.length_vector) - self.rest_length;
        let velocity_error = axis.dot(self.link.relative_velocity(bodies));
        self.rest_impulse =
            -(position_error * self.stiffness * INV_DT + velocity_error * self.damping);
    }

    pub(crate) fn apply_warm_start(&mut self, bodies: &mut [Body]) {
        let seed = self.accumulated_impulse * self.warm_start;
        self.accumulated_impulse = 0.0;
        if !self.link.is_active() || seed == 0.0 {
            return;
        }
        self.link.apply_pair_impulse(bodies, self.link.angle_vector * seed);
        self.accumulated_impulse = seed;
    }

    /// One Gauss-Seidel correction; returns `|impulse_error|`.
    pub(crate) fn apply_corrective_impulse(&mut self, bodies: &mut [Body]) -> f32 {
        if !self.link.is_active() {
            return 0.0;
        }
        let axis = self.link.angle_vector;
        let projected = axis.dot(self.link.relative_impulse(bodies));
        let impulse_error = projected - self.rest_impulse;
        let corrective = -impulse_error * self.link.reduced_mass;
        self.accumulated_impulse += corrective;
        self.link.apply_pair_impulse(bodies, axis * corrective);
        impulse_error.abs()
    }
}

impl Identified for LinearSpring {
    fn object_id(&self) -> ObjectId {
        self.id.object_id()
    }
}

/// Rigid attachment: holds the full separation vector, not just its length.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedSpring {
    pub(crate) id: FixedSpringId,
    pub(crate) link: LinearLink,
    pub(crate) stiffness: f32,
    pub(crate) damping: f32,
    pub(crate) warm_start: f32,
    pub(crate) rest_length: Vec2,
    pub(crate) rest_impulse: Vec2,
    pub(crate) accumulated_impulse: Vec2,
}

impl FixedSpring {
    pub(crate) fn new(
        id: FixedSpringId,
        a: BodyId,
        b: BodyId,
        rest_length: Vec2,
        params: SpringParams,
    ) -> Self {
        Self {
            id,
            link: LinearLink::new(a, b),
            stiffness: params.stiffness,
            damping: params.damping,
            warm_start: params.warm_start,
            rest_length,
            rest_impulse: Vec2::ZERO,
            accumulated_impulse: Vec2::ZERO,
        }
    }

    pub fn id(&self) -> FixedSpringId {
        self.id
    }

    pub fn link(&self) -> &LinearLink {
        &self.link
    }

    pub fn rest_length(&self) -> Vec2 {
        self.rest_length
    }

    pub fn rest_impulse(&self) -> Vec2 {
        self.rest_impulse
    }

    pub fn accumulated_impulse(&self) -> Vec2 {
        self.accumulated_impulse
    }

    pub(crate) fn compute_data(&mut self, bodies: &Store<Body>) {
        self.link.compute_data(bodies);
    }

    pub(crate) fn compute_rest_impulse(&mut self, bodies: &[Body]) {
        if !self.link.is_active() {
            self.rest_impulse = Vec2::ZERO;
            return;
        }
        let position_error = self.link.length_vector - self.rest_length;
        let velocity_error = self.link.relative_velocity(bodies);
        self.rest_impulse =
            -(position_error * (self.stiffness * INV_DT) + velocity_error * self.damping);
    }

    pub(crate) fn apply_warm_start(&mut self, bodies: &mut [Body]) {
        let seed = self.accumulated_impulse * self.warm_start;
        self.accumulated_impulse = Vec2::ZERO;
        if !self.link.is_active() || seed == Vec2::ZERO {
            return;
        }
        self.link.apply_pair_impulse(bodies, seed);
        self.accumulated_impulse = seed;
    }

    pub(crate) fn apply_corrective_impulse(&mut self, bodies: &mut [Body]) -> f32 {
        if !self.link.is_active() {
            return 0.0;
        }
        let projected = self.link.relative_impulse(bodies);
        let impulse_error = projected - self.rest_impulse;
        let corrective = -impulse_error * self.link.reduced_mass;
        self.accumulated_impulse += corrective;
        self.link.apply_pair_impulse(bodies, corrective);
        impulse_error.length()
    }
}

impl Identified for FixedSpring {
    fn object_id(&self) -> ObjectId {
        self.id.object_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::DT;

    fn id(raw: u32) -> BodyId {
        BodyId::from_object_id(ObjectId(raw))
    }

    fn two_bodies(mass_a: f32, pos_b: Vec2) -> Store<Body> {
        let mut store = Store::new();
        store.insert(Body::linear_state(id(1), Vec2::ZERO, mass_a));
        store.insert(Body::linear_state(id(2), pos_b, 1.0));
        store
    }

    fn tick_spring(spring: &mut LinearSpring, store: &mut Store<Body>, iterations: usize) {
        spring.compute_data(store);
        spring.compute_rest_impulse(store.as_slice());
        spring.apply_warm_start(store.as_mut_slice());
        for _ in 0..iterations {
            spring.apply_corrective_impulse(store.as_mut_slice());
        }
        for body in store.iter_mut() {
            body.integrate(DT);
        }
    }

    #[test]
    fn single_spring_converges_in_one_pass() {
        let mut store = two_bodies(1.0, Vec2::new(12.0, 0.0));
        let params = SpringParams { stiffness: 1.0, damping: 1.0, warm_start: 0.0 };
        let spring_id = SpringId::from_object_id(ObjectId(3));
        let mut spring = LinearSpring::new(spring_id, id(1), id(2), 10.0, params);
        tick_spring(&mut spring, &mut store, 1);
        let distance = (store[1].position() - store[0].position()).length();
        assert!((distance - 10.0).abs() < 1e-3, "distance {distance}");
    }

    #[test]
    fn static_endpoint_is_never_moved() {
        let mut store = two_bodies(0.0, Vec2::new(12.0, 0.0));
        let mut spring = LinearSpring::new(
            SpringId::from_object_id(ObjectId(3)),
            id(1),
            id(2),
            10.0,
            SpringParams::default(),
        );
        for _ in 0..20 {
            tick_spring(&mut spring, &mut store, 4);
        }
        assert_eq!(store[0].position(), Vec2::ZERO);
        let distance = store[1].position().length();
        assert!((distance - 10.0).abs() < 0.05, "distance {distance}");
    }

    #[test]
    fn warm_start_seeds_and_keeps_accumulator() {
        let mut store = two_bodies(1.0, Vec2::new(10.0, 0.0));
        let params = SpringParams { stiffness: 0.5, damping: 1.0, warm_start: 0.5 };
        let spring_id = SpringId::from_object_id(ObjectId(3));
        let mut spring = LinearSpring::new(spring_id, id(1), id(2), 10.0, params);
        spring.accumulated_impulse = 4.0;
        spring.compute_data(&store);
        spring.apply_warm_start(store.as_mut_slice());
        assert_eq!(spring.accumulated_impulse(), 2.0);
        // unit masses: each endpoint gets ±2 along x
        assert_eq!(store[1].impulse(), Vec2::new(2.0, 0.0));
        assert_eq!(store[0].impulse(), Vec2::new(-2.0, 0.0));
    }

    #[test]
    fn fixed_spring_restores_offset_vector() {
        let mut store = two_bodies(1.0, Vec2::new(0.0, 5.0));
        let params = SpringParams { stiffness: 1.0, damping: 1.0, warm_start: 0.0 };
        let mut spring = FixedSpring::new(
            FixedSpringId::from_object_id(ObjectId(3)),
            id(1),
            id(2),
            Vec2::new(5.0, 0.0),
            params,
        );
        spring.compute_data(&store);
        spring.compute_rest_impulse(store.as_slice());
        let error = spring.apply_corrective_impulse(store.as_mut_slice());
        assert!(error > 0.0);
        assert!(spring.apply_corrective_impulse(store.as_mut_slice()) < 1e-3);
        for body in store.iter_mut() {
            body.integrate(DT);
        }
        let offset = store[1].position() - store[0].position();
        assert!((offset - Vec2::new(5.0, 0.0)).length() < 1e-3, "offset {offset:?}");
    }
}
