//! Entity model - points, linear/angular state, particles, wheels, segments
//!
//! A `Body` is a `Point` plus optional capabilities:
//! - `motion` (velocity, impulse accumulator, mass) makes it a linear state
//! - `shape` (radius, color) on top of that makes it a collidable particle
//!
//! The impulse accumulator holds a velocity change: `apply_impulse(j)` adds
//! `j * inverse_mass`, and integration adds the accumulator to the velocity.

use std::f32::consts::PI;

use crate::core::math::{safe_inverse, Vec2};

use super::handle::{AngularId, BodyId, ObjectId, SegmentId, WheelId};
use super::store::{Identified, Store};

/// Mass (or inertia) with its guarded inverse. Zero inverse means static.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MassProps {
    value: f32,
    inverse: f32,
}

impl MassProps {
    pub const STATIC: MassProps = MassProps { value: 0.0, inverse: 0.0 };

    /// Non-positive or non-finite values collapse to static.
    pub fn new(value: f32) -> Self {
        let inverse = safe_inverse(value);
        if inverse > 0.0 {
            Self { value, inverse }
        } else {
            Self::STATIC
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    pub fn inverse(&self) -> f32 {
        self.inverse
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.inverse == 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub id: ObjectId,
    pub position: Vec2,
}

/// Velocity, impulse accumulator and mass of a linear state
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearMotion {
    pub velocity: Vec2,
    pub impulse: Vec2,
    pub mass: MassProps,
}

impl LinearMotion {
    pub fn new(mass: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            impulse: Vec2::ZERO,
            mass: MassProps::new(mass),
        }
    }
}

/// Collision circle carried by particles
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleShape {
    pub radius: f32,
    /// Packed ABGR, passed through to the renderer untouched
    pub color: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Point,
    LinearState,
    Particle,
}

/// Anything that receives impulses.
pub trait Massive {
    fn inverse_mass(&self) -> f32;
    /// Add `impulse * inverse_mass` to the impulse accumulator.
    fn apply_impulse(&mut self, impulse: Vec2);
}

/// Anything the broad-phase can bucket.
pub trait Collidable {
    fn collision_center(&self) -> Vec2;
    fn collision_radius(&self) -> Option<f32>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub point: Point,
    pub motion: Option<LinearMotion>,
    pub shape: Option<CircleShape>,
}

impl Body {
    pub fn point(id: BodyId, position: Vec2) -> Self {
        Self {
            point: Point { id: id.object_id(), position },
            motion: None,
            shape: None,
        }
    }

    pub fn linear_state(id: BodyId, position: Vec2, mass: f32) -> Self {
        Self {
            point: Point { id: id.object_id(), position },
            motion: Some(LinearMotion::new(mass)),
            shape: None,
        }
    }

    pub fn particle(id: BodyId, position: Vec2, mass: f32, radius: f32, color: u32) -> Self {
        Self {
            point: Point { id: id.object_id(), position },
            motion: Some(LinearMotion::new(mass)),
            shape: Some(CircleShape { radius, color }),
        }
    }

    #[inline]
    pub fn id(&self) -> BodyId {
        BodyId::from_object_id(self.point.id)
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.point.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.motion.map_or(Vec2::ZERO, |m| m.velocity)
    }

    #[inline]
    pub fn impulse(&self) -> Vec2 {
        self.motion.map_or(Vec2::ZERO, |m| m.impulse)
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.motion.map_or(0.0, |m| m.mass.value())
    }

    pub fn radius(&self) -> Option<f32> {
        self.shape.map(|s| s.radius)
    }

    pub fn color(&self) -> Option<u32> {
        self.shape.map(|s| s.color)
    }

    /// `mass / (π r²)`; `None` for bodies without a shape.
    pub fn density(&self) -> Option<f32> {
        let shape = self.shape?;
        let area = PI * shape.radius * shape.radius;
        Some(if area > 0.0 { self.mass() / area } else { 0.0 })
    }

    pub fn kind(&self) -> BodyKind {
        match (self.motion.is_some(), self.shape.is_some()) {
            (_, true) => BodyKind::Particle,
            (true, false) => BodyKind::LinearState,
            (false, false) => BodyKind::Point,
        }
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.inverse_mass() > 0.0
    }

    pub(crate) fn clear_impulse(&mut self) {
        if let Some(motion) = self.motion.as_mut() {
            motion.impulse = Vec2::ZERO;
        }
    }

    /// Add a velocity change directly, ignoring mass (gravity).
    pub(crate) fn add_velocity_change(&mut self, delta: Vec2) {
        if let Some(motion) = self.motion.as_mut() {
            if !motion.mass.is_static() {
                motion.impulse += delta;
            }
        }
    }

    pub(crate) fn set_velocity(&mut self, velocity: Vec2) {
        if let Some(motion) = self.motion.as_mut() {
            motion.velocity = velocity;
        }
    }

    /// Semi-implicit Euler. Static bodies keep their position.
    pub(crate) fn integrate(&mut self, dt: f32) {
        let Some(motion) = self.motion.as_mut() else {
            return;
        };
        if !motion.mass.is_static() {
            motion.velocity += motion.impulse;
            self.point.position += motion.velocity * dt;
        }
        motion.impulse = Vec2::ZERO;
    }
}

impl Massive for Body {
    #[inline]
    fn inverse_mass(&self) -> f32 {
        self.motion.map_or(0.0, |m| m.mass.inverse())
    }

    #[inline]
    fn apply_impulse(&mut self, impulse: Vec2) {
        if let Some(motion) = self.motion.as_mut() {
            let inv = motion.mass.inverse();
            if inv > 0.0 {
                motion.impulse += impulse * inv;
            }
        }
    }
}

impl Collidable for Body {
    fn collision_center(&self) -> Vec2 {
        self.point.position
    }

    fn collision_radius(&self) -> Option<f32> {
        self.radius()
    }
}

impl Identified for Body {
    fn object_id(&self) -> ObjectId {
        self.point.id
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AngularState {
    pub id: ObjectId,
    pub angle: f32,
    pub angular_velocity: f32,
    pub angular_impulse: f32,
    pub inertia: MassProps,
}

impl AngularState {
    pub fn new(id: AngularId, angle: f32, inertia: f32) -> Self {
        Self {
            id: id.object_id(),
            angle,
            angular_velocity: 0.0,
            angular_impulse: 0.0,
            inertia: MassProps::new(inertia),
        }
    }

    #[inline]
    pub fn handle(&self) -> AngularId {
        AngularId::from_object_id(self.id)
    }

    #[inline]
    pub fn inverse_inertia(&self) -> f32 {
        self.inertia.inverse()
    }

    /// Add `angular_impulse * inverse_inertia` to the accumulator.
    #[inline]
    pub fn apply_angular_impulse(&mut self, angular_impulse: f32) {
        let inv = self.inertia.inverse();
        if inv > 0.0 {
            self.angular_impulse += angular_impulse * inv;
        }
    }

    pub(crate) fn integrate(&mut self, dt: f32) {
        if !self.inertia.is_static() {
            self.angular_velocity += self.angular_impulse;
            self.angle += self.angular_velocity * dt;
        }
        self.angular_impulse = 0.0;
    }
}

impl Identified for AngularState {
    fn object_id(&self) -> ObjectId {
        self.id
    }
}

/// Rolling circle: a center body plus its own angular state
#[derive(Clone, Debug, PartialEq)]
pub struct Wheel {
    pub id: ObjectId,
    pub center: BodyId,
    pub angular: AngularId,
    pub radius: f32,
}

impl Wheel {
    #[inline]
    pub fn handle(&self) -> WheelId {
        WheelId::from_object_id(self.id)
    }
}

impl Identified for Wheel {
    fn object_id(&self) -> ObjectId {
        self.id
    }
}

/// Capsule between two bodies; `radius` is the collision thickness
#[derive(Clone, Debug, PartialEq)]
pub struct LineSegment {
    pub id: ObjectId,
    pub a: BodyId,
    pub b: BodyId,
    pub radius: f32,
}

impl LineSegment {
    #[inline]
    pub fn handle(&self) -> SegmentId {
        SegmentId::from_object_id(self.id)
    }

    #[inline]
    pub fn has_endpoint(&self, body: BodyId) -> bool {
        self.a == body || self.b == body
    }
}

impl Identified for LineSegment {
    fn object_id(&self) -> ObjectId {
        self.id
    }
}

/// Every entity the solver moves or collides, grouped so the collision
/// pipeline can borrow them together.
#[derive(Clone, Debug, Default)]
pub struct Entities {
    pub bodies: Store<Body>,
    pub angular: Store<AngularState>,
    pub wheels: Store<Wheel>,
    pub segments: Store<LineSegment>,
}

impl Entities {
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.angular.clear();
        self.wheels.clear();
        self.segments.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_id(raw: u32) -> BodyId {
        BodyId::from_object_id(ObjectId(raw))
    }

    #[test]
    fn non_positive_mass_is_static() {
        for mass in [0.0, -3.0, f32::NAN, f32::INFINITY] {
            let body = Body::linear_state(body_id(1), Vec2::ZERO, mass);
            assert_eq!(body.inverse_mass(), 0.0);
            assert!(!body.is_dynamic());
        }
        let body = Body::linear_state(body_id(1), Vec2::ZERO, 4.0);
        assert_eq!(body.inverse_mass(), 0.25);
    }

    #[test]
    fn static_body_ignores_impulses_and_integration() {
        let mut body = Body::particle(body_id(1), Vec2::new(2.0, 3.0), 0.0, 1.0, 0);
        body.apply_impulse(Vec2::new(100.0, -50.0));
        body.add_velocity_change(Vec2::new(0.0, 9.0));
        body.integrate(1.0 / 60.0);
        assert_eq!(body.position(), Vec2::new(2.0, 3.0));
        assert_eq!(body.impulse(), Vec2::ZERO);
    }

    #[test]
    fn plain_point_never_moves() {
        let mut body = Body::point(body_id(2), Vec2::new(1.0, 1.0));
        assert_eq!(body.kind(), BodyKind::Point);
        body.apply_impulse(Vec2::new(1.0, 0.0));
        body.integrate(1.0);
        assert_eq!(body.position(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn integration_is_semi_implicit() {
        let mut body = Body::linear_state(body_id(3), Vec2::ZERO, 2.0);
        body.apply_impulse(Vec2::new(4.0, 0.0));
        body.integrate(0.5);
        // v = 0 + 4 * 0.5 = 2; x = 2 * 0.5 = 1
        assert_eq!(body.velocity(), Vec2::new(2.0, 0.0));
        assert_eq!(body.position(), Vec2::new(1.0, 0.0));
        assert_eq!(body.impulse(), Vec2::ZERO);
    }

    #[test]
    fn particle_density() {
        let body = Body::particle(body_id(4), Vec2::ZERO, PI, 1.0, 0xFFFF_FFFF);
        assert!((body.density().unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(body.kind(), BodyKind::Particle);
    }

    #[test]
    fn angular_state_static_inertia() {
        let mut state = AngularState::new(AngularId::from_object_id(ObjectId(9)), 0.5, 0.0);
        state.apply_angular_impulse(3.0);
        state.integrate(1.0);
        assert_eq!(state.angle, 0.5);
        assert_eq!(state.angular_velocity, 0.0);
    }
}
