//! Angular spring between two links.
//!
//! The relative angle is carried as a unit vector `(cos θ, sin θ)` so no
//! trigonometry runs per tick; the angle error is `sin(θ - θ_rest)`.

use crate::core::constants::INV_DT;
use crate::core::math::{safe_inverse, Vec2};
use crate::domain::{AngularSpringId, Body, Identified, LinkId, ObjectId, SpringParams};

use super::link::LinkFrame;

/// `(a·b, a×b)`: cosine and sine of the angle from `a` to `b`.
#[inline]
pub fn relative_angle_vector(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new(a.dot(b), a.perp_dot(b))
}

#[derive(Clone, Debug, PartialEq)]
pub struct AngularSpring {
    pub(crate) id: AngularSpringId,
    pub(crate) link_a: LinkId,
    pub(crate) link_b: LinkId,
    pub(crate) stiffness: f32,
    pub(crate) damping: f32,
    pub(crate) warm_start: f32,
    pub(crate) rest_angle_vector: Vec2,
    pub(crate) angle_vector: Vec2,
    pub(crate) frame_a: LinkFrame,
    pub(crate) frame_b: LinkFrame,
    pub(crate) reduced_inertia: f32,
    pub(crate) rest_impulse: f32,
    pub(crate) accumulated_impulse: f32,
}

impl AngularSpring {
    pub(crate) fn new(
        id: AngularSpringId,
        link_a: LinkId,
        link_b: LinkId,
        rest_angle_vector: Vec2,
        params: SpringParams,
    ) -> Self {
        Self {
            id,
            link_a,
            link_b,
            stiffness: params.stiffness,
            damping: params.damping,
            warm_start: params.warm_start,
            rest_angle_vector: rest_angle_vector.normalize(),
            angle_vector: Vec2::UNIT_X,
            frame_a: LinkFrame::default(),
            frame_b: LinkFrame::default(),
            reduced_inertia: 0.0,
            rest_impulse: 0.0,
            accumulated_impulse: 0.0,
        }
    }

    pub fn id(&self) -> AngularSpringId {
        self.id
    }

    pub fn links(&self) -> (LinkId, LinkId) {
        (self.link_a, self.link_b)
    }

    #[inline]
    pub fn uses_link(&self, link: LinkId) -> bool {
        self.link_a == link || self.link_b == link
    }

    pub fn rest_angle_vector(&self) -> Vec2 {
        self.rest_angle_vector
    }

    pub fn angle_vector(&self) -> Vec2 {
        self.angle_vector
    }

    /// Current relative angle in radians, in `(-π, π]`.
    pub fn angle(&self) -> f32 {
        self.angle_vector.y.atan2(self.angle_vector.x)
    }

    pub fn reduced_inertia(&self) -> f32 {
        self.reduced_inertia
    }

    pub fn accumulated_impulse(&self) -> f32 {
        self.accumulated_impulse
    }

    pub(crate) fn set_rest_angle(&mut self, angle: f32) {
        self.rest_angle_vector = Vec2::from_angle(angle);
    }

    /// Pull fresh frames of both links. Links must have run their own
    /// `compute_data` first this tick.
    pub(crate) fn compute_data(&mut self, frame_of: impl Fn(LinkId) -> Option<LinkFrame>) {
        let (Some(frame_a), Some(frame_b)) = (frame_of(self.link_a), frame_of(self.link_b)) else {
            self.reduced_inertia = 0.0;
            return;
        };
        self.frame_a = frame_a;
        self.frame_b = frame_b;
        if frame_a.length <= 0.0 || frame_b.length <= 0.0 {
            self.reduced_inertia = 0.0;
            return;
        }
        self.angle_vector = relative_angle_vector(frame_a.angle_vector, frame_b.angle_vector);
        self.reduced_inertia = safe_inverse(frame_a.inverse_inertia + frame_b.inverse_inertia);
    }

    #[inline]
    fn is_active(&self) -> bool {
        self.reduced_inertia > 0.0
    }

    pub(crate) fn compute_rest_impulse(&mut self) {
        if !self.is_active() {
            self.rest_impulse = 0.0;
            return;
        }
        let angle_error = self.rest_angle_vector.perp_dot(self.angle_vector);
        let velocity_error = self.frame_b.angular_velocity - self.frame_a.angular_velocity;
        self.rest_impulse =
            -(angle_error * self.stiffness * INV_DT + velocity_error * self.damping);
    }

    fn apply_angular_impulse(&self, bodies: &mut [Body], l: f32) {
        self.frame_a.apply_angular_impulse(bodies, -l);
        self.frame_b.apply_angular_impulse(bodies, l);
    }

    pub(crate) fn apply_warm_start(&mut self, bodies: &mut [Body]) {
        let seed = self.accumulated_impulse * self.warm_start;
        self.accumulated_impulse = 0.0;
        if !self.is_active() || seed == 0.0 {
            return;
        }
        self.apply_angular_impulse(bodies, seed);
        self.accumulated_impulse = seed;
    }

    pub(crate) fn apply_corrective_impulse(&mut self, bodies: &mut [Body]) -> f32 {
        if !self.is_active() {
            return 0.0;
        }
        let projected =
            self.frame_b.angular_impulse_delta(bodies) - self.frame_a.angular_impulse_delta(bodies);
        let impulse_error = projected - self.rest_impulse;
        let corrective = -impulse_error * self.reduced_inertia;
        self.accumulated_impulse += corrective;
        self.apply_angular_impulse(bodies, corrective);
        impulse_error.abs()
    }
}

impl Identified for AngularSpring {
    fn object_id(&self) -> ObjectId {
        self.id.object_id()
    }
}
