use crate::core::math::{safe_inverse, Vec2, LENGTH_EPSILON};
use crate::domain::{Body, BodyId, Massive, Store};

/// Per-tick snapshot of a link's geometry, enough to read and apply
/// impulses through it without borrowing the link itself.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinkFrame {
    pub(crate) slot_a: usize,
    pub(crate) slot_b: usize,
    pub angle_vector: Vec2,
    pub length: f32,
    pub inverse_inertia: f32,
    pub angular_velocity: f32,
}

impl LinkFrame {
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.length <= LENGTH_EPSILON || self.inverse_inertia == 0.0
    }

    /// Angular velocity change of the link produced by the impulses
    /// accumulated on its endpoints so far this tick.
    #[inline]
    pub(crate) fn angular_impulse_delta(&self, bodies: &[Body]) -> f32 {
        if self.is_degenerate() {
            return 0.0;
        }
        let delta = fast!(bodies, [self.slot_b]).impulse() - fast!(bodies, [self.slot_a]).impulse();
        self.angle_vector.perp_dot(delta) / self.length
    }

    /// Apply angular impulse `l` as a couple on the endpoints.
    #[inline]
    pub(crate) fn apply_angular_impulse(&self, bodies: &mut [Body], l: f32) {
        if self.is_degenerate() {
            return;
        }
        let j = self.angle_vector.perp() * (l / self.length);
        fast!(mut bodies, [self.slot_a]).apply_impulse(-j);
        fast!(mut bodies, [self.slot_b]).apply_impulse(j);
    }
}

/// Two linear states plus the geometry derived from them each tick
#[derive(Clone, Debug, PartialEq)]
pub struct LinearLink {
    pub(crate) a: BodyId,
    pub(crate) b: BodyId,
    pub(crate) slot_a: usize,
    pub(crate) slot_b: usize,
    pub(crate) length_vector: Vec2,
    pub(crate) angle_vector: Vec2,
    pub(crate) length: f32,
    pub(crate) mass: f32,
    pub(crate) reduced_mass: f32,
    pub(crate) inertia: f32,
    pub(crate) inverse_inertia: f32,
    pub(crate) angular_velocity: f32,
}

impl LinearLink {
    pub(crate) fn new(a: BodyId, b: BodyId) -> Self {
        Self {
            a,
            b,
            slot_a: 0,
            slot_b: 0,
            length_vector: Vec2::ZERO,
            angle_vector: Vec2::ZERO,
            length: 0.0,
            mass: 0.0,
            reduced_mass: 0.0,
            inertia: 0.0,
            inverse_inertia: 0.0,
            angular_velocity: 0.0,
        }
    }

    pub fn endpoints(&self) -> (BodyId, BodyId) {
        (self.a, self.b)
    }

    #[inline]
    pub fn has_endpoint(&self, body: BodyId) -> bool {
        self.a == body || self.b == body
    }

    pub fn length_vector(&self) -> Vec2 {
        self.length_vector
    }

    pub fn angle_vector(&self) -> Vec2 {
        self.angle_vector
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn reduced_mass(&self) -> f32 {
        self.reduced_mass
    }

    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    pub fn inverse_inertia(&self) -> f32 {
        self.inverse_inertia
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    /// Refresh slots and derived geometry. A link whose endpoints are gone
    /// goes inert (zero reduced mass) instead of failing.
    pub(crate) fn compute_data(&mut self, bodies: &Store<Body>) {
        let slots = (bodies.slot(self.a.object_id()), bodies.slot(self.b.object_id()));
        let (Some(slot_a), Some(slot_b)) = slots else {
            self.reduced_mass = 0.0;
            self.inertia = 0.0;
            self.inverse_inertia = 0.0;
            self.angle_vector = Vec2::ZERO;
            self.length = 0.0;
            return;
        };
        self.slot_a = slot_a;
        self.slot_b = slot_b;

        let body_a = &bodies[slot_a];
        let body_b = &bodies[slot_b];

        self.length_vector = body_b.position() - body_a.position();
        self.length = self.length_vector.length();
        self.angle_vector = if self.length > LENGTH_EPSILON {
            self.length_vector / self.length
        } else {
            Vec2::ZERO
        };

        let k = body_a.inverse_mass() + body_b.inverse_mass();
        self.mass = body_a.mass() + body_b.mass();
        self.reduced_mass = safe_inverse(k);

        if self.length > LENGTH_EPSILON && k > 0.0 {
            let length_sq = self.length * self.length;
            self.inverse_inertia = k / length_sq;
            self.inertia = self.reduced_mass * length_sq;
            let dv = body_b.velocity() - body_a.velocity();
            self.angular_velocity = self.length_vector.perp_dot(dv) / length_sq;
        } else {
            self.inverse_inertia = 0.0;
            self.inertia = 0.0;
            self.angular_velocity = 0.0;
        }
    }

    pub fn frame(&self) -> LinkFrame {
        LinkFrame {
            slot_a: self.slot_a,
            slot_b: self.slot_b,
            angle_vector: self.angle_vector,
            length: self.length,
            inverse_inertia: self.inverse_inertia,
            angular_velocity: self.angular_velocity,
        }
    }

    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.reduced_mass > 0.0
    }

    #[inline]
    pub(crate) fn relative_velocity(&self, bodies: &[Body]) -> Vec2 {
        fast!(bodies, [self.slot_b]).velocity() - fast!(bodies, [self.slot_a]).velocity()
    }

    #[inline]
    pub(crate) fn relative_impulse(&self, bodies: &[Body]) -> Vec2 {
        fast!(bodies, [self.slot_b]).impulse() - fast!(bodies, [self.slot_a]).impulse()
    }

    /// `-j` on endpoint A, `+j` on endpoint B.
    #[inline]
    pub(crate) fn apply_pair_impulse(&self, bodies: &mut [Body], j: Vec2) {
        fast!(mut bodies, [self.slot_a]).apply_impulse(-j);
        fast!(mut bodies, [self.slot_b]).apply_impulse(j);
    }
}
