//! Contact record and its impulse solver, shared by every collision kind.
//!
//! A contact sees the world through a [`ContactJacobian`]: a short list of
//! bodies with signed weights (A side negative, B side positive) plus an
//! optional wheel spin term on the B side. Relative velocity at the contact
//! is the weighted sum of those velocities, and an impulse `j` is spread back
//! with the same weights.

use crate::core::constants::INV_DT;
use crate::core::math::{safe_inverse, Vec2, LENGTH_EPSILON};
use crate::domain::{AngularState, Body, ContactMaterial, Massive};

const MAX_LINEAR_TERMS: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct LinearTerm {
    slot: usize,
    weight: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct SpinTerm {
    slot: usize,
    /// Contact point relative to the wheel center
    lever: Vec2,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContactJacobian {
    linear: [LinearTerm; MAX_LINEAR_TERMS],
    len: usize,
    spin: Option<SpinTerm>,
}

impl ContactJacobian {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_body(mut self, slot: usize, weight: f32) -> Self {
        debug_assert!(self.len < MAX_LINEAR_TERMS);
        if self.len < MAX_LINEAR_TERMS {
            self.linear[self.len] = LinearTerm { slot, weight };
            self.len += 1;
        }
        self
    }

    #[inline]
    fn terms(&self) -> &[LinearTerm] {
        &self.linear[..self.len]
    }

    pub(crate) fn relative_velocity(&self, bodies: &[Body], angular: &[AngularState]) -> Vec2 {
        let mut v = Vec2::ZERO;
        for term in self.terms() {
            v += fast!(bodies, [term.slot]).velocity() * term.weight;
        }
        if let Some(spin) = self.spin {
            v += spin.lever.perp() * fast!(angular, [spin.slot]).angular_velocity;
        }
        v
    }

    pub(crate) fn relative_impulse(&self, bodies: &[Body], angular: &[AngularState]) -> Vec2 {
        let mut j = Vec2::ZERO;
        for term in self.terms() {
            j += fast!(bodies, [term.slot]).impulse() * term.weight;
        }
        if let Some(spin) = self.spin {
            j += spin.lever.perp() * fast!(angular, [spin.slot]).angular_impulse;
        }
        j
    }

    /// Inverse effective mass seen by an impulse along `direction`.
    pub(crate) fn inverse_mass_along(
        &self,
        bodies: &[Body],
        angular: &[AngularState],
        direction: Vec2,
    ) -> f32 {
        let mut k = 0.0;
        for term in self.terms() {
            k += term.weight * term.weight * fast!(bodies, [term.slot]).inverse_mass();
        }
        if let Some(spin) = self.spin {
            let arm = spin.lever.perp_dot(direction);
            k += arm * arm * fast!(angular, [spin.slot]).inverse_inertia();
        }
        k
    }

    pub(crate) fn apply_impulse(&self, bodies: &mut [Body], angular: &mut [AngularState], j: Vec2) {
        for term in self.terms() {
            fast!(mut bodies, [term.slot]).apply_impulse(j * term.weight);
        }
        if let Some(spin) = self.spin {
            fast!(mut angular, [spin.slot]).apply_angular_impulse(spin.lever.perp_dot(j));
        }
    }

    /// True when no participant can move.
    pub(crate) fn is_static(&self, bodies: &[Body], angular: &[AngularState]) -> bool {
        let linear_static = self
            .terms()
            .iter()
            .all(|t| t.weight == 0.0 || bodies[t.slot].inverse_mass() == 0.0);
        let spin_static = self
            .spin
            .map_or(true, |s| angular[s.slot].inverse_inertia() == 0.0);
        linear_static && spin_static
    }
}

/// Raw separation measured by the narrow-phase: two circle centers (or a
/// segment's closest point and a circle center) and their radii.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactGeometry {
    pub origin_a: Vec2,
    pub radius_a: f32,
    pub origin_b: Vec2,
    pub radius_b: f32,
    pub(crate) jacobian: ContactJacobian,
    /// Angular slot of a wheel on the B side
    pub(crate) wheel_spin: Option<usize>,
}

impl ContactGeometry {
    #[inline]
    pub fn distance_squared(&self) -> f32 {
        self.origin_a.distance_squared(self.origin_b)
    }

    #[inline]
    pub fn sum_radii(&self) -> f32 {
        self.radius_a + self.radius_b
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Contact {
    pub(crate) jacobian: ContactJacobian,
    /// Unit vector from A toward B
    pub normal: Vec2,
    pub distance: f32,
    pub sum_radii: f32,
    pub point_a: Vec2,
    pub point_b: Vec2,
    pub(crate) material: ContactMaterial,
    pub(crate) friction: f32,
    pub(crate) normal_mass: f32,
    pub(crate) tangent_mass: f32,
    /// x: normal, y: tangent
    pub rest_impulse: Vec2,
    pub accumulated_impulse: Vec2,
}

impl Contact {
    pub(crate) fn new(geometry: ContactGeometry, material: ContactMaterial) -> Self {
        let mut contact = Self {
            jacobian: geometry.jacobian,
            normal: Vec2::UNIT_X,
            distance: 0.0,
            sum_radii: 0.0,
            point_a: Vec2::ZERO,
            point_b: Vec2::ZERO,
            material,
            friction: material.static_friction,
            normal_mass: 0.0,
            tangent_mass: 0.0,
            rest_impulse: Vec2::ZERO,
            accumulated_impulse: Vec2::ZERO,
        };
        contact.update_geometry(geometry);
        contact
    }

    #[inline]
    pub fn tangent(&self) -> Vec2 {
        self.normal.perp()
    }

    /// `distance - sum_radii`; negative while overlapping.
    #[inline]
    pub fn separation(&self) -> f32 {
        self.distance - self.sum_radii
    }

    pub fn material(&self) -> &ContactMaterial {
        &self.material
    }

    pub(crate) fn update_geometry(&mut self, geometry: ContactGeometry) {
        let delta = geometry.origin_b - geometry.origin_a;
        self.distance = delta.length();
        self.normal = if self.distance > LENGTH_EPSILON {
            delta / self.distance
        } else {
            Vec2::UNIT_X
        };
        self.sum_radii = geometry.sum_radii();
        self.point_a = geometry.origin_a + self.normal * geometry.radius_a;
        self.point_b = geometry.origin_b - self.normal * geometry.radius_b;

        let mut jacobian = geometry.jacobian;
        jacobian.spin = geometry.wheel_spin.map(|slot| SpinTerm {
            slot,
            lever: -self.normal * geometry.radius_b,
        });
        self.jacobian = jacobian;
    }

    pub(crate) fn compute_data(&mut self, bodies: &[Body], angular: &[AngularState]) {
        let normal_k = self.jacobian.inverse_mass_along(bodies, angular, self.normal);
        let tangent_k = self.jacobian.inverse_mass_along(bodies, angular, self.tangent());
        self.normal_mass = safe_inverse(normal_k);
        self.tangent_mass = safe_inverse(tangent_k);
    }

    pub(crate) fn compute_rest_impulse(&mut self, bodies: &[Body], angular: &[AngularState]) {
        if self.normal_mass == 0.0 {
            self.rest_impulse = Vec2::ZERO;
            return;
        }
        let velocity = self.jacobian.relative_velocity(bodies, angular);
        let normal_velocity = velocity.dot(self.normal);
        let tangent_velocity = velocity.dot(self.tangent());
        let m = &self.material;

        self.rest_impulse = Vec2::new(
            -(self.separation() * m.stiffness * INV_DT + normal_velocity * m.damping),
            -tangent_velocity,
        );
        self.friction = if tangent_velocity.abs() < m.static_friction_velocity {
            m.static_friction
        } else {
            m.dynamic_friction
        };
    }

    fn apply(&self, bodies: &mut [Body], angular: &mut [AngularState], normal: f32, tangent: f32) {
        let j = self.normal * normal + self.tangent() * tangent;
        self.jacobian.apply_impulse(bodies, angular, j);
    }

    /// Friction bound for a given normal impulse. A pulling normal carries no
    /// friction.
    #[inline]
    fn friction_limit(&self, normal: f32) -> f32 {
        self.friction * normal.max(0.0)
    }

    pub(crate) fn apply_warm_start(
        &mut self,
        bodies: &mut [Body],
        angular: &mut [AngularState],
    ) {
        let normal = self.accumulated_impulse.x * self.material.warm_start;
        let limit = self.friction_limit(normal);
        let tangent = (self.accumulated_impulse.y * self.material.warm_start)
            .clamp(-limit, limit);
        self.accumulated_impulse = Vec2::ZERO;
        if self.normal_mass == 0.0 || (normal == 0.0 && tangent == 0.0) {
            return;
        }
        self.apply(bodies, angular, normal, tangent);
        self.accumulated_impulse = Vec2::new(normal, tangent);
    }

    /// Returns the normal velocity change applied this pass.
    ///
    /// The normal law is a spring toward `sum_radii`. It pushes while the pair
    /// overlaps and pulls while the pair sits inside the buffer band, so a
    /// resting contact settles at `distance == sum_radii` instead of bouncing
    /// out of range.
    pub(crate) fn apply_corrective_impulse(
        &mut self,
        bodies: &mut [Body],
        angular: &mut [AngularState],
    ) -> f32 {
        if self.normal_mass == 0.0 {
            return 0.0;
        }
        let projected = self.jacobian.relative_impulse(bodies, angular);

        let normal_error = projected.dot(self.normal) - self.rest_impulse.x;
        let normal = -normal_error * self.normal_mass;
        let normal_total = self.accumulated_impulse.x + normal;

        let mut tangent = 0.0;
        let mut tangent_total = self.accumulated_impulse.y;
        if self.tangent_mass > 0.0 {
            let tangent_error = projected.dot(self.tangent()) - self.rest_impulse.y;
            let limit = self.friction_limit(normal_total);
            tangent_total = (self.accumulated_impulse.y - tangent_error * self.tangent_mass)
                .clamp(-limit, limit);
            tangent = tangent_total - self.accumulated_impulse.y;
        }

        self.accumulated_impulse = Vec2::new(normal_total, tangent_total);
        self.apply(bodies, angular, normal, tangent);
        (normal / self.normal_mass).abs()
    }
}
