//! Motors and gears act directly on angular states.

use crate::core::constants::INV_DT;
use crate::core::math::safe_inverse;
use crate::domain::{
    AngularId, AngularState, GearId, Identified, MotorId, MotorParams, ObjectId, SpringParams,
    Store,
};

/// Slots of two angular states, refreshed every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct AngularPair {
    slot_a: usize,
    slot_b: usize,
}

impl AngularPair {
    fn resolve(states: &Store<AngularState>, a: AngularId, b: AngularId) -> Option<Self> {
        Some(Self {
            slot_a: states.slot(a.object_id())?,
            slot_b: states.slot(b.object_id())?,
        })
    }
}

/// Drives `ω_B - ω_A` toward `rest_velocity`.
#[derive(Clone, Debug, PartialEq)]
pub struct MotorConstraint {
    pub(crate) id: MotorId,
    pub(crate) a: AngularId,
    pub(crate) b: AngularId,
    pair: AngularPair,
    pub(crate) rest_velocity: f32,
    pub(crate) damping: f32,
    pub(crate) warm_start: f32,
    pub(crate) max_impulse: Option<f32>,
    pub(crate) reduced_inertia: f32,
    pub(crate) rest_impulse: f32,
    pub(crate) accumulated_impulse: f32,
}

impl MotorConstraint {
    pub(crate) fn new(
        id: MotorId,
        a: AngularId,
        b: AngularId,
        rest_velocity: f32,
        params: MotorParams,
    ) -> Self {
        Self {
            id,
            a,
            b,
            pair: AngularPair::default(),
            rest_velocity,
            damping: params.damping,
            warm_start: params.warm_start,
            max_impulse: params.max_impulse.map(f32::abs),
            reduced_inertia: 0.0,
            rest_impulse: 0.0,
            accumulated_impulse: 0.0,
        }
    }

    pub fn id(&self) -> MotorId {
        self.id
    }

    pub fn states(&self) -> (AngularId, AngularId) {
        (self.a, self.b)
    }

    #[inline]
    pub fn uses_state(&self, state: AngularId) -> bool {
        self.a == state || self.b == state
    }

    pub fn rest_velocity(&self) -> f32 {
        self.rest_velocity
    }

    pub fn max_impulse(&self) -> Option<f32> {
        self.max_impulse
    }

    pub fn accumulated_impulse(&self) -> f32 {
        self.accumulated_impulse
    }

    pub(crate) fn set_rest_velocity(&mut self, rest_velocity: f32) {
        self.rest_velocity = rest_velocity;
    }

    pub(crate) fn compute_data(&mut self, states: &Store<AngularState>) {
        match AngularPair::resolve(states, self.a, self.b) {
            Some(pair) => {
                self.pair = pair;
                let a = &states[pair.slot_a];
                let b = &states[pair.slot_b];
                self.reduced_inertia = safe_inverse(a.inverse_inertia() + b.inverse_inertia());
            }
            None => self.reduced_inertia = 0.0,
        }
    }

    pub(crate) fn compute_rest_impulse(&mut self, states: &[AngularState]) {
        if self.reduced_inertia == 0.0 {
            self.rest_impulse = 0.0;
            return;
        }
        let a = fast!(states, [self.pair.slot_a]);
        let b = fast!(states, [self.pair.slot_b]);
        let relative = b.angular_velocity - a.angular_velocity;
        self.rest_impulse = -(relative - self.rest_velocity) * self.damping;
    }

    fn apply(&self, states: &mut [AngularState], l: f32) {
        fast!(mut states, [self.pair.slot_a]).apply_angular_impulse(-l);
        fast!(mut states, [self.pair.slot_b]).apply_angular_impulse(l);
    }

    /// Clamp a candidate accumulated impulse to the torque limit.
    fn clamp(&self, accumulated: f32) -> f32 {
        match self.max_impulse {
            Some(max) => accumulated.clamp(-max, max),
            None => accumulated,
        }
    }

    pub(crate) fn apply_warm_start(&mut self, states: &mut [AngularState]) {
        let seed = self.clamp(self.accumulated_impulse * self.warm_start);
        self.accumulated_impulse = 0.0;
        if self.reduced_inertia == 0.0 || seed == 0.0 {
            return;
        }
        self.apply(states, seed);
        self.accumulated_impulse = seed;
    }

    pub(crate) fn apply_corrective_impulse(&mut self, states: &mut [AngularState]) -> f32 {
        if self.reduced_inertia == 0.0 {
            return 0.0;
        }
        let projected = fast!(states, [self.pair.slot_b]).angular_impulse
            - fast!(states, [self.pair.slot_a]).angular_impulse;
        let impulse_error = projected - self.rest_impulse;
        let wanted = self.clamp(self.accumulated_impulse - impulse_error * self.reduced_inertia);
        let corrective = wanted - self.accumulated_impulse;
        self.accumulated_impulse = wanted;
        self.apply(states, corrective);
        impulse_error.abs()
    }
}

impl Identified for MotorConstraint {
    fn object_id(&self) -> ObjectId {
        self.id.object_id()
    }
}

/// Couples two angular states: `θ_B = ratio·θ_A + rest_angle`.
#[derive(Clone, Debug, PartialEq)]
pub struct GearConstraint {
    pub(crate) id: GearId,
    pub(crate) a: AngularId,
    pub(crate) b: AngularId,
    pair: AngularPair,
    pub(crate) gear_ratio: f32,
    pub(crate) rest_angle: f32,
    pub(crate) stiffness: f32,
    pub(crate) damping: f32,
    pub(crate) warm_start: f32,
    pub(crate) effective_inertia: f32,
    pub(crate) rest_impulse: f32,
    pub(crate) accumulated_impulse: f32,
}

impl GearConstraint {
    pub(crate) fn new(
        id: GearId,
        a: &AngularState,
        b: &AngularState,
        gear_ratio: f32,
        params: SpringParams,
    ) -> Self {
        Self {
            id,
            a: a.handle(),
            b: b.handle(),
            pair: AngularPair::default(),
            gear_ratio,
            rest_angle: b.angle - gear_ratio * a.angle,
            stiffness: params.stiffness,
            damping: params.damping,
            warm_start: params.warm_start,
            effective_inertia: 0.0,
            rest_impulse: 0.0,
            accumulated_impulse: 0.0,
        }
    }

    pub fn id(&self) -> GearId {
        self.id
    }

    pub fn states(&self) -> (AngularId, AngularId) {
        (self.a, self.b)
    }

    #[inline]
    pub fn uses_state(&self, state: AngularId) -> bool {
        self.a == state || self.b == state
    }

    pub fn gear_ratio(&self) -> f32 {
        self.gear_ratio
    }

    pub fn rest_angle(&self) -> f32 {
        self.rest_angle
    }

    pub fn accumulated_impulse(&self) -> f32 {
        self.accumulated_impulse
    }

    /// Change the ratio around the current angles so nothing jumps.
    pub(crate) fn set_gear_ratio(&mut self, gear_ratio: f32, angle_a: f32, angle_b: f32) {
        self.gear_ratio = gear_ratio;
        self.rest_angle = angle_b - gear_ratio * angle_a;
        self.accumulated_impulse = 0.0;
    }

    pub(crate) fn compute_data(&mut self, states: &Store<AngularState>) {
        match AngularPair::resolve(states, self.a, self.b) {
            Some(pair) => {
                self.pair = pair;
                let a = &states[pair.slot_a];
                let b = &states[pair.slot_b];
                let ratio_sq = self.gear_ratio * self.gear_ratio;
                self.effective_inertia =
                    safe_inverse(b.inverse_inertia() + ratio_sq * a.inverse_inertia());
            }
            None => self.effective_inertia = 0.0,
        }
    }

    pub(crate) fn compute_rest_impulse(&mut self, states: &[AngularState]) {
        if self.effective_inertia == 0.0 {
            self.rest_impulse = 0.0;
            return;
        }
        let a = fast!(states, [self.pair.slot_a]);
        let b = fast!(states, [self.pair.slot_b]);
        let angle_error = b.angle - self.gear_ratio * a.angle - self.rest_angle;
        let velocity_error = b.angular_velocity - self.gear_ratio * a.angular_velocity;
        self.rest_impulse =
            -(angle_error * self.stiffness * INV_DT + velocity_error * self.damping);
    }

    fn apply(&self, states: &mut [AngularState], l: f32) {
        fast!(mut states, [self.pair.slot_a]).apply_angular_impulse(-self.gear_ratio * l);
        fast!(mut states, [self.pair.slot_b]).apply_angular_impulse(l);
    }

    pub(crate) fn apply_warm_start(&mut self, states: &mut [AngularState]) {
        let seed = self.accumulated_impulse * self.warm_start;
        self.accumulated_impulse = 0.0;
        if self.effective_inertia == 0.0 || seed == 0.0 {
            return;
        }
        self.apply(states, seed);
        self.accumulated_impulse = seed;
    }

    pub(crate) fn apply_corrective_impulse(&mut self, states: &mut [AngularState]) -> f32 {
        if self.effective_inertia == 0.0 {
            return 0.0;
        }
        let projected = fast!(states, [self.pair.slot_b]).angular_impulse
            - self.gear_ratio * fast!(states, [self.pair.slot_a]).angular_impulse;
        let impulse_error = projected - self.rest_impulse;
        let corrective = -impulse_error * self.effective_inertia;
        self.accumulated_impulse += corrective;
        self.apply(states, corrective);
        impulse_error.abs()
    }
}

impl Identified for GearConstraint {
    fn object_id(&self) -> ObjectId {
        self.id.object_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::DT;

    fn state(raw: u32, angle: f32, inertia: f32) -> AngularState {
        AngularState::new(AngularId::from_object_id(ObjectId(raw)), angle, inertia)
    }

    fn tick<F>(states: &mut Store<AngularState>, mut solve: F)
    where
        F: FnMut(&mut Store<AngularState>),
    {
        solve(states);
        for s in states.iter_mut() {
            s.integrate(DT);
        }
    }

    #[test]
    fn motor_against_static_state_reaches_target_velocity() {
        let mut states = Store::new();
        states.insert(state(1, 0.0, 0.0));
        states.insert(state(2, 0.0, 2.0));
        let mut motor = MotorConstraint::new(
            MotorId::from_object_id(ObjectId(3)),
            AngularId::from_object_id(ObjectId(1)),
            AngularId::from_object_id(ObjectId(2)),
            5.0,
            MotorParams::default(),
        );
        tick(&mut states, |states| {
            motor.compute_data(states);
            motor.compute_rest_impulse(states.as_slice());
            motor.apply_warm_start(states.as_mut_slice());
            motor.apply_corrective_impulse(states.as_mut_slice());
        });
        assert!((states[1].angular_velocity - 5.0).abs() < 1e-4);
        assert_eq!(states[0].angular_velocity, 0.0);
        // reduced inertia 2, Δω 5
        assert!((motor.accumulated_impulse() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn motor_torque_limit_caps_spin_up() {
        let mut states = Store::new();
        states.insert(state(1, 0.0, 0.0));
        states.insert(state(2, 0.0, 1.0));
        let params = MotorParams { max_impulse: Some(0.5), ..MotorParams::default() };
        let mut motor = MotorConstraint::new(
            MotorId::from_object_id(ObjectId(3)),
            AngularId::from_object_id(ObjectId(1)),
            AngularId::from_object_id(ObjectId(2)),
            10.0,
            params,
        );
        motor.compute_data(&states);
        motor.compute_rest_impulse(states.as_slice());
        for _ in 0..8 {
            motor.apply_corrective_impulse(states.as_mut_slice());
        }
        assert!((motor.accumulated_impulse() - 0.5).abs() < 1e-6);
        assert!((states[1].angular_impulse - 0.5).abs() < 1e-6);
    }

    #[test]
    fn gear_locks_ratio_of_velocities() {
        let mut states = Store::new();
        states.insert(state(1, 0.0, 1.0));
        states.insert(state(2, 0.0, 1.0));
        states.get_mut(ObjectId(1)).unwrap().angular_velocity = 3.0;
        let mut gear = GearConstraint::new(
            GearId::from_object_id(ObjectId(3)),
            &states[0],
            &states[1],
            2.0,
            SpringParams { stiffness: 0.0, damping: 1.0, warm_start: 0.0 },
        );
        gear.compute_data(&states);
        gear.compute_rest_impulse(states.as_slice());
        for _ in 0..8 {
            gear.apply_corrective_impulse(states.as_mut_slice());
        }
        for s in states.iter_mut() {
            s.integrate(DT);
        }
        let (wa, wb) = (states[0].angular_velocity, states[1].angular_velocity);
        assert!((wb - 2.0 * wa).abs() < 1e-4, "wa {wa} wb {wb}");
    }

    #[test]
    fn gear_ratio_change_captures_current_offset() {
        let a = state(1, 1.0, 1.0);
        let b = state(2, 0.5, 1.0);
        let gear_id = GearId::from_object_id(ObjectId(3));
        let mut gear = GearConstraint::new(gear_id, &a, &b, 1.0, SpringParams::default());
        assert!((gear.rest_angle() + 0.5).abs() < 1e-6);
        gear.set_gear_ratio(3.0, a.angle, b.angle);
        assert!((gear.rest_angle() - (0.5 - 3.0)).abs() < 1e-6);
        // zero angle error right after the change
        let err = b.angle - gear.gear_ratio() * a.angle - gear.rest_angle();
        assert!(err.abs() < 1e-6);
    }
}
