//! Line segment contacts.
//!
//! The segment side is the closest point `a + (b - a)·t`; an impulse on it is
//! split `(1 - t)` / `t` between the endpoints.

use crate::core::math::{closest_point_param, Vec2};
use crate::domain::{BodyId, CollisionKey, Entities, SegmentId, WheelId};

use super::contact::{Contact, ContactGeometry, ContactJacobian};

/// Closest point on a segment's axis to `target`, and the segment's side of
/// the jacobian.
fn segment_side(
    entities: &Entities,
    segment: SegmentId,
    target: Vec2,
) -> Option<(Vec2, f32, ContactJacobian)> {
    let segment = entities.segments.get(segment.object_id())?;
    let bodies = &entities.bodies;
    let slot_a = bodies.slot(segment.a.object_id())?;
    let slot_b = bodies.slot(segment.b.object_id())?;
    let a = bodies[slot_a].position();
    let b = bodies[slot_b].position();
    let t = closest_point_param(a, b, target);
    let closest = a + (b - a) * t;
    let jacobian = ContactJacobian::new()
        .with_body(slot_a, -(1.0 - t))
        .with_body(slot_b, -t);
    Some((closest, segment.radius, jacobian))
}

/// Segment against particle. The normal points from the segment to the particle.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentParticleCollision {
    pub(crate) segment: SegmentId,
    pub(crate) particle: BodyId,
    pub(crate) contact: Contact,
}

impl SegmentParticleCollision {
    pub fn segment(&self) -> SegmentId {
        self.segment
    }

    pub fn particle(&self) -> BodyId {
        self.particle
    }

    pub fn key(&self) -> CollisionKey {
        CollisionKey::new(self.segment.object_id(), self.particle.object_id())
    }

    pub(crate) fn measure(
        segment: SegmentId,
        particle: BodyId,
        entities: &Entities,
    ) -> Option<ContactGeometry> {
        let slot = entities.bodies.slot(particle.object_id())?;
        let body = &entities.bodies[slot];
        let radius = body.radius()?;
        let (closest, segment_radius, jacobian) = segment_side(entities, segment, body.position())?;
        Some(ContactGeometry {
            origin_a: closest,
            radius_a: segment_radius,
            origin_b: body.position(),
            radius_b: radius,
            jacobian: jacobian.with_body(slot, 1.0),
            wheel_spin: None,
        })
    }
}

/// Segment against wheel. The tangential impulse also spins the wheel.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentWheelCollision {
    pub(crate) segment: SegmentId,
    pub(crate) wheel: WheelId,
    pub(crate) contact: Contact,
}

impl SegmentWheelCollision {
    pub fn segment(&self) -> SegmentId {
        self.segment
    }

    pub fn wheel(&self) -> WheelId {
        self.wheel
    }

    pub fn key(&self) -> CollisionKey {
        CollisionKey::new(self.segment.object_id(), self.wheel.object_id())
    }

    pub(crate) fn measure(
        segment: SegmentId,
        wheel: WheelId,
        entities: &Entities,
    ) -> Option<ContactGeometry> {
        let wheel = entities.wheels.get(wheel.object_id())?;
        let center_slot = entities.bodies.slot(wheel.center.object_id())?;
        let spin_slot = entities.angular.slot(wheel.angular.object_id())?;
        let center = entities.bodies[center_slot].position();
        let (closest, segment_radius, jacobian) = segment_side(entities, segment, center)?;
        Some(ContactGeometry {
            origin_a: closest,
            radius_a: segment_radius,
            origin_b: center,
            radius_b: wheel.radius,
            jacobian: jacobian.with_body(center_slot, 1.0),
            wheel_spin: Some(spin_slot),
        })
    }
}
