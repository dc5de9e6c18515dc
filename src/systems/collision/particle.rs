use crate::domain::{BodyId, CollisionKey, Entities};

use super::contact::{Contact, ContactGeometry, ContactJacobian};

/// Circle against circle. The normal points from `a` to `b`.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleParticleCollision {
    pub(crate) a: BodyId,
    pub(crate) b: BodyId,
    pub(crate) contact: Contact,
}

impl ParticleParticleCollision {
    pub fn particles(&self) -> (BodyId, BodyId) {
        (self.a, self.b)
    }

    pub fn key(&self) -> CollisionKey {
        CollisionKey::new(self.a.object_id(), self.b.object_id())
    }

    pub(crate) fn measure(a: BodyId, b: BodyId, entities: &Entities) -> Option<ContactGeometry> {
        let bodies = &entities.bodies;
        let slot_a = bodies.slot(a.object_id())?;
        let slot_b = bodies.slot(b.object_id())?;
        let body_a = &bodies[slot_a];
        let body_b = &bodies[slot_b];
        Some(ContactGeometry {
            origin_a: body_a.position(),
            radius_a: body_a.radius()?,
            origin_b: body_b.position(),
            radius_b: body_b.radius()?,
            jacobian: ContactJacobian::new().with_body(slot_a, -1.0).with_body(slot_b, 1.0),
            wheel_spin: None,
        })
    }
}
