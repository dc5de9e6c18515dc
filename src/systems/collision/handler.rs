//! Collision lifecycle: absent → active → absent.
//!
//! A pair becomes active when `distance² < sum_radii²` and stays active until
//! `distance² > (sum_radii + buffer)²`. The gap between the two thresholds
//! keeps a resting contact (and its warm-start impulse) alive across ticks.

use std::collections::BTreeMap;

use log::trace;

use crate::domain::{
    AngularState, Body, BodyId, CollisionKey, ContactMaterial, Entities, ObjectId, SegmentId,
    WheelId,
};

use super::contact::{Contact, ContactGeometry};
use super::{Collision, ParticleParticleCollision, SegmentParticleCollision, SegmentWheelCollision};

#[derive(Clone, Debug)]
pub struct CollisionHandler {
    /// Ordered by key so the Gauss-Seidel pass order is reproducible
    collisions: BTreeMap<CollisionKey, Collision>,
    buffer: f32,
    material: ContactMaterial,
    created: u32,
    destroyed: u32,
}

impl CollisionHandler {
    pub fn new(buffer: f32, material: ContactMaterial) -> Self {
        Self {
            collisions: BTreeMap::new(),
            buffer: buffer.max(0.0),
            material,
            created: 0,
            destroyed: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.collisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collisions.is_empty()
    }

    pub fn buffer(&self) -> f32 {
        self.buffer
    }

    pub fn get(&self, key: CollisionKey) -> Option<&Collision> {
        self.collisions.get(&key)
    }

    pub fn contains(&self, key: CollisionKey) -> bool {
        self.collisions.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collision> + '_ {
        self.collisions.values()
    }

    pub(crate) fn set_material(&mut self, material: ContactMaterial) {
        self.material = material;
    }

    pub(crate) fn set_buffer(&mut self, buffer: f32) {
        self.buffer = buffer.max(0.0);
    }

    /// Created and destroyed counts since the last call.
    pub(crate) fn take_counters(&mut self) -> (u32, u32) {
        let counters = (self.created, self.destroyed);
        self.created = 0;
        self.destroyed = 0;
        counters
    }

    /// Re-measure every active collision, dropping the ones that separated
    /// past the buffer or lost a participant.
    pub fn update_collisions(&mut self, entities: &Entities) {
        let buffer = self.buffer;
        let before = self.collisions.len();
        self.collisions.retain(|key, collision| {
            let Some(geometry) = collision.measure(entities) else {
                trace!("collision {key} lost a participant");
                return false;
            };
            let limit = geometry.sum_radii() + buffer;
            if geometry.distance_squared() > limit * limit {
                trace!("collision {key} separated");
                return false;
            }
            collision.contact_mut().update_geometry(geometry);
            true
        });
        self.destroyed += (before - self.collisions.len()) as u32;
    }

    pub fn create_particle_particle(&mut self, a: BodyId, b: BodyId, entities: &Entities) -> bool {
        if a == b {
            return false;
        }
        let key = CollisionKey::new(a.object_id(), b.object_id());
        self.admit(
            key,
            entities,
            || ParticleParticleCollision::measure(a, b, entities),
            |contact| Collision::ParticleParticle(ParticleParticleCollision { a, b, contact }),
        )
    }

    pub fn create_segment_particle(
        &mut self,
        segment: SegmentId,
        particle: BodyId,
        entities: &Entities,
    ) -> bool {
        let key = CollisionKey::new(segment.object_id(), particle.object_id());
        self.admit(
            key,
            entities,
            || SegmentParticleCollision::measure(segment, particle, entities),
            |contact| {
                Collision::SegmentParticle(SegmentParticleCollision {
                    segment,
                    particle,
                    contact,
                })
            },
        )
    }

    pub fn create_segment_wheel(
        &mut self,
        segment: SegmentId,
        wheel: WheelId,
        entities: &Entities,
    ) -> bool {
        let key = CollisionKey::new(segment.object_id(), wheel.object_id());
        self.admit(
            key,
            entities,
            || SegmentWheelCollision::measure(segment, wheel, entities),
            |contact| Collision::SegmentWheel(SegmentWheelCollision { segment, wheel, contact }),
        )
    }

    fn admit(
        &mut self,
        key: CollisionKey,
        entities: &Entities,
        measure: impl FnOnce() -> Option<ContactGeometry>,
        build: impl FnOnce(Contact) -> Collision,
    ) -> bool {
        if self.collisions.contains_key(&key) {
            return false;
        }
        let Some(geometry) = measure() else {
            return false;
        };
        let sum = geometry.sum_radii();
        if geometry.distance_squared() >= sum * sum {
            return false;
        }
        if geometry
            .jacobian
            .is_static(entities.bodies.as_slice(), entities.angular.as_slice())
        {
            return false;
        }
        self.collisions.insert(key, build(Contact::new(geometry, self.material)));
        self.created += 1;
        trace!("collision {key} created");
        true
    }

    /// Drop every collision whose key names `id`; returns how many.
    pub fn remove_involving(&mut self, id: ObjectId) -> usize {
        let before = self.collisions.len();
        self.collisions.retain(|key, _| !key.contains(id));
        let removed = before - self.collisions.len();
        self.destroyed += removed as u32;
        removed
    }

    pub fn clear(&mut self) {
        self.collisions.clear();
        self.created = 0;
        self.destroyed = 0;
    }

    pub(crate) fn compute_data(&mut self, bodies: &[Body], angular: &[AngularState]) {
        for collision in self.collisions.values_mut() {
            collision.contact_mut().compute_data(bodies, angular);
        }
    }

    pub(crate) fn compute_rest_impulse(&mut self, bodies: &[Body], angular: &[AngularState]) {
        for collision in self.collisions.values_mut() {
            collision.contact_mut().compute_rest_impulse(bodies, angular);
        }
    }

    pub(crate) fn apply_warm_start(&mut self, bodies: &mut [Body], angular: &mut [AngularState]) {
        for collision in self.collisions.values_mut() {
            collision.contact_mut().apply_warm_start(bodies, angular);
        }
    }

    /// One pass over every contact; returns the largest residual.
    pub(crate) fn apply_corrective_impulse(
        &mut self,
        bodies: &mut [Body],
        angular: &mut [AngularState],
    ) -> f32 {
        let mut residual: f32 = 0.0;
        for collision in self.collisions.values_mut() {
            let error = collision.contact_mut().apply_corrective_impulse(bodies, angular);
            residual = residual.max(error);
        }
        residual
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Vec2;
    use crate::domain::{LineSegment, Wheel};

    fn body_id(raw: u32) -> BodyId {
        BodyId::from_object_id(ObjectId(raw))
    }

    fn two_particles(distance: f32) -> Entities {
        let mut entities = Entities::default();
        entities.bodies.insert(Body::particle(body_id(1), Vec2::ZERO, 1.0, 5.0, 0));
        entities.bodies.insert(Body::particle(body_id(2), Vec2::new(distance, 0.0), 1.0, 5.0, 0));
        entities
    }

    fn move_second(entities: &mut Entities, x: f32) {
        if let Some(body) = entities.bodies.get_mut(ObjectId(2)) {
            body.point.position = Vec2::new(x, 0.0);
        }
    }

    #[test]
    fn creation_requires_overlap() {
        let mut handler = CollisionHandler::new(0.1, ContactMaterial::default());
        let entities = two_particles(10.0);
        assert!(!handler.create_particle_particle(body_id(1), body_id(2), &entities));
        let entities = two_particles(9.99);
        assert!(handler.create_particle_particle(body_id(1), body_id(2), &entities));
        // the same pair from another grid cell is a no-op
        assert!(!handler.create_particle_particle(body_id(2), body_id(1), &entities));
        assert_eq!(handler.len(), 1);
        assert_eq!(handler.take_counters(), (1, 0));
    }

    #[test]
    fn collision_survives_inside_buffer() {
        let mut handler = CollisionHandler::new(0.1, ContactMaterial::default());
        let mut entities = two_particles(9.0);
        assert!(handler.create_particle_particle(body_id(1), body_id(2), &entities));
        let key = CollisionKey::new(ObjectId(1), ObjectId(2));

        for x in [10.0, 10.05, 10.0, 10.09] {
            move_second(&mut entities, x);
            handler.update_collisions(&entities);
            assert!(handler.contains(key), "dropped at {x}");
            assert!((handler.get(key).unwrap().distance() - x).abs() < 1e-5);
        }

        move_second(&mut entities, 10.2);
        handler.update_collisions(&entities);
        assert!(!handler.contains(key));
        assert_eq!(handler.take_counters(), (1, 1));
    }

    #[test]
    fn static_pairs_are_not_created() {
        let mut handler = CollisionHandler::new(0.1, ContactMaterial::default());
        let mut entities = Entities::default();
        entities.bodies.insert(Body::particle(body_id(1), Vec2::ZERO, 0.0, 5.0, 0));
        entities.bodies.insert(Body::particle(body_id(2), Vec2::new(1.0, 0.0), 0.0, 5.0, 0));
        assert!(!handler.create_particle_particle(body_id(1), body_id(2), &entities));
    }

    #[test]
    fn segment_contacts_and_removal() {
        let mut handler = CollisionHandler::new(0.1, ContactMaterial::default());
        let mut entities = Entities::default();
        entities.bodies.insert(Body::point(body_id(1), Vec2::new(-50.0, 0.0)));
        entities.bodies.insert(Body::point(body_id(2), Vec2::new(50.0, 0.0)));
        entities.bodies.insert(Body::particle(body_id(3), Vec2::new(10.0, 4.0), 1.0, 3.0, 0));
        entities.bodies.insert(Body::linear_state(body_id(4), Vec2::new(-10.0, 5.0), 1.0));
        let angular = crate::domain::AngularId::from_object_id(ObjectId(5));
        entities.angular.insert(AngularState::new(angular, 0.0, 1.0));
        let wheel = WheelId::from_object_id(ObjectId(6));
        entities.wheels.insert(Wheel { id: ObjectId(6), center: body_id(4), angular, radius: 6.0 });
        let segment = SegmentId::from_object_id(ObjectId(7));
        entities.segments.insert(LineSegment {
            id: ObjectId(7),
            a: body_id(1),
            b: body_id(2),
            radius: 2.0,
        });

        assert!(handler.create_segment_particle(segment, body_id(3), &entities));
        assert!(handler.create_segment_wheel(segment, wheel, &entities));

        let key = CollisionKey::new(segment.object_id(), body_id(3).object_id());
        let contact = handler.get(key).unwrap().contact();
        assert!((contact.normal - Vec2::UNIT_Y).length() < 1e-6);
        assert!((contact.distance - 4.0).abs() < 1e-6);
        assert!((contact.point_a - Vec2::new(10.0, 2.0)).length() < 1e-4);

        assert_eq!(handler.remove_involving(segment.object_id()), 2);
        assert!(handler.is_empty());
    }
}
