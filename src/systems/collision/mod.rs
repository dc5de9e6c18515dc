//! Narrow-phase collisions: persistent contact constraints with a hysteresis
//! lifecycle, created from broad-phase candidates.

pub mod contact;
pub mod handler;
pub mod particle;
pub mod segment;

pub use contact::{Contact, ContactGeometry};
pub use handler::CollisionHandler;
pub use particle::ParticleParticleCollision;
pub use segment::{SegmentParticleCollision, SegmentWheelCollision};

use crate::domain::{CollisionKey, Entities};

#[derive(Clone, Debug, PartialEq)]
pub enum Collision {
    ParticleParticle(ParticleParticleCollision),
    SegmentParticle(SegmentParticleCollision),
    SegmentWheel(SegmentWheelCollision),
}

impl Collision {
    pub fn key(&self) -> CollisionKey {
        match self {
            Collision::ParticleParticle(c) => c.key(),
            Collision::SegmentParticle(c) => c.key(),
            Collision::SegmentWheel(c) => c.key(),
        }
    }

    pub fn contact(&self) -> &Contact {
        match self {
            Collision::ParticleParticle(c) => &c.contact,
            Collision::SegmentParticle(c) => &c.contact,
            Collision::SegmentWheel(c) => &c.contact,
        }
    }

    pub(crate) fn contact_mut(&mut self) -> &mut Contact {
        match self {
            Collision::ParticleParticle(c) => &mut c.contact,
            Collision::SegmentParticle(c) => &mut c.contact,
            Collision::SegmentWheel(c) => &mut c.contact,
        }
    }

    #[inline]
    pub fn normal(&self) -> crate::core::math::Vec2 {
        self.contact().normal
    }

    #[inline]
    pub fn distance(&self) -> f32 {
        self.contact().distance
    }

    /// Re-measure against the current entity state; `None` once a
    /// participant is gone.
    pub(crate) fn measure(&self, entities: &Entities) -> Option<ContactGeometry> {
        match self {
            Collision::ParticleParticle(c) => {
                ParticleParticleCollision::measure(c.a, c.b, entities)
            }
            Collision::SegmentParticle(c) => {
                SegmentParticleCollision::measure(c.segment, c.particle, entities)
            }
            Collision::SegmentWheel(c) => {
                SegmentWheelCollision::measure(c.segment, c.wheel, entities)
            }
        }
    }
}
