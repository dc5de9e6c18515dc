pub mod config;
pub mod entity;
pub mod handle;
pub mod store;

pub use config::{ContactMaterial, MotorParams, SolverConfig, SpringParams};
pub use entity::{
    AngularState, Body, BodyKind, CircleShape, Collidable, Entities, LineSegment, LinearMotion,
    MassProps, Massive, Point, Wheel,
};
pub use handle::{
    AngularId, AngularSpringId, BodyId, CollisionKey, FixedSpringId, GearId, LinkId, MotorId,
    ObjectId, SegmentId, SpringId, WheelId,
};
pub use store::{Identified, Store};
