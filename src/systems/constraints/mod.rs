//! Constraint network: links, springs, angular springs, motors and gears.
//!
//! Every constraint follows the same per-tick protocol:
//! `compute_data` → `compute_rest_impulse` → `apply_warm_start` →
//! N × `apply_corrective_impulse`.

pub mod angular;
pub mod link;
pub mod motor;
pub mod spring;

pub use angular::{relative_angle_vector, AngularSpring};
pub use link::{LinearLink, LinkFrame};
pub use motor::{GearConstraint, MotorConstraint};
pub use spring::{FixedSpring, LinearSpring};
