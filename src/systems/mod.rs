//! Solver systems: constraints and collisions.

pub mod collision;
pub mod constraints;
