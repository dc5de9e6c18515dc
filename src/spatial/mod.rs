//! Broad-phase spatial indexing.

pub mod hash_grid;

pub use hash_grid::{CellKey, ShapeRef, SpatialHashGrid};
