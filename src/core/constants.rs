//! Fixed-timestep constants and solver defaults.

/// Simulation timestep (seconds per tick)
pub const DT: f32 = 1.0 / 60.0;
/// Inverse timestep, used by the Baumgarte position term
pub const INV_DT: f32 = 60.0;

/// Gauss-Seidel passes per tick
pub const DEFAULT_ITERATIONS: u32 = 8;
/// Broad-phase cell edge length (world units)
pub const DEFAULT_CELL_SIZE: f32 = 20.0;
/// Extra separation a contact survives before it is destroyed
pub const DEFAULT_COLLISION_BUFFER: f32 = 0.1;
