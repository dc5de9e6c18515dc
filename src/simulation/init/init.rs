use log::debug;

use crate::domain::{Entities, SolverConfig, Store};
use crate::spatial::hash_grid::SpatialHashGrid;
use crate::systems::collision::CollisionHandler;

use super::perf_stats::PerfStats;
use super::World;

pub(super) fn create_world(config: SolverConfig) -> World {
    debug!(
        "world created: {} iterations, cell size {}, buffer {}",
        config.iterations, config.cell_size, config.collision_buffer
    );
    World {
        entities: Entities::default(),
        linear_springs: Store::new(),
        fixed_springs: Store::new(),
        angular_springs: Store::new(),
        motors: Store::new(),
        gears: Store::new(),
        collisions: CollisionHandler::new(config.collision_buffer, config.contact),
        grid: SpatialHashGrid::new(config.cell_size, config.collision_buffer),
        next_id: 0,
        frame: 0,
        residual: 0.0,
        perf_stats: PerfStats::default(),
        config,
    }
}
