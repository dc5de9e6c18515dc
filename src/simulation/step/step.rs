use log::trace;

use super::{integrate, solve, PerfTimer, World};

/// One fixed-timestep tick:
/// 1. reset accumulators and apply gravity
/// 2. re-measure active collisions, drop separated ones
/// 3. broad phase: rebuild the hash grid and create new collisions
/// 4. solve: data, rest impulses, warm start, `iterations` corrective passes
/// 5. integrate velocities and positions
pub(super) fn step(world: &mut World) {
    let perf_on = world.config.perf_enabled;
    if perf_on {
        world.perf_stats.reset();
    }
    let step_start = if perf_on { Some(PerfTimer::start()) } else { None };
    let mut lap = PerfTimer::start();

    integrate::begin_tick(world);

    // === NARROW PHASE: existing contacts ===
    world.collisions.update_collisions(&world.entities);
    if perf_on {
        world.perf_stats.narrow_phase_ms = lap.lap_ms();
    }

    // === BROAD PHASE ===
    world.grid.rebuild(&world.entities);
    let occupied = world.grid.occupied_cells();
    let candidates = world.grid.create_collisions(&world.entities, &mut world.collisions);
    if perf_on {
        world.perf_stats.broad_phase_ms = lap.lap_ms();
    }

    // === SOLVE ===
    solve::compute_data(world);
    solve::compute_rest_impulse(world);
    solve::warm_start(world);
    let mut residual = 0.0;
    for _ in 0..world.config.iterations {
        residual = solve::corrective_pass(world);
    }
    world.residual = residual;
    if perf_on {
        world.perf_stats.solve_ms = lap.lap_ms();
    }

    // === INTEGRATE ===
    integrate::integrate(world);
    if perf_on {
        world.perf_stats.integrate_ms = lap.lap_ms();
    }

    world.frame += 1;
    let (created, destroyed) = world.collisions.take_counters();

    if perf_on {
        let constraints = world.constraint_count() as u32;
        let stats = &mut world.perf_stats;
        stats.candidate_pairs = candidates;
        stats.active_collisions = world.collisions.len() as u32;
        stats.collisions_created = created;
        stats.collisions_destroyed = destroyed;
        stats.occupied_cells = occupied as u32;
        stats.body_count = world.entities.bodies.len() as u32;
        stats.constraint_count = constraints;
        stats.iterations = world.config.iterations;
        stats.residual = residual;
        if let Some(start) = step_start {
            stats.step_ms = start.elapsed_ms();
        }
    }

    trace!(
        "frame {}: {} collisions (+{} -{}), {} candidates, residual {:.4}",
        world.frame,
        world.collisions.len(),
        created,
        destroyed,
        candidates,
        residual
    );
}
