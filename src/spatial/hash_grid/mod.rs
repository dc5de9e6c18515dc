//! SpatialHashGrid - uniform-grid broad-phase
//!
//! Rebuilt every tick: circles go into every cell their (buffer-expanded)
//! bounding box touches, segments into every cell their axis crosses plus
//! the neighborhood that covers their thickness. Buckets are processed and
//! emptied in `create_collisions`; empty buckets are kept for reuse until the
//! map grows well past the occupied set.

mod rasterize;

use std::collections::HashMap;

use log::trace;

use crate::core::math::Vec2;
use crate::domain::{Collidable, Entities};
use crate::systems::collision::CollisionHandler;

use rasterize::{cell_coord, walk_cells};

pub type CellKey = (i32, i32);

/// Idle buckets kept around before the map is dropped and rebuilt
const SPARE_BUCKETS: usize = 256;

/// Widest cell span a circle registers on each axis. Larger circles only
/// cover the cells around their center; raise `cell_size` for such worlds.
const MAX_CIRCLE_SPAN: i32 = 64;

/// Neighborhood reach (in cells) of a thick segment
const MAX_SEGMENT_REACH: i32 = 4;

/// What a bucket entry points at: a slot in the owning entity store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeRef {
    Particle(usize),
    Wheel(usize),
    Segment(usize),
}

#[derive(Clone, Debug, Default)]
struct Bucket {
    circles: Vec<ShapeRef>,
    segments: Vec<usize>,
}

impl Bucket {
    #[inline]
    fn is_empty(&self) -> bool {
        self.circles.is_empty() && self.segments.is_empty()
    }

    fn clear(&mut self) {
        self.circles.clear();
        self.segments.clear();
    }
}

#[derive(Clone, Debug)]
pub struct SpatialHashGrid {
    cell_size: f32,
    inv_cell_size: f32,
    buffer: f32,
    buckets: HashMap<CellKey, Bucket>,
    occupied: Vec<CellKey>,
}

impl SpatialHashGrid {
    pub fn new(cell_size: f32, buffer: f32) -> Self {
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            buffer: buffer.max(0.0),
            buckets: HashMap::new(),
            occupied: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub(crate) fn set_buffer(&mut self, buffer: f32) {
        self.buffer = buffer.max(0.0);
    }

    #[inline]
    pub fn cell_of(&self, position: Vec2) -> CellKey {
        (
            cell_coord(position.x * self.inv_cell_size),
            cell_coord(position.y * self.inv_cell_size),
        )
    }

    /// Cells currently holding at least one shape.
    pub fn occupied_cells(&self) -> usize {
        self.occupied.len()
    }

    /// Shapes bucketed in `cell` (test and debug helper).
    pub fn shapes_in(&self, cell: CellKey) -> Vec<ShapeRef> {
        let Some(bucket) = self.buckets.get(&cell) else {
            return Vec::new();
        };
        let mut shapes = bucket.circles.clone();
        shapes.extend(bucket.segments.iter().map(|&slot| ShapeRef::Segment(slot)));
        shapes
    }

    fn bucket_mut(&mut self, cell: CellKey) -> &mut Bucket {
        let bucket = self.buckets.entry(cell).or_default();
        if bucket.is_empty() {
            self.occupied.push(cell);
        }
        bucket
    }

    fn insert_circle(&mut self, shape: ShapeRef, center: Vec2, radius: f32) {
        let reach = radius + self.buffer;
        let (min_x, min_y) = self.cell_of(Vec2::new(center.x - reach, center.y - reach));
        let (max_x, max_y) = self.cell_of(Vec2::new(center.x + reach, center.y + reach));
        let (cx, cy) = self.cell_of(center);
        let (min_x, max_x) = capped_span(min_x, max_x, cx);
        let (min_y, max_y) = capped_span(min_y, max_y, cy);
        for cy in min_y..=max_y {
            for cx in min_x..=max_x {
                self.bucket_mut((cx, cy)).circles.push(shape);
            }
        }
    }

    pub fn insert_particle(&mut self, slot: usize, center: Vec2, radius: f32) {
        self.insert_circle(ShapeRef::Particle(slot), center, radius);
    }

    pub fn insert_wheel(&mut self, slot: usize, center: Vec2, radius: f32) {
        self.insert_circle(ShapeRef::Wheel(slot), center, radius);
    }

    pub fn insert_line_segment(&mut self, slot: usize, a: Vec2, b: Vec2, radius: f32) {
        let reach = (((radius + self.buffer) * self.inv_cell_size).ceil() as i32)
            .clamp(1, MAX_SEGMENT_REACH);
        let mut visited: Vec<CellKey> = Vec::new();
        walk_cells(a * self.inv_cell_size, b * self.inv_cell_size, |cx, cy| {
            visited.push((cx, cy))
        });
        for (cx, cy) in visited {
            for ny in cy.saturating_sub(reach)..=cy.saturating_add(reach) {
                for nx in cx.saturating_sub(reach)..=cx.saturating_add(reach) {
                    let bucket = self.bucket_mut((nx, ny));
                    // neighborhoods of consecutive cells overlap
                    if bucket.segments.last() != Some(&slot) {
                        bucket.segments.push(slot);
                    }
                }
            }
        }
    }

    /// Bucket every collidable entity at its current position.
    pub fn rebuild(&mut self, entities: &Entities) {
        self.reset();
        for (slot, body) in entities.bodies.iter().enumerate() {
            if let Some(radius) = body.collision_radius() {
                self.insert_particle(slot, body.collision_center(), radius);
            }
        }
        for (slot, wheel) in entities.wheels.iter().enumerate() {
            if let Some(center) = entities.bodies.get(wheel.center.object_id()) {
                self.insert_wheel(slot, center.position(), wheel.radius);
            }
        }
        for (slot, segment) in entities.segments.iter().enumerate() {
            let a = entities.bodies.get(segment.a.object_id());
            let b = entities.bodies.get(segment.b.object_id());
            if let (Some(a), Some(b)) = (a, b) {
                self.insert_line_segment(slot, a.position(), b.position(), segment.radius);
            }
        }
    }

    /// Pair-test every occupied bucket and hand new pairs to `handler`.
    /// Buckets are emptied as they are processed. Returns the number of
    /// candidate pairs tested.
    pub fn create_collisions(
        &mut self,
        entities: &Entities,
        handler: &mut CollisionHandler,
    ) -> u32 {
        let mut candidates = 0u32;
        let occupied = std::mem::take(&mut self.occupied);
        for cell in &occupied {
            let Some(bucket) = self.buckets.get_mut(cell) else {
                continue;
            };
            candidates += test_bucket(bucket, entities, handler);
            bucket.clear();
        }
        if self.buckets.len() > occupied.len() * 4 + SPARE_BUCKETS {
            trace!("hash grid dropping {} idle buckets", self.buckets.len() - occupied.len());
            self.buckets.clear();
        }
        self.occupied = occupied;
        self.occupied.clear();
        candidates
    }

    /// Empty every bucket without testing.
    pub fn reset(&mut self) {
        for cell in self.occupied.drain(..) {
            if let Some(bucket) = self.buckets.get_mut(&cell) {
                bucket.clear();
            }
        }
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.occupied.clear();
    }
}

/// Clamp `min..=max` to at most `MAX_CIRCLE_SPAN` cells around `center`.
fn capped_span(min: i32, max: i32, center: i32) -> (i32, i32) {
    if max.saturating_sub(min) <= MAX_CIRCLE_SPAN {
        return (min, max);
    }
    let half = MAX_CIRCLE_SPAN / 2;
    (center.saturating_sub(half).max(min), center.saturating_add(half).min(max))
}

fn test_bucket(bucket: &Bucket, entities: &Entities, handler: &mut CollisionHandler) -> u32 {
    let mut candidates = 0u32;

    for (i, first) in bucket.circles.iter().enumerate() {
        let ShapeRef::Particle(slot_a) = *first else {
            continue;
        };
        for second in &bucket.circles[i + 1..] {
            // particle-wheel pairs are not resolved
            let ShapeRef::Particle(slot_b) = *second else {
                continue;
            };
            candidates += 1;
            let a = entities.bodies[slot_a].id();
            let b = entities.bodies[slot_b].id();
            handler.create_particle_particle(a, b, entities);
        }
    }

    for &segment_slot in &bucket.segments {
        let segment = &entities.segments[segment_slot];
        for circle in &bucket.circles {
            match *circle {
                ShapeRef::Particle(slot) => {
                    let particle = entities.bodies[slot].id();
                    if segment.has_endpoint(particle) {
                        continue;
                    }
                    candidates += 1;
                    handler.create_segment_particle(segment.handle(), particle, entities);
                }
                ShapeRef::Wheel(slot) => {
                    let wheel = &entities.wheels[slot];
                    if segment.has_endpoint(wheel.center) {
                        continue;
                    }
                    candidates += 1;
                    handler.create_segment_wheel(segment.handle(), wheel.handle(), entities);
                }
                ShapeRef::Segment(_) => {}
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AngularId, AngularState, Body, BodyId, ContactMaterial, LineSegment, ObjectId, Wheel,
    };

    fn body_id(raw: u32) -> BodyId {
        BodyId::from_object_id(ObjectId(raw))
    }

    fn handler() -> CollisionHandler {
        CollisionHandler::new(0.1, ContactMaterial::default())
    }

    #[test]
    fn circle_covers_its_bounding_box() {
        let mut grid = SpatialHashGrid::new(10.0, 0.0);
        grid.insert_particle(0, Vec2::new(10.0, 10.0), 3.0);
        for cell in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(grid.shapes_in(cell), vec![ShapeRef::Particle(0)], "cell {cell:?}");
        }
        assert_eq!(grid.occupied_cells(), 4);
        assert!(grid.shapes_in((2, 2)).is_empty());
    }

    #[test]
    fn segment_is_bucketed_once_per_cell() {
        let mut grid = SpatialHashGrid::new(10.0, 0.0);
        grid.insert_line_segment(3, Vec2::new(5.0, 5.0), Vec2::new(35.0, 5.0), 1.0);
        // axis cells 0..=3 on row 0, plus one ring of neighbors
        for cx in -1..=4 {
            for cy in -1..=1 {
                let shapes = grid.shapes_in((cx, cy));
                assert_eq!(shapes, vec![ShapeRef::Segment(3)], "cell {cx},{cy}");
            }
        }
        assert_eq!(grid.occupied_cells(), 6 * 3);
    }

    #[test]
    fn nearby_particles_become_collisions() {
        let mut entities = Entities::default();
        entities.bodies.insert(Body::particle(body_id(1), Vec2::new(1.0, 1.0), 1.0, 2.0, 0));
        entities.bodies.insert(Body::particle(body_id(2), Vec2::new(4.0, 1.0), 1.0, 2.0, 0));
        entities.bodies.insert(Body::particle(body_id(3), Vec2::new(90.0, 90.0), 1.0, 2.0, 0));

        let mut grid = SpatialHashGrid::new(20.0, 0.1);
        let mut handler = handler();
        grid.rebuild(&entities);
        let candidates = grid.create_collisions(&entities, &mut handler);
        assert!(candidates >= 1);
        assert_eq!(handler.len(), 1);
        assert!(handler.contains(crate::domain::CollisionKey::new(ObjectId(1), ObjectId(2))));
        assert_eq!(grid.occupied_cells(), 0);
    }

    #[test]
    fn segment_skips_its_own_endpoints_and_wheel_axles() {
        let mut entities = Entities::default();
        entities.bodies.insert(Body::particle(body_id(1), Vec2::new(0.0, 0.0), 1.0, 2.0, 0));
        entities.bodies.insert(Body::particle(body_id(2), Vec2::new(30.0, 0.0), 1.0, 2.0, 0));
        entities.bodies.insert(Body::particle(body_id(3), Vec2::new(15.0, 2.0), 1.0, 2.0, 0));
        let angular = AngularId::from_object_id(ObjectId(5));
        entities.angular.insert(AngularState::new(angular, 0.0, 1.0));
        entities.wheels.insert(Wheel { id: ObjectId(6), center: body_id(2), angular, radius: 4.0 });
        entities.segments.insert(LineSegment {
            id: ObjectId(7),
            a: body_id(1),
            b: body_id(2),
            radius: 1.0,
        });

        let mut grid = SpatialHashGrid::new(20.0, 0.1);
        let mut handler = handler();
        grid.rebuild(&entities);
        grid.create_collisions(&entities, &mut handler);

        let keys: Vec<_> = handler.iter().map(|c| c.key()).collect();
        assert_eq!(keys, vec![crate::domain::CollisionKey::new(ObjectId(3), ObjectId(7))]);
    }

    #[test]
    fn distant_segment_saturates_at_the_grid_edge() {
        let mut grid = SpatialHashGrid::new(20.0, 0.1);
        grid.insert_line_segment(0, Vec2::new(5e10, 0.0), Vec2::new(5e10, 10.0), 1.0);
        assert_eq!(grid.shapes_in((i32::MAX, 0)), vec![ShapeRef::Segment(0)]);
        assert_eq!(grid.shapes_in((i32::MAX - 1, -1)), vec![ShapeRef::Segment(0)]);
        assert_eq!(grid.occupied_cells(), 2 * 3);
    }

    #[test]
    fn oversized_circle_covers_a_bounded_span() {
        let mut grid = SpatialHashGrid::new(20.0, 0.1);
        grid.insert_particle(0, Vec2::ZERO, 1e6);
        let side = (MAX_CIRCLE_SPAN + 1) as usize;
        assert_eq!(grid.occupied_cells(), side * side);
        assert_eq!(grid.shapes_in((0, 0)), vec![ShapeRef::Particle(0)]);
        assert_eq!(grid.shapes_in((-32, 32)), vec![ShapeRef::Particle(0)]);
        assert!(grid.shapes_in((33, 0)).is_empty());
    }

    #[test]
    fn idle_buckets_are_eventually_dropped() {
        let entities = Entities::default();
        let mut grid = SpatialHashGrid::new(1.0, 0.0);
        let mut handler = handler();
        grid.insert_line_segment(0, Vec2::new(0.0, 0.0), Vec2::new(500.0, 0.0), 0.1);
        grid.reset();
        assert!(grid.buckets.len() > SPARE_BUCKETS);
        grid.create_collisions(&entities, &mut handler);
        assert!(grid.buckets.is_empty());
    }
}
