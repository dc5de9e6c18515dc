//! Cell walk for line segments (DDA).

use crate::core::math::Vec2;

/// Cap on cells visited per segment; a segment longer than this many cells
/// only registers its first part.
pub(super) const MAX_WALK_CELLS: i32 = 4096;

#[inline]
pub(super) fn cell_coord(v: f32) -> i32 {
    v.floor() as i32
}

/// Visit every cell the segment `a..b` passes through, in order, starting at
/// `a`'s cell and ending at `b`'s. Coordinates are in cell units.
///
/// Each step moves to a 4-connected neighbor, so a walk visits exactly
/// `|Δcx| + |Δcy| + 1` cells.
pub(super) fn walk_cells(a: Vec2, b: Vec2, mut visit: impl FnMut(i32, i32)) {
    let mut cx = cell_coord(a.x);
    let mut cy = cell_coord(a.y);
    let end_x = cell_coord(b.x);
    let end_y = cell_coord(b.y);

    let dx = b.x - a.x;
    let dy = b.y - a.y;

    let step_x = if end_x > cx { 1 } else if end_x < cx { -1 } else { 0 };
    let step_y = if end_y > cy { 1 } else if end_y < cy { -1 } else { 0 };

    let inv_dx = if dx != 0.0 { 1.0 / dx.abs() } else { f32::INFINITY };
    let inv_dy = if dy != 0.0 { 1.0 / dy.abs() } else { f32::INFINITY };

    let next_boundary_x = if step_x > 0 { (cx + 1) as f32 } else { cx as f32 };
    let next_boundary_y = if step_y > 0 { (cy + 1) as f32 } else { cy as f32 };

    let mut t_max_x = if step_x != 0 {
        (next_boundary_x - a.x).abs() * inv_dx
    } else {
        f32::INFINITY
    };
    let mut t_max_y = if step_y != 0 {
        (next_boundary_y - a.y).abs() * inv_dy
    } else {
        f32::INFINITY
    };
    let t_delta_x = if step_x != 0 { inv_dx } else { f32::INFINITY };
    let t_delta_y = if step_y != 0 { inv_dy } else { f32::INFINITY };

    let steps = end_x
        .saturating_sub(cx)
        .saturating_abs()
        .saturating_add(end_y.saturating_sub(cy).saturating_abs())
        .min(MAX_WALK_CELLS);

    visit(cx, cy);
    for _ in 0..steps {
        // never step past the end cell on an axis that is already done
        let advance_x = if cx == end_x {
            false
        } else if cy == end_y {
            true
        } else {
            t_max_x < t_max_y
        };
        if advance_x {
            cx += step_x;
            t_max_x += t_delta_x;
        } else {
            cy += step_y;
            t_max_y += t_delta_y;
        }
        visit(cx, cy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(a: Vec2, b: Vec2) -> Vec<(i32, i32)> {
        let mut cells = Vec::new();
        walk_cells(a, b, |x, y| cells.push((x, y)));
        cells
    }

    #[test]
    fn single_cell_segment() {
        assert_eq!(walk(Vec2::new(0.2, 0.3), Vec2::new(0.8, 0.9)), vec![(0, 0)]);
    }

    #[test]
    fn horizontal_walk_covers_every_cell() {
        let cells = walk(Vec2::new(0.5, 2.5), Vec2::new(4.5, 2.5));
        assert_eq!(cells, vec![(0, 2), (1, 2), (2, 2), (3, 2), (4, 2)]);
    }

    #[test]
    fn reverse_walk_ends_at_start_cell() {
        let cells = walk(Vec2::new(3.5, -1.5), Vec2::new(0.5, -1.5));
        assert_eq!(cells.first(), Some(&(3, -2)));
        assert_eq!(cells.last(), Some(&(0, -2)));
        assert_eq!(cells.len(), 4);
    }

    #[test]
    fn diagonal_walk_is_connected_and_crosses_the_line() {
        let a = Vec2::new(0.1, 0.4);
        let b = Vec2::new(5.7, 3.2);
        let cells = walk(a, b);
        assert_eq!(cells.first(), Some(&(0, 0)));
        assert_eq!(cells.last(), Some(&(5, 3)));
        assert_eq!(cells.len(), 5 + 3 + 1);
        for pair in cells.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            assert_eq!((x1 - x0).abs() + (y1 - y0).abs(), 1);
        }
        // sample points along the line all land in visited cells
        for i in 0..=100 {
            let t = i as f32 / 100.0;
            let p = a + (b - a) * t;
            assert!(cells.contains(&(cell_coord(p.x), cell_coord(p.y))), "missed {p:?}");
        }
    }
}
