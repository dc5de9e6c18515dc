use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Lengths below this are treated as degenerate (no usable direction).
pub const LENGTH_EPSILON: f32 = 0.0001;

/// 2D vector for solver math
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const UNIT_X: Vec2 = Vec2 { x: 1.0, y: 0.0 };
    pub const UNIT_Y: Vec2 = Vec2 { x: 0.0, y: 1.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn zero() -> Self {
        Self::ZERO
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn dot(&self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Scalar cross product `self.x * other.y - self.y * other.x`.
    ///
    /// For unit vectors this is the sine of the angle from `self` to `other`.
    #[inline]
    pub fn perp_dot(&self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Counter-clockwise perpendicular `(-y, x)`.
    #[inline]
    pub fn perp(&self) -> Self {
        Self { x: -self.y, y: self.x }
    }

    #[inline]
    pub fn scale(&self, s: f32) -> Self {
        Self { x: self.x * s, y: self.y * s }
    }

    /// Unit vector, or zero for degenerate input.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > LENGTH_EPSILON {
            Self { x: self.x / len, y: self.y / len }
        } else {
            Self::zero()
        }
    }

    #[inline]
    pub fn distance_squared(&self, other: Vec2) -> f32 {
        (other - *self).length_squared()
    }

    /// Unit vector at `angle` radians from the x axis.
    #[inline]
    pub fn from_angle(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self { x: cos, y: sin }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

impl Div<f32> for Vec2 {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self { x: self.x / rhs, y: self.y / rhs }
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

/// `k > 0 ? 1/k : 0`, the guard used for every mass and inertia inverse.
#[inline]
pub fn safe_inverse(k: f32) -> f32 {
    if k > 0.0 && k.is_finite() {
        1.0 / k
    } else {
        0.0
    }
}

/// Parameter of the point on segment `a..b` closest to `p`, clamped to `[0, 1]`.
pub fn closest_point_param(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= LENGTH_EPSILON * LENGTH_EPSILON {
        return 0.0;
    }
    ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perp_dot_is_sine_of_relative_angle() {
        let a = Vec2::from_angle(0.3);
        let b = Vec2::from_angle(0.8);
        assert!((a.perp_dot(b) - 0.5f32.sin()).abs() < 1e-5);
        assert!((a.dot(b) - 0.5f32.cos()).abs() < 1e-5);
    }

    #[test]
    fn perp_is_counter_clockwise() {
        let p = Vec2::UNIT_X.perp();
        assert_eq!(p, Vec2::UNIT_Y);
        assert_eq!(Vec2::UNIT_X.perp_dot(p), 1.0);
    }

    #[test]
    fn normalize_degenerate_is_zero() {
        assert_eq!(Vec2::new(0.0, 0.0).normalize(), Vec2::ZERO);
        let n = Vec2::new(3.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn safe_inverse_guards_zero_and_negative() {
        assert_eq!(safe_inverse(0.0), 0.0);
        assert_eq!(safe_inverse(-2.0), 0.0);
        assert_eq!(safe_inverse(f32::INFINITY), 0.0);
        assert_eq!(safe_inverse(4.0), 0.25);
    }

    #[test]
    fn closest_point_param_clamps_to_segment() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(closest_point_param(a, b, Vec2::new(5.0, 3.0)), 0.5);
        assert_eq!(closest_point_param(a, b, Vec2::new(-4.0, 1.0)), 0.0);
        assert_eq!(closest_point_param(a, b, Vec2::new(14.0, 1.0)), 1.0);
        assert_eq!(closest_point_param(a, a, Vec2::new(1.0, 1.0)), 0.0);
    }
}
