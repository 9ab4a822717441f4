//! Mathematical primitives for planar planning.
//!
//! Functions for angle normalization and angular arithmetic.

use std::f32::consts::PI;

/// Normalize angle to [-π, π].
///
/// # Example
/// ```
/// use yatra_nav::core::math::normalize_angle;
/// use std::f32::consts::PI;
///
/// assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-6);
/// assert!((normalize_angle(-3.0 * PI) - (-PI)).abs() < 1e-6);
/// ```
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a < -PI {
        a += 2.0 * PI;
    }
    a
}

/// Shortest angular difference from angle `a` to angle `b`.
///
/// Returns the signed angle you need to add to `a` to reach `b`,
/// taking the shortest path around the circle.
#[inline]
pub fn angle_diff(a: f32, b: f32) -> f32 {
    normalize_angle(b - a)
}
