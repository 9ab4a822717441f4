//! Pose and point types for planar navigation.

use serde::{Deserialize, Serialize};

use super::math::normalize_angle;

/// A 2D point in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    /// X coordinate in centimeters
    pub x: f32,
    /// Y coordinate in centimeters
    pub y: f32,
}

impl Point2D {
    /// Create a new point.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared distance to another point (avoids sqrt).
    #[inline]
    pub fn distance_squared(&self, other: &Point2D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point2D) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Chebyshev (chessboard) distance to another point.
    ///
    /// The collision metric for axis-aligned square footprints.
    #[inline]
    pub fn chebyshev_distance(&self, other: &Point2D) -> f32 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        dx.max(dy)
    }
}

impl Default for Point2D {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

/// Robot pose on the arena.
///
/// Position (x, y) in centimeters and heading (theta) in radians,
/// normalized to [-π, π].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in centimeters
    pub x: f32,
    /// Y position in centimeters
    pub y: f32,
    /// Heading in radians, normalized to [-π, π]
    pub theta: f32,
}

impl Pose2D {
    /// Create a new pose with theta normalized to [-π, π].
    #[inline]
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    /// Position of this pose, dropping the heading.
    #[inline]
    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Euclidean distance to another pose's position.
    #[inline]
    pub fn distance(&self, other: &Pose2D) -> f32 {
        self.point().distance(&other.point())
    }
}

impl Default for Pose2D {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    #[test]
    fn test_point_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(3.0, 4.0);
        assert_relative_eq!(a.distance(&b), 5.0);
        assert_relative_eq!(a.distance_squared(&b), 25.0);
    }

    #[test]
    fn test_point_chebyshev_distance() {
        let a = Point2D::new(10.0, 20.0);
        let b = Point2D::new(25.0, 15.0);
        assert_relative_eq!(a.chebyshev_distance(&b), 15.0);
        assert_relative_eq!(a.chebyshev_distance(&a), 0.0);
    }

    #[test]
    fn test_pose_normalizes_theta() {
        let p = Pose2D::new(0.0, 0.0, 3.0 * PI);
        assert_relative_eq!(p.theta, PI, epsilon = 1e-6);
    }

    #[test]
    fn test_pose_distance_ignores_heading() {
        let a = Pose2D::new(0.0, 0.0, 0.0);
        let b = Pose2D::new(30.0, 40.0, PI);
        assert_relative_eq!(a.distance(&b), 50.0);
    }
}
