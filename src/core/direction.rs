//! Cardinal directions and their mapping to continuous headings.
//!
//! The robot's heading is continuous, but every pose the planner
//! produces faces one of the four cardinal directions. Classification
//! of a continuous heading uses fixed tolerance bands around the
//! canonical values; the bands are deliberately asymmetric and match
//! the tuning of the physical robot.

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

use super::math::normalize_angle;

/// Canonical heading for each cardinal direction, in radians.
///
/// These are the wire values the robot firmware expects, not exact
/// multiples of π/2.
pub mod headings {
    pub const NORTH: f32 = 1.57;
    pub const EAST: f32 = 0.0;
    pub const SOUTH: f32 = -1.57;
    pub const WEST: f32 = 3.14;
}

/// Cardinal direction of an obstacle face or a robot heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "W")]
    West,
}

impl Direction {
    /// Canonical heading in radians, as reported to the robot.
    #[inline]
    pub fn theta(&self) -> f32 {
        match self {
            Direction::North => headings::NORTH,
            Direction::East => headings::EAST,
            Direction::South => headings::SOUTH,
            Direction::West => headings::WEST,
        }
    }

    /// Exact geometric heading in radians, used for kinematics so
    /// replayed motions do not drift.
    #[inline]
    pub fn angle(&self) -> f32 {
        match self {
            Direction::North => FRAC_PI_2,
            Direction::East => 0.0,
            Direction::South => -FRAC_PI_2,
            Direction::West => PI,
        }
    }

    /// Classify a continuous heading into a cardinal direction.
    ///
    /// Band boundaries on the normalized angle: [-0.7, 0.7] is East,
    /// (0.7, 2.0] is North, [-2.0, -0.7) is South, the remainder is
    /// West. Total: every finite heading maps to exactly one
    /// direction, and the canonical headings round-trip.
    pub fn from_theta(theta: f32) -> Direction {
        let t = normalize_angle(theta);
        if (-0.7..=0.7).contains(&t) {
            Direction::East
        } else if t > 0.7 && t <= 2.0 {
            Direction::North
        } else if t >= -2.0 && t < -0.7 {
            Direction::South
        } else {
            Direction::West
        }
    }

    /// Opposite direction.
    #[inline]
    pub fn reversed(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Direction after a 90° left (anticlockwise) turn.
    #[inline]
    pub fn turned_left(&self) -> Direction {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }

    /// Direction after a 90° right (clockwise) turn.
    #[inline]
    pub fn turned_right(&self) -> Direction {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    /// Unit cell step (dx, dy) for one move in this direction.
    #[inline]
    pub fn step(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    /// Unit vector in centimeter space.
    #[inline]
    pub fn unit(&self) -> (f32, f32) {
        let (dx, dy) = self.step();
        (dx as f32, dy as f32)
    }
}

/// Rotation sense of an arc move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDirection {
    Clockwise,
    Anticlockwise,
}
