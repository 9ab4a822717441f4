//! Discrete robot actions.
//!
//! The planner's output vocabulary: stationary scans, straight runs
//! forward or backward, and fixed-radius arcs. Distances are in
//! centimeters, heading deltas in radians.

use serde::{Deserialize, Serialize};

use crate::core::TurnDirection;

/// One discrete motion primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RobotAction {
    /// Scan the obstacle the robot is stopped in front of
    Scan,
    /// Drive straight ahead
    MoveStraight { distance_straight: f32 },
    /// Drive straight backwards
    MoveBack { distance_straight: f32 },
    /// Arc to the left at the minimum turning radius
    CurveLeft {
        distance_arc: f32,
        theta: f32,
        turn_direction: TurnDirection,
    },
    /// Arc to the right at the minimum turning radius
    CurveRight {
        distance_arc: f32,
        theta: f32,
        turn_direction: TurnDirection,
    },
}

impl RobotAction {
    /// Whether this action moves the robot.
    #[inline]
    pub fn is_motion(&self) -> bool {
        !matches!(self, RobotAction::Scan)
    }

    /// Driven distance in centimeters (zero for scans).
    #[inline]
    pub fn distance(&self) -> f32 {
        match self {
            RobotAction::Scan => 0.0,
            RobotAction::MoveStraight { distance_straight }
            | RobotAction::MoveBack { distance_straight } => *distance_straight,
            RobotAction::CurveLeft { distance_arc, .. }
            | RobotAction::CurveRight { distance_arc, .. } => *distance_arc,
        }
    }
}
