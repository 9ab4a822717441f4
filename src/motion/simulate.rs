//! Kinematic replay of an action sequence.
//!
//! Before a plan leaves the planner, its actions are replayed forward
//! from the start pose with the same straight/arc kinematics the
//! robot uses. Every `Scan` must land on its expected stopping pose
//! within tight tolerances; a mismatch means the converter produced
//! an unexecutable plan and the run fails instead of returning it.

use std::f32::consts::FRAC_PI_2;

use crate::core::math::{angle_diff, normalize_angle};
use crate::core::Pose2D;
use crate::error::{PlanError, Result};
use crate::motion::action::RobotAction;

/// Maximum position error at a stopping pose, in centimeters.
pub const POSITION_TOLERANCE_CM: f32 = 0.5;

/// Maximum heading error at a stopping pose, in radians.
pub const HEADING_TOLERANCE_RAD: f32 = 0.05;

/// Replay `actions` from `start` and check every `Scan` against its
/// expected stopping pose.
///
/// Returns the pose after each action. Fails with a converter error
/// when a scan lands off its target or the scan count disagrees with
/// the expected poses.
pub fn replay(start: Pose2D, actions: &[RobotAction], scan_targets: &[Pose2D]) -> Result<Vec<Pose2D>> {
    let mut pose = start;
    let mut trace = Vec::with_capacity(actions.len());
    let mut scans = 0usize;

    for action in actions {
        pose = match action {
            RobotAction::Scan => {
                let target = scan_targets.get(scans).ok_or_else(|| {
                    PlanError::Converter(format!(
                        "scan {} has no expected stopping pose",
                        scans + 1
                    ))
                })?;
                check_arrival(&pose, target, scans)?;
                scans += 1;
                pose
            }
            RobotAction::MoveStraight { distance_straight } => {
                advance(pose, *distance_straight)
            }
            RobotAction::MoveBack { distance_straight } => advance(pose, -distance_straight),
            RobotAction::CurveLeft {
                distance_arc,
                theta,
                ..
            } => arc(pose, *distance_arc, *theta),
            RobotAction::CurveRight {
                distance_arc,
                theta,
                ..
            } => arc(pose, *distance_arc, *theta),
        };
        trace.push(pose);
    }

    if scans != scan_targets.len() {
        return Err(PlanError::Converter(format!(
            "emitted {} scans for {} stopping poses",
            scans,
            scan_targets.len()
        )));
    }

    Ok(trace)
}

/// Straight drive along the current heading; negative distance backs
/// up.
fn advance(pose: Pose2D, distance: f32) -> Pose2D {
    Pose2D::new(
        pose.x + distance * pose.theta.cos(),
        pose.y + distance * pose.theta.sin(),
        pose.theta,
    )
}

/// Arc drive: `theta_delta` is the signed heading change, the radius
/// follows from the arc length.
fn arc(pose: Pose2D, distance_arc: f32, theta_delta: f32) -> Pose2D {
    let radius = distance_arc / theta_delta.abs();
    // Center sits perpendicular to the heading, on the turn side
    let center_angle = if theta_delta >= 0.0 {
        pose.theta + FRAC_PI_2
    } else {
        pose.theta - FRAC_PI_2
    };
    let cx = pose.x + radius * center_angle.cos();
    let cy = pose.y + radius * center_angle.sin();

    let start_angle = f32::atan2(pose.y - cy, pose.x - cx);
    let end_angle = start_angle + theta_delta;
    Pose2D::new(
        cx + radius * end_angle.cos(),
        cy + radius * end_angle.sin(),
        normalize_angle(pose.theta + theta_delta),
    )
}

fn check_arrival(pose: &Pose2D, target: &Pose2D, scan_index: usize) -> Result<()> {
    let position_error = pose.distance(target);
    let heading_error = angle_diff(pose.theta, target.theta).abs();
    if position_error > POSITION_TOLERANCE_CM || heading_error > HEADING_TOLERANCE_RAD {
        return Err(PlanError::Converter(format!(
            "scan {} stops at ({:.2}, {:.2}, {:.3}) instead of ({:.2}, {:.2}, {:.3})",
            scan_index + 1,
            pose.x,
            pose.y,
            pose.theta,
            target.x,
            target.y,
            target.theta
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TurnDirection;
    use approx::assert_relative_eq;

    #[test]
    fn test_straight_advance() {
        let start = Pose2D::new(10.0, 10.0, 0.0);
        let trace = replay(
            start,
            &[RobotAction::MoveStraight {
                distance_straight: 40.0,
            }],
            &[],
        )
        .unwrap();
        assert_relative_eq!(trace[0].x, 50.0, epsilon = 1e-4);
        assert_relative_eq!(trace[0].y, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_back_reverses_heading_sign() {
        let start = Pose2D::new(50.0, 10.0, FRAC_PI_2);
        let trace = replay(
            start,
            &[RobotAction::MoveBack {
                distance_straight: 30.0,
            }],
            &[],
        )
        .unwrap();
        assert_relative_eq!(trace[0].x, 50.0, epsilon = 1e-4);
        assert_relative_eq!(trace[0].y, -20.0, epsilon = 1e-4);
        assert_relative_eq!(trace[0].theta, FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn test_left_arc_quarter_turn() {
        // Heading east, quarter left arc of radius 20: ends 20 forward
        // and 20 to the left, heading north
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let trace = replay(
            start,
            &[RobotAction::CurveLeft {
                distance_arc: FRAC_PI_2 * 20.0,
                theta: FRAC_PI_2,
                turn_direction: TurnDirection::Anticlockwise,
            }],
            &[],
        )
        .unwrap();
        assert_relative_eq!(trace[0].x, 20.0, epsilon = 1e-3);
        assert_relative_eq!(trace[0].y, 20.0, epsilon = 1e-3);
        assert_relative_eq!(trace[0].theta, FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn test_right_arc_quarter_turn() {
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let trace = replay(
            start,
            &[RobotAction::CurveRight {
                distance_arc: FRAC_PI_2 * 20.0,
                theta: -FRAC_PI_2,
                turn_direction: TurnDirection::Clockwise,
            }],
            &[],
        )
        .unwrap();
        assert_relative_eq!(trace[0].x, 20.0, epsilon = 1e-3);
        assert_relative_eq!(trace[0].y, -20.0, epsilon = 1e-3);
        assert_relative_eq!(trace[0].theta, -FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn test_scan_on_target_passes() {
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let target = Pose2D::new(40.0, 0.0, 0.0);
        let result = replay(
            start,
            &[
                RobotAction::MoveStraight {
                    distance_straight: 40.0,
                },
                RobotAction::Scan,
            ],
            &[target],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_scan_off_target_fails() {
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let target = Pose2D::new(40.0, 0.0, 0.0);
        let result = replay(
            start,
            &[
                RobotAction::MoveStraight {
                    distance_straight: 35.0,
                },
                RobotAction::Scan,
            ],
            &[target],
        );
        assert!(matches!(result, Err(PlanError::Converter(_))));
    }

    #[test]
    fn test_scan_count_mismatch_fails() {
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let result = replay(
            start,
            &[RobotAction::MoveStraight {
                distance_straight: 10.0,
            }],
            &[Pose2D::new(10.0, 0.0, 0.0)],
        );
        assert!(matches!(result, Err(PlanError::Converter(_))));
    }
}
