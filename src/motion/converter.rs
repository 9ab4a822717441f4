//! Convert planned legs into robot actions.
//!
//! Consecutive one-cell straight moves of the same sense collapse
//! into a single `MoveStraight`/`MoveBack`, each quarter arc becomes a
//! curve action, and a `Scan` is appended at every stopping pose.

use std::f32::consts::FRAC_PI_2;

use crate::core::{Pose2D, TurnDirection};
use crate::motion::action::RobotAction;
use crate::planning::route::{LegPlan, Move};

/// Action list for a whole tour, with the data needed to verify it.
#[derive(Debug, Clone)]
pub struct ConvertedPlan {
    /// Emitted actions, one `Scan` per visited obstacle
    pub actions: Vec<RobotAction>,
    /// Expected pose at each `Scan`, in emission order
    pub scan_poses: Vec<Pose2D>,
    /// Every pose along the tour, leg by leg
    pub pose_trace: Vec<Pose2D>,
}

/// Convert the tour's legs into actions.
///
/// `legs` are consecutive: each leg starts where the previous one
/// ended.
pub fn convert_legs(legs: &[LegPlan], turn_radius_cm: f32, cell_cm: f32) -> ConvertedPlan {
    let arc_length = FRAC_PI_2 * turn_radius_cm;
    let mut actions = Vec::new();
    let mut scan_poses = Vec::new();
    let mut pose_trace: Vec<Pose2D> = Vec::new();

    for (leg_index, leg) in legs.iter().enumerate() {
        let mut run: Option<(Move, usize)> = None;

        for &mv in &leg.moves {
            match mv {
                Move::Forward | Move::Backward => match run {
                    Some((kind, count)) if kind == mv => run = Some((kind, count + 1)),
                    Some((kind, count)) => {
                        actions.push(straight_action(kind, count, cell_cm));
                        run = Some((mv, 1));
                    }
                    None => run = Some((mv, 1)),
                },
                Move::TurnLeft | Move::TurnRight => {
                    if let Some((kind, count)) = run.take() {
                        actions.push(straight_action(kind, count, cell_cm));
                    }
                    actions.push(curve_action(mv, arc_length));
                }
            }
        }
        if let Some((kind, count)) = run.take() {
            actions.push(straight_action(kind, count, cell_cm));
        }

        actions.push(RobotAction::Scan);
        if let Some(&last) = leg.poses.last() {
            scan_poses.push(last);
        }

        let skip = if leg_index == 0 { 0 } else { 1 };
        pose_trace.extend(leg.poses.iter().skip(skip));
    }

    ConvertedPlan {
        actions,
        scan_poses,
        pose_trace,
    }
}

fn straight_action(kind: Move, count: usize, cell_cm: f32) -> RobotAction {
    let distance_straight = count as f32 * cell_cm;
    match kind {
        Move::Forward => RobotAction::MoveStraight { distance_straight },
        Move::Backward => RobotAction::MoveBack { distance_straight },
        Move::TurnLeft | Move::TurnRight => unreachable!("straight run cannot hold a turn"),
    }
}

fn curve_action(mv: Move, arc_length: f32) -> RobotAction {
    match mv {
        Move::TurnLeft => RobotAction::CurveLeft {
            distance_arc: arc_length,
            theta: FRAC_PI_2,
            turn_direction: TurnDirection::Anticlockwise,
        },
        Move::TurnRight => RobotAction::CurveRight {
            distance_arc: arc_length,
            theta: -FRAC_PI_2,
            turn_direction: TurnDirection::Clockwise,
        },
        Move::Forward | Move::Backward => unreachable!("curve cannot hold a straight move"),
    }
}
