//! Request-handler boundary.
//!
//! The only module that speaks the transport schema: an [`AlgoInput`]
//! comes in, a [`PlanOutcome`] (library callers) or serialized
//! [`PlanResponse`] (transport) goes out. Everything here is a thin
//! layer over the planning and motion modules; no search logic lives
//! at this level.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::arena::{Arena, Obstacle};
use crate::config::{PlannerConfig, DEFAULT_START_CELL};
use crate::core::{Direction, Pose2D};
use crate::error::{PlanError, Result};
use crate::motion::{convert_legs, replay, RobotAction};
use crate::planning::route::{LegPlan, LegPlannerConfig};
use crate::planning::{generate_candidates, search_tour, AlgoType, GridPose, LegMatrix};

/// Operational variant of a request. Selects the grid resolution the
/// input coordinates are expressed in; the arena itself is the same
/// size in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Simulator,
    #[default]
    Live,
}

impl Mode {
    /// Centimeters per input grid unit.
    #[inline]
    pub fn cell_cm(&self) -> f32 {
        match self {
            Mode::Simulator => 5.0,
            Mode::Live => 10.0,
        }
    }
}

/// One obstacle as delivered by the transport.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObstacleInput {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub d: Direction,
}

/// Optional start pose in grid units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InitialPosition {
    pub x: i32,
    pub y: i32,
    pub theta: f32,
}

/// Configuration for one planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgoInput {
    #[serde(default)]
    pub mode: Mode,
    pub obstacles: Vec<ObstacleInput>,
    #[serde(default)]
    pub initial_position: Option<InitialPosition>,
    #[serde(default)]
    pub algo_type: AlgoType,
}

/// Outcome status of a run that produced a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status")]
pub enum PlanStatus {
    /// Every obstacle is scanned
    Complete,
    /// Some obstacles could not be scanned; their ids are listed
    Partial { unreachable: Vec<u32> },
}

/// A finished plan.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub status: PlanStatus,
    /// Ordered action sequence, one `Scan` per visited obstacle
    pub actions: Vec<RobotAction>,
    /// Obstacle ids in visit order
    pub visit_order: Vec<u32>,
    /// Every pose along the tour, for playback
    pub pose_trace: Vec<Pose2D>,
    /// Sum of leg costs
    pub total_cost: f32,
    /// Whether the search budget cut the tour short
    pub truncated: bool,
}

/// Plan a scan tour for one request.
///
/// Configuration errors abort the run; infeasible obstacles and
/// search truncation degrade it to a partial plan instead.
pub fn plan(input: &AlgoInput, config: &PlannerConfig) -> Result<PlanOutcome> {
    let started = Instant::now();
    config.validate()?;

    let cell_cm = input.mode.cell_cm();
    let standoff_cells = cells_of(config.scan.standoff_cm, cell_cm, "scan standoff")?;
    let turn_radius_cells = cells_of(config.robot.turn_radius_cm, cell_cm, "turn radius")?;

    let obstacles: Vec<Obstacle> = input
        .obstacles
        .iter()
        .map(|ob| Obstacle::new(ob.id, ob.x, ob.y, ob.d))
        .collect();
    let arena = Arena::new(
        config.arena.size_cm,
        cell_cm,
        config.robot.half_width_cm,
        config.robot.clearance_cm,
        obstacles,
    )?;

    let start = start_pose(input, &arena)?;
    info!(
        "planning {} obstacles from ({}, {}) facing {:?} with {:?}",
        arena.obstacles().len(),
        start.x,
        start.y,
        start.dir,
        input.algo_type
    );

    let candidates = generate_candidates(&arena, standoff_cells, config.scan.lateral_offset_cells);

    let leg_config = LegPlannerConfig {
        turn_radius_cells,
        arc_cost_weight: config.search.arc_cost_weight,
        max_iterations: config.search.max_leg_iterations,
    };
    let matrix = LegMatrix::build(&arena, leg_config, start, &candidates, config.search.workers);

    let tour = search_tour(
        &matrix,
        cell_cm,
        input.algo_type,
        config.search.max_search_expansions,
    );

    let legs = collect_legs(&matrix, &tour.nodes)?;
    let converted = convert_legs(&legs, config.robot.turn_radius_cm, cell_cm);
    replay(start.pose(cell_cm), &converted.actions, &converted.scan_poses)?;

    let mut unreachable = candidates.unreachable.clone();
    unreachable.extend(&tour.unreachable);
    unreachable.sort_unstable();

    let status = if unreachable.is_empty() {
        PlanStatus::Complete
    } else {
        PlanStatus::Partial {
            unreachable: unreachable.clone(),
        }
    };

    info!(
        "planned {} actions over {} obstacles in {:.1?} (cost {:.1}{})",
        converted.actions.len(),
        tour.visited.len(),
        started.elapsed(),
        tour.cost,
        if tour.truncated { ", truncated" } else { "" }
    );

    Ok(PlanOutcome {
        status,
        actions: converted.actions,
        visit_order: tour.visited,
        pose_trace: converted.pose_trace,
        total_cost: tour.cost,
        truncated: tour.truncated,
    })
}

/// Whole number of grid cells for a configured length.
fn cells_of(length_cm: f32, cell_cm: f32, what: &str) -> Result<i32> {
    let cells = length_cm / cell_cm;
    if (cells - cells.round()).abs() > 1e-4 || cells.round() < 1.0 {
        return Err(PlanError::Config(format!(
            "{} of {} cm is not a whole number of {} cm cells",
            what, length_cm, cell_cm
        )));
    }
    Ok(cells.round() as i32)
}

/// Start pose from the request, snapped to the lattice.
fn start_pose(input: &AlgoInput, arena: &Arena) -> Result<GridPose> {
    let (x, y, dir) = match input.initial_position {
        Some(p) => (p.x, p.y, Direction::from_theta(p.theta)),
        None => (DEFAULT_START_CELL.0, DEFAULT_START_CELL.1, Direction::North),
    };
    if x < 0 || y < 0 || x >= arena.cells() || y >= arena.cells() {
        return Err(PlanError::Config(format!(
            "initial position ({}, {}) is outside the grid",
            x, y
        )));
    }
    Ok(GridPose::new(x, y, dir))
}

/// Fetch the planned legs along the tour.
fn collect_legs(matrix: &LegMatrix, nodes: &[usize]) -> Result<Vec<LegPlan>> {
    let mut legs = Vec::with_capacity(nodes.len());
    let mut at = 0usize;
    for &next in nodes {
        let leg = matrix.leg(at, next).ok_or_else(|| {
            PlanError::Converter(format!("tour references unplanned leg {} -> {}", at, next))
        })?;
        legs.push(leg.clone());
        at = next;
    }
    Ok(legs)
}

/// Transport-level response, including the failure shape.
#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    pub status: &'static str,
    pub actions: Vec<RobotAction>,
    pub visit_order: Vec<u32>,
    pub unreachable: Vec<u32>,
    pub positions: Vec<Pose2D>,
    pub total_cost: f32,
    pub truncated: bool,
    pub runtime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlanResponse {
    /// Map a planning result onto the wire shape.
    pub fn from_result(result: Result<PlanOutcome>, elapsed: Duration) -> Self {
        let runtime = format!("{:.3}s", elapsed.as_secs_f32());
        match result {
            Ok(outcome) => {
                let (status, unreachable) = match outcome.status {
                    PlanStatus::Complete => ("complete", Vec::new()),
                    PlanStatus::Partial { unreachable } => ("partial", unreachable),
                };
                Self {
                    status,
                    actions: outcome.actions,
                    visit_order: outcome.visit_order,
                    unreachable,
                    positions: outcome.pose_trace,
                    total_cost: outcome.total_cost,
                    truncated: outcome.truncated,
                    runtime,
                    error: None,
                }
            }
            Err(err) => Self {
                status: "failed",
                actions: Vec::new(),
                visit_order: Vec::new(),
                unreachable: Vec::new(),
                positions: Vec::new(),
                total_cost: 0.0,
                truncated: false,
                runtime,
                error: Some(err.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_obstacle_input() -> AlgoInput {
        AlgoInput {
            mode: Mode::Live,
            obstacles: vec![
                ObstacleInput {
                    id: 1,
                    x: 4,
                    y: 8,
                    d: Direction::North,
                },
                ObstacleInput {
                    id: 2,
                    x: 15,
                    y: 15,
                    d: Direction::South,
                },
            ],
            initial_position: Some(InitialPosition {
                x: 1,
                y: 1,
                theta: 1.57,
            }),
            algo_type: AlgoType::ExhaustiveAstar,
        }
    }

    #[test]
    fn test_plan_completes_and_scans_each_obstacle() {
        let outcome = plan(&two_obstacle_input(), &PlannerConfig::default()).unwrap();
        assert_eq!(outcome.status, PlanStatus::Complete);
        let scans = outcome
            .actions
            .iter()
            .filter(|a| matches!(a, RobotAction::Scan))
            .count();
        assert_eq!(scans, 2);
        assert_eq!(outcome.visit_order.len(), 2);
        assert!(outcome.total_cost > 0.0);
        assert!(!outcome.truncated);
    }

    #[test]
    fn test_overlapping_obstacles_fail_before_search() {
        let mut input = two_obstacle_input();
        input.obstacles[1].x = input.obstacles[0].x;
        input.obstacles[1].y = input.obstacles[0].y;
        let result = plan(&input, &PlannerConfig::default());
        assert!(matches!(result, Err(PlanError::Config(_))));
    }

    #[test]
    fn test_initial_theta_snaps_to_band() {
        let mut input = two_obstacle_input();
        // 0.5 rad is inside the East band despite pointing well off
        // the axis
        input.initial_position = Some(InitialPosition {
            x: 1,
            y: 1,
            theta: 0.5,
        });
        let outcome = plan(&input, &PlannerConfig::default()).unwrap();
        assert_eq!(outcome.status, PlanStatus::Complete);
    }

    #[test]
    fn test_flush_obstacle_reported_partial() {
        let mut input = two_obstacle_input();
        input.obstacles.push(ObstacleInput {
            id: 3,
            x: 10,
            y: 19,
            d: Direction::North,
        });
        let outcome = plan(&input, &PlannerConfig::default()).unwrap();
        assert_eq!(
            outcome.status,
            PlanStatus::Partial {
                unreachable: vec![3]
            }
        );
        assert_eq!(outcome.visit_order.len(), 2);
    }

    #[test]
    fn test_input_defaults_from_json() {
        let input: AlgoInput = serde_json::from_str(
            r#"{ "obstacles": [ { "id": 1, "x": 10, "y": 10, "d": "N" } ] }"#,
        )
        .unwrap();
        assert_eq!(input.mode, Mode::Live);
        assert_eq!(input.algo_type, AlgoType::ExhaustiveAstar);
        assert!(input.initial_position.is_none());
    }

    #[test]
    fn test_failed_response_shape() {
        let mut input = two_obstacle_input();
        input.obstacles.clear();
        let result = plan(&input, &PlannerConfig::default());
        let response = PlanResponse::from_result(result, Duration::from_millis(12));
        assert_eq!(response.status, "failed");
        assert!(response.error.is_some());
        assert!(response.actions.is_empty());
    }
}
