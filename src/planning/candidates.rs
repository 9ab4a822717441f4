//! Candidate scan poses.
//!
//! For each obstacle, the robot must stop at the standoff distance on
//! the side the obstacle faces, heading toward it. Lateral offsets of
//! up to `lateral_offset_cells` grid cells to either side widen the
//! candidate set when the straight-on pose is blocked by a neighbor
//! or a wall.

use tracing::warn;

use crate::arena::{Arena, Obstacle};
use crate::planning::feasibility::pose_is_valid;
use crate::planning::GridPose;

/// Valid scan poses for one obstacle.
#[derive(Debug, Clone)]
pub struct ObstacleCandidates {
    pub obstacle_id: u32,
    pub poses: Vec<GridPose>,
}

/// Candidate poses for every obstacle of a request.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    /// Obstacles with at least one valid pose, in input order
    pub per_obstacle: Vec<ObstacleCandidates>,
    /// Obstacles where every candidate is blocked or out of bounds
    pub unreachable: Vec<u32>,
}

/// Scan poses for a single obstacle, in deterministic order: the
/// straight-on pose first, then offsets by increasing magnitude,
/// negative side first.
pub fn scan_poses(
    arena: &Arena,
    obstacle: &Obstacle,
    standoff_cells: i32,
    lateral_offset_cells: i32,
) -> Vec<GridPose> {
    let (fx, fy) = obstacle.facing.step();
    let base = (
        obstacle.x + fx * standoff_cells,
        obstacle.y + fy * standoff_cells,
    );
    let (lx, ly) = obstacle.facing.turned_left().step();
    let heading = obstacle.facing.reversed();

    let mut offsets = vec![0];
    for k in 1..=lateral_offset_cells {
        offsets.push(-k);
        offsets.push(k);
    }

    offsets
        .into_iter()
        .map(|k| GridPose::new(base.0 + lx * k, base.1 + ly * k, heading))
        .filter(|pose| pose_is_valid(arena, pose.point(arena.cell_cm())))
        .collect()
}

/// Generate candidates for every obstacle.
///
/// Obstacles with an empty candidate set are excluded from planning
/// and reported; they degrade the run to a partial plan rather than
/// failing it.
pub fn generate_candidates(
    arena: &Arena,
    standoff_cells: i32,
    lateral_offset_cells: i32,
) -> CandidateSet {
    let mut per_obstacle = Vec::new();
    let mut unreachable = Vec::new();

    for obstacle in arena.obstacles() {
        let poses = scan_poses(arena, obstacle, standoff_cells, lateral_offset_cells);
        if poses.is_empty() {
            warn!(
                "obstacle {} has no feasible scan pose, excluding it",
                obstacle.id
            );
            unreachable.push(obstacle.id);
        } else {
            per_obstacle.push(ObstacleCandidates {
                obstacle_id: obstacle.id,
                poses,
            });
        }
    }

    CandidateSet {
        per_obstacle,
        unreachable,
    }
}
