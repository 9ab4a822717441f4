//! Planning layer: scan-pose generation, pose-to-pose leg planning
//! and the visit-order search.
//!
//! - [`feasibility`]: pose and swept-motion validity predicates
//! - [`candidates`]: standoff scan poses per obstacle
//! - [`route`]: lattice A* planner connecting two poses
//! - [`matrix`]: all-pairs leg plans, optionally on worker threads
//! - [`tour`]: visit-order search with three strategies

pub mod candidates;
pub mod feasibility;
pub mod matrix;
pub mod route;
pub mod tour;

pub use candidates::{generate_candidates, CandidateSet, ObstacleCandidates};
pub use matrix::{LegMatrix, MatrixNode};
pub use route::{LegPlan, LegPlanner, Move};
pub use tour::{search_tour, AlgoType, Tour};

use serde::{Deserialize, Serialize};

use crate::core::{Direction, Point2D, Pose2D};

/// A pose on the planning lattice: a grid cell plus a cardinal
/// heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPose {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
}

impl GridPose {
    /// Create a new lattice pose.
    #[inline]
    pub fn new(x: i32, y: i32, dir: Direction) -> Self {
        Self { x, y, dir }
    }

    /// Position in centimeters for a given cell size.
    #[inline]
    pub fn point(&self, cell_cm: f32) -> Point2D {
        Point2D::new(self.x as f32 * cell_cm, self.y as f32 * cell_cm)
    }

    /// Continuous pose in centimeters with the exact geometric
    /// heading.
    #[inline]
    pub fn pose(&self, cell_cm: f32) -> Pose2D {
        let p = self.point(cell_cm);
        Pose2D::new(p.x, p.y, self.dir.angle())
    }
}
