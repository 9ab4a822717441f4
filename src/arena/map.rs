//! Arena with obstacle occupancy and inflated collision queries.
//!
//! The arena owns the obstacle set for one planning run and answers
//! the two questions the planner needs: is a grid cell free, occupied
//! or out of bounds, and is a continuous point blocked for the robot
//! center. Obstacles are inflated by the robot half width plus a
//! clearance margin so the robot can be treated as a point.

use crate::core::Point2D;
use crate::error::{PlanError, Result};

use super::obstacle::{Obstacle, OBSTACLE_HALF_CM};

/// Maximum number of obstacles per run; the visit-order search keys
/// its visited sets by a 64-bit mask.
pub const MAX_OBSTACLES: usize = 64;

/// Occupancy state of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Free,
    Occupied,
    OutOfBounds,
}

/// Static spatial model for one planning run.
#[derive(Debug, Clone)]
pub struct Arena {
    /// Side length of the square arena in centimeters
    size_cm: f32,
    /// Grid resolution in centimeters per cell
    cell_cm: f32,
    /// Cells per side
    cells: i32,
    /// Minimum distance of the robot center from every wall
    wall_margin_cm: f32,
    /// Chebyshev radius around an obstacle center that blocks the
    /// robot center
    inflation_cm: f32,
    obstacles: Vec<Obstacle>,
}

impl Arena {
    /// Build the arena for a request.
    ///
    /// Fails with a configuration error if the obstacle set is empty,
    /// too large, contains duplicate ids, stacks two obstacles on one
    /// cell, or places an obstacle outside the grid.
    pub fn new(
        size_cm: f32,
        cell_cm: f32,
        half_width_cm: f32,
        clearance_cm: f32,
        obstacles: Vec<Obstacle>,
    ) -> Result<Self> {
        if obstacles.is_empty() {
            return Err(PlanError::Config("obstacle set is empty".into()));
        }
        if obstacles.len() > MAX_OBSTACLES {
            return Err(PlanError::Config(format!(
                "too many obstacles: {} (max {})",
                obstacles.len(),
                MAX_OBSTACLES
            )));
        }

        let cells = (size_cm / cell_cm).round() as i32;
        for (i, ob) in obstacles.iter().enumerate() {
            if ob.x < 0 || ob.y < 0 || ob.x >= cells || ob.y >= cells {
                return Err(PlanError::Config(format!(
                    "obstacle {} at ({}, {}) is outside the {}x{} grid",
                    ob.id, ob.x, ob.y, cells, cells
                )));
            }
            for other in &obstacles[..i] {
                if other.id == ob.id {
                    return Err(PlanError::Config(format!(
                        "duplicate obstacle id {}",
                        ob.id
                    )));
                }
                if other.x == ob.x && other.y == ob.y {
                    return Err(PlanError::Config(format!(
                        "obstacles {} and {} share cell ({}, {})",
                        other.id, ob.id, ob.x, ob.y
                    )));
                }
            }
        }

        Ok(Self {
            size_cm,
            cell_cm,
            cells,
            wall_margin_cm: half_width_cm,
            inflation_cm: OBSTACLE_HALF_CM + half_width_cm + clearance_cm,
            obstacles,
        })
    }

    /// Occupancy state of a grid cell.
    pub fn cell_state(&self, x: i32, y: i32) -> CellState {
        if x < 0 || y < 0 || x >= self.cells || y >= self.cells {
            return CellState::OutOfBounds;
        }
        if self.obstacles.iter().any(|ob| ob.x == x && ob.y == y) {
            CellState::Occupied
        } else {
            CellState::Free
        }
    }

    /// Whether the robot center may rest at `point` without leaving
    /// the arena.
    #[inline]
    pub fn in_bounds(&self, point: Point2D) -> bool {
        let lo = self.wall_margin_cm;
        let hi = self.size_cm - self.wall_margin_cm;
        point.x >= lo && point.x <= hi && point.y >= lo && point.y <= hi
    }

    /// Whether the robot center at `point` overlaps any inflated
    /// obstacle footprint.
    #[inline]
    pub fn point_blocked(&self, point: Point2D) -> bool {
        self.obstacles.iter().any(|ob| {
            point.chebyshev_distance(&ob.center_cm(self.cell_cm)) < self.inflation_cm
        })
    }

    /// The obstacle set, in input order.
    #[inline]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Grid resolution in centimeters per cell.
    #[inline]
    pub fn cell_cm(&self) -> f32 {
        self.cell_cm
    }

    /// Cells per side.
    #[inline]
    pub fn cells(&self) -> i32 {
        self.cells
    }

    /// Side length in centimeters.
    #[inline]
    pub fn size_cm(&self) -> f32 {
        self.size_cm
    }
}
