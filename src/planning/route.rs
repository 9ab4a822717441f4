//! Lattice leg planner.
//!
//! A* over (cell, heading) states connecting two poses with the
//! robot's drivable moves: one-cell straight runs forward or
//! backward, and quarter arcs at the minimum turning radius. Arc
//! moves land `radius` cells forward and `radius` cells to the side,
//! so the turning radius must be a whole number of cells.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::f32::consts::FRAC_PI_2;

use tracing::warn;

use crate::arena::Arena;
use crate::core::{Point2D, Pose2D};
use crate::planning::feasibility::{arc_is_valid, pose_is_valid, straight_is_valid};
use crate::planning::GridPose;

/// One drivable move on the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// One cell straight ahead
    Forward,
    /// One cell straight back
    Backward,
    /// Quarter arc to the left (anticlockwise)
    TurnLeft,
    /// Quarter arc to the right (clockwise)
    TurnRight,
}

/// A planned pose-to-pose leg.
#[derive(Debug, Clone)]
pub struct LegPlan {
    /// Moves from the leg start to its end
    pub moves: Vec<Move>,
    /// Pose after every move; `poses[0]` is the start pose,
    /// `poses[moves.len()]` the end pose
    pub poses: Vec<Pose2D>,
    /// Sum of move costs
    pub cost: f32,
}

/// Configuration for the leg planner.
#[derive(Debug, Clone, Copy)]
pub struct LegPlannerConfig {
    /// Turning radius in cells
    pub turn_radius_cells: i32,
    /// Cost multiplier for arc moves
    pub arc_cost_weight: f32,
    /// Iteration budget before giving up
    pub max_iterations: usize,
}

/// A* planner for one pose-to-pose leg.
pub struct LegPlanner<'a> {
    arena: &'a Arena,
    config: LegPlannerConfig,
}

/// Node in the search frontier.
#[derive(Clone, Debug)]
struct SearchNode {
    state: GridPose,
    f_score: f32,
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl Eq for SearchNode {}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (lower f_score = higher priority)
        other
            .f_score
            .partial_cmp(&self.f_score)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'a> LegPlanner<'a> {
    /// Create a planner over an arena.
    pub fn new(arena: &'a Arena, config: LegPlannerConfig) -> Self {
        Self { arena, config }
    }

    /// Length of one arc move in centimeters.
    #[inline]
    fn arc_length(&self) -> f32 {
        FRAC_PI_2 * self.config.turn_radius_cells as f32 * self.arena.cell_cm()
    }

    /// Plan a leg from `from` to `to`.
    ///
    /// Returns `None` when no drivable connection exists within the
    /// iteration budget.
    pub fn plan(&self, from: GridPose, to: GridPose) -> Option<LegPlan> {
        let cell = self.arena.cell_cm();
        if !pose_is_valid(self.arena, from.point(cell)) {
            return None;
        }
        if !pose_is_valid(self.arena, to.point(cell)) {
            return None;
        }
        if from == to {
            return Some(LegPlan {
                moves: Vec::new(),
                poses: vec![from.pose(cell)],
                cost: 0.0,
            });
        }

        let mut open_set = BinaryHeap::new();
        let mut g_score: HashMap<GridPose, f32> = HashMap::new();
        let mut parent: HashMap<GridPose, (GridPose, Move)> = HashMap::new();
        let mut closed_set: HashSet<GridPose> = HashSet::new();

        g_score.insert(from, 0.0);
        open_set.push(SearchNode {
            state: from,
            f_score: Self::heuristic(from, to, cell),
        });

        let mut iterations = 0;

        while let Some(current_node) = open_set.pop() {
            iterations += 1;
            if iterations > self.config.max_iterations {
                warn!("leg search exceeded iteration budget");
                return None;
            }

            let current = current_node.state;
            if current == to {
                return Some(self.reconstruct(&parent, from, to));
            }

            if !closed_set.insert(current) {
                continue;
            }

            let current_g = *g_score.get(&current).unwrap_or(&f32::MAX);

            for mv in [Move::Forward, Move::Backward, Move::TurnLeft, Move::TurnRight] {
                let Some(next) = self.apply_move(current, mv) else {
                    continue;
                };
                if closed_set.contains(&next) {
                    continue;
                }

                let new_g = current_g + self.move_cost(mv);
                let existing_g = *g_score.get(&next).unwrap_or(&f32::MAX);
                if new_g < existing_g {
                    g_score.insert(next, new_g);
                    parent.insert(next, (current, mv));
                    open_set.push(SearchNode {
                        state: next,
                        f_score: new_g + Self::heuristic(next, to, cell),
                    });
                }
            }
        }

        None
    }

    /// Euclidean distance heuristic in centimeters.
    #[inline]
    fn heuristic(from: GridPose, to: GridPose, cell_cm: f32) -> f32 {
        from.point(cell_cm).distance(&to.point(cell_cm))
    }

    /// Cost of one move in centimeters (arcs weighted).
    #[inline]
    fn move_cost(&self, mv: Move) -> f32 {
        match mv {
            Move::Forward | Move::Backward => self.arena.cell_cm(),
            Move::TurnLeft | Move::TurnRight => self.config.arc_cost_weight * self.arc_length(),
        }
    }

    /// Resulting state of a move, or `None` when the swept motion is
    /// infeasible.
    fn apply_move(&self, state: GridPose, mv: Move) -> Option<GridPose> {
        let cell = self.arena.cell_cm();
        let r_cells = self.config.turn_radius_cells;
        let radius = r_cells as f32 * cell;
        let from_pt = state.point(cell);

        let next = match mv {
            Move::Forward => {
                let (dx, dy) = state.dir.step();
                GridPose::new(state.x + dx, state.y + dy, state.dir)
            }
            Move::Backward => {
                let (dx, dy) = state.dir.step();
                GridPose::new(state.x - dx, state.y - dy, state.dir)
            }
            Move::TurnLeft => {
                let (fx, fy) = state.dir.step();
                let side = state.dir.turned_left();
                let (sx, sy) = side.step();
                GridPose::new(
                    state.x + r_cells * (fx + sx),
                    state.y + r_cells * (fy + sy),
                    side,
                )
            }
            Move::TurnRight => {
                let (fx, fy) = state.dir.step();
                let side = state.dir.turned_right();
                let (sx, sy) = side.step();
                GridPose::new(
                    state.x + r_cells * (fx + sx),
                    state.y + r_cells * (fy + sy),
                    side,
                )
            }
        };

        let feasible = match mv {
            Move::Forward | Move::Backward => {
                straight_is_valid(self.arena, from_pt, next.point(cell))
            }
            Move::TurnLeft => {
                let (sx, sy) = state.dir.turned_left().unit();
                let center = Point2D::new(from_pt.x + radius * sx, from_pt.y + radius * sy);
                let start_angle = state.dir.angle() - FRAC_PI_2;
                arc_is_valid(self.arena, center, radius, start_angle, FRAC_PI_2)
            }
            Move::TurnRight => {
                let (sx, sy) = state.dir.turned_right().unit();
                let center = Point2D::new(from_pt.x + radius * sx, from_pt.y + radius * sy);
                let start_angle = state.dir.angle() + FRAC_PI_2;
                arc_is_valid(self.arena, center, radius, start_angle, -FRAC_PI_2)
            }
        };

        feasible.then_some(next)
    }

    /// Rebuild the move and pose sequence from the parent map.
    fn reconstruct(
        &self,
        parent: &HashMap<GridPose, (GridPose, Move)>,
        from: GridPose,
        to: GridPose,
    ) -> LegPlan {
        let cell = self.arena.cell_cm();
        let mut moves = Vec::new();
        let mut states = vec![to];
        let mut current = to;

        while current != from {
            let (prev, mv) = parent[&current];
            moves.push(mv);
            states.push(prev);
            current = prev;
        }

        moves.reverse();
        states.reverse();

        let cost = moves.iter().map(|&mv| self.move_cost(mv)).sum();
        let poses = states.iter().map(|s| s.pose(cell)).collect();

        LegPlan { moves, poses, cost }
    }
}
