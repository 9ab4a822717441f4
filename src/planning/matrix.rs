//! All-pairs leg plans between the start pose and candidate scan
//! poses.
//!
//! Every visit-order strategy consults the same matrix, so it is
//! computed once per request. Pairs within one obstacle and pairs
//! leading back to the start are skipped. The pair list can be split
//! across worker threads; results are deterministic regardless of
//! worker count.

use std::sync::mpsc;
use std::thread;

use tracing::debug;

use crate::arena::Arena;
use crate::planning::candidates::CandidateSet;
use crate::planning::route::{LegPlan, LegPlanner, LegPlannerConfig};
use crate::planning::GridPose;

/// One node of the leg matrix: the start pose or a candidate pose.
#[derive(Debug, Clone, Copy)]
pub struct MatrixNode {
    /// Owning obstacle id; `None` for the start pose
    pub obstacle_id: Option<u32>,
    pub pose: GridPose,
}

/// Leg plans between every usable ordered pose pair.
#[derive(Debug)]
pub struct LegMatrix {
    nodes: Vec<MatrixNode>,
    /// Row-major `n * n`; `None` where no leg was planned or none is
    /// feasible
    legs: Vec<Option<LegPlan>>,
}

impl LegMatrix {
    /// Plan all legs. Node 0 is the start pose; candidate nodes follow
    /// in obstacle input order.
    pub fn build(
        arena: &Arena,
        leg_config: LegPlannerConfig,
        start: GridPose,
        candidates: &CandidateSet,
        workers: usize,
    ) -> Self {
        let mut nodes = vec![MatrixNode {
            obstacle_id: None,
            pose: start,
        }];
        for group in &candidates.per_obstacle {
            for &pose in &group.poses {
                nodes.push(MatrixNode {
                    obstacle_id: Some(group.obstacle_id),
                    pose,
                });
            }
        }

        let n = nodes.len();
        let mut pairs = Vec::new();
        for from in 0..n {
            for to in 1..n {
                if from == to {
                    continue;
                }
                if nodes[from].obstacle_id == nodes[to].obstacle_id
                    && nodes[from].obstacle_id.is_some()
                {
                    continue;
                }
                pairs.push((from, to));
            }
        }

        debug!("planning {} legs over {} poses", pairs.len(), n);

        let mut legs: Vec<Option<LegPlan>> = vec![None; n * n];
        if workers > 1 && pairs.len() > workers {
            let chunk_size = pairs.len().div_ceil(workers);
            let (tx, rx) = mpsc::channel();

            thread::scope(|scope| {
                for chunk in pairs.chunks(chunk_size) {
                    let tx = tx.clone();
                    let nodes = &nodes;
                    scope.spawn(move || {
                        let planner = LegPlanner::new(arena, leg_config);
                        for &(from, to) in chunk {
                            let leg = planner.plan(nodes[from].pose, nodes[to].pose);
                            if tx.send((from, to, leg)).is_err() {
                                break;
                            }
                        }
                    });
                }
                drop(tx);

                for (from, to, leg) in rx {
                    legs[from * n + to] = leg;
                }
            });
        } else {
            let planner = LegPlanner::new(arena, leg_config);
            for (from, to) in pairs {
                legs[from * n + to] = planner.plan(nodes[from].pose, nodes[to].pose);
            }
        }

        Self { nodes, legs }
    }

    /// All matrix nodes; index 0 is the start pose.
    #[inline]
    pub fn nodes(&self) -> &[MatrixNode] {
        &self.nodes
    }

    /// Planned leg between two nodes, if one exists.
    #[inline]
    pub fn leg(&self, from: usize, to: usize) -> Option<&LegPlan> {
        self.legs[from * self.nodes.len() + to].as_ref()
    }

    /// Cost of the leg between two nodes, if one exists.
    #[inline]
    pub fn cost(&self, from: usize, to: usize) -> Option<f32> {
        self.leg(from, to).map(|leg| leg.cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Obstacle;
    use crate::core::Direction;
    use crate::planning::candidates::generate_candidates;

    fn build_matrix(workers: usize) -> LegMatrix {
        let arena = Arena::new(
            200.0,
            10.0,
            10.0,
            10.0,
            vec![
                Obstacle::new(1, 10, 10, Direction::North),
                Obstacle::new(2, 4, 8, Direction::West),
            ],
        )
        .unwrap();
        let candidates = generate_candidates(&arena, 3, 1);
        let config = LegPlannerConfig {
            turn_radius_cells: 2,
            arc_cost_weight: 1.2,
            max_iterations: 20_000,
        };
        LegMatrix::build(
            &arena,
            config,
            GridPose::new(1, 1, Direction::North),
            &candidates,
            workers,
        )
    }

    #[test]
    fn test_start_is_node_zero() {
        let matrix = build_matrix(1);
        assert!(matrix.nodes()[0].obstacle_id.is_none());
        assert!(matrix.nodes().len() > 1);
    }

    #[test]
    fn test_no_legs_back_to_start_or_within_obstacle() {
        let matrix = build_matrix(1);
        let nodes = matrix.nodes();
        for from in 0..nodes.len() {
            assert!(matrix.leg(from, 0).is_none());
            for to in 0..nodes.len() {
                if from != to
                    && nodes[from].obstacle_id.is_some()
                    && nodes[from].obstacle_id == nodes[to].obstacle_id
                {
                    assert!(matrix.leg(from, to).is_none());
                }
            }
        }
    }

    #[test]
    fn test_parallel_build_matches_serial() {
        let serial = build_matrix(1);
        let parallel = build_matrix(4);
        assert_eq!(serial.nodes().len(), parallel.nodes().len());
        for from in 0..serial.nodes().len() {
            for to in 0..serial.nodes().len() {
                match (serial.leg(from, to), parallel.leg(from, to)) {
                    (Some(a), Some(b)) => {
                        assert!((a.cost - b.cost).abs() < 1e-4);
                        assert_eq!(a.moves.len(), b.moves.len());
                    }
                    (None, None) => {}
                    _ => panic!("matrix mismatch at ({}, {})", from, to),
                }
            }
        }
    }

    #[test]
    fn test_legs_from_start_exist() {
        let matrix = build_matrix(1);
        let reachable = (1..matrix.nodes().len())
            .filter(|&to| matrix.cost(0, to).is_some())
            .count();
        assert!(reachable > 0);
    }
}
