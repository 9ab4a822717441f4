//! Visit-order search over candidate scan poses.
//!
//! A search node is (set of obstacles visited, current pose); edges
//! are the leg-matrix costs. Three strategies are supported:
//!
//! - [`AlgoType::ExhaustiveAstar`]: best-first on accumulated cost
//!   plus an admissible Euclidean bound; optimal when it completes,
//!   expansion-budget-bounded otherwise
//! - [`AlgoType::Euclidean`]: greedy nearest-candidate selection,
//!   fast but approximate
//! - [`AlgoType::Bfs`]: layered expansion by visited count, the
//!   baseline strategy
//!
//! Equal-cost choices always prefer the lower obstacle id so results
//! are deterministic.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::planning::matrix::LegMatrix;

/// Search strategy for the visit-order engine.
///
/// Wire names match the upstream controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AlgoType {
    #[default]
    #[serde(rename = "Exhaustive Astar")]
    ExhaustiveAstar,
    #[serde(rename = "Euclidean")]
    Euclidean,
    #[serde(rename = "Breadth First Search")]
    Bfs,
}

/// Result of the visit-order search.
#[derive(Debug, Clone)]
pub struct Tour {
    /// Matrix node index per visited obstacle, in visit order
    pub nodes: Vec<usize>,
    /// Obstacle ids in visit order
    pub visited: Vec<u32>,
    /// Obstacle ids that had candidates but could not be toured
    pub unreachable: Vec<u32>,
    /// Sum of leg costs
    pub cost: f32,
    /// Whether the expansion budget cut the search short
    pub truncated: bool,
}

/// One obstacle eligible for the tour: its bit in the visited mask
/// and its candidate node indices.
struct Group {
    id: u32,
    bit: u64,
    nodes: Vec<usize>,
}

/// Search the visit order.
pub fn search_tour(
    matrix: &LegMatrix,
    cell_cm: f32,
    algo: AlgoType,
    max_expansions: usize,
) -> Tour {
    let groups = collect_groups(matrix);
    let full_mask = groups.iter().fold(0u64, |m, g| m | g.bit);

    match algo {
        AlgoType::ExhaustiveAstar => {
            astar_tour(matrix, cell_cm, &groups, full_mask, max_expansions)
        }
        AlgoType::Euclidean => greedy_tour(matrix, cell_cm, &groups),
        AlgoType::Bfs => bfs_tour(matrix, &groups, full_mask, max_expansions),
    }
}

/// Group candidate nodes by obstacle, bits assigned in ascending id
/// order.
fn collect_groups(matrix: &LegMatrix) -> Vec<Group> {
    let mut ids: Vec<u32> = matrix
        .nodes()
        .iter()
        .filter_map(|node| node.obstacle_id)
        .collect();
    ids.sort_unstable();
    ids.dedup();

    ids.into_iter()
        .enumerate()
        .map(|(i, id)| Group {
            id,
            bit: 1u64 << i,
            nodes: matrix
                .nodes()
                .iter()
                .enumerate()
                .filter(|(_, node)| node.obstacle_id == Some(id))
                .map(|(idx, _)| idx)
                .collect(),
        })
        .collect()
}

/// Euclidean distance between two matrix nodes in centimeters.
#[inline]
fn euclid(matrix: &LegMatrix, from: usize, to: usize, cell_cm: f32) -> f32 {
    let a = matrix.nodes()[from].pose.point(cell_cm);
    let b = matrix.nodes()[to].pose.point(cell_cm);
    a.distance(&b)
}

/// Admissible lower bound on the remaining tour: distance to the
/// nearest unvisited candidate. Every leg cost is at least its
/// Euclidean displacement.
fn remaining_bound(matrix: &LegMatrix, groups: &[Group], mask: u64, at: usize, cell_cm: f32) -> f32 {
    groups
        .iter()
        .filter(|g| mask & g.bit == 0)
        .flat_map(|g| g.nodes.iter().map(|&j| euclid(matrix, at, j, cell_cm)))
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .unwrap_or(0.0)
}

/// Frontier entry for the best-first strategy.
#[derive(Debug, Clone)]
struct TourNode {
    f_score: f32,
    g_score: f32,
    /// Obstacle id added by the edge into this node (0 for the root)
    tie_id: u32,
    at: usize,
    mask: u64,
}

impl PartialEq for TourNode {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.mask == other.mask
    }
}

impl Eq for TourNode {}

impl Ord for TourNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; equal costs prefer the lower
        // obstacle id, then the lower node index
        other
            .f_score
            .partial_cmp(&self.f_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.tie_id.cmp(&self.tie_id))
            .then_with(|| other.at.cmp(&self.at))
    }
}

impl PartialOrd for TourNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn astar_tour(
    matrix: &LegMatrix,
    cell_cm: f32,
    groups: &[Group],
    full_mask: u64,
    max_expansions: usize,
) -> Tour {
    let mut open_set = BinaryHeap::new();
    let mut best_g: HashMap<(u64, usize), f32> = HashMap::new();
    let mut parent: HashMap<(u64, usize), (u64, usize)> = HashMap::new();

    best_g.insert((0, 0), 0.0);
    open_set.push(TourNode {
        f_score: remaining_bound(matrix, groups, 0, 0, cell_cm),
        g_score: 0.0,
        tie_id: 0,
        at: 0,
        mask: 0,
    });

    let mut expansions = 0usize;
    let mut truncated = false;
    // Best partial tour seen so far: most obstacles, then lowest cost
    let mut best_partial: (u32, f32, u64, usize) = (0, 0.0, 0, 0);

    while let Some(node) = open_set.pop() {
        let key = (node.mask, node.at);
        if node.g_score > best_g.get(&key).copied().unwrap_or(f32::MAX) {
            continue;
        }

        let visited_count = node.mask.count_ones();
        if visited_count > best_partial.0
            || (visited_count == best_partial.0 && node.g_score < best_partial.1)
        {
            best_partial = (visited_count, node.g_score, node.mask, node.at);
        }

        if node.mask == full_mask {
            return build_tour(
                matrix,
                groups,
                &parent,
                node.mask,
                node.at,
                node.g_score,
                false,
            );
        }

        expansions += 1;
        if expansions > max_expansions {
            warn!("visit-order search exceeded expansion budget, returning best found");
            truncated = true;
            break;
        }

        expand(matrix, groups, node.mask, node.at, |id, j, leg_cost| {
            let child_mask = node.mask | group_bit(groups, id);
            let child_g = node.g_score + leg_cost;
            let child_key = (child_mask, j);
            if child_g < best_g.get(&child_key).copied().unwrap_or(f32::MAX) {
                best_g.insert(child_key, child_g);
                parent.insert(child_key, key);
                open_set.push(TourNode {
                    f_score: child_g + remaining_bound(matrix, groups, child_mask, j, cell_cm),
                    g_score: child_g,
                    tie_id: id,
                    at: j,
                    mask: child_mask,
                });
            }
        });
    }

    let (_, cost, mask, at) = best_partial;
    build_tour(matrix, groups, &parent, mask, at, cost, truncated)
}

fn greedy_tour(matrix: &LegMatrix, cell_cm: f32, groups: &[Group]) -> Tour {
    let mut mask = 0u64;
    let mut at = 0usize;
    let mut cost = 0.0f32;
    let mut nodes = Vec::new();

    loop {
        let mut options: Vec<(f32, u32, usize)> = groups
            .iter()
            .filter(|g| mask & g.bit == 0)
            .flat_map(|g| {
                g.nodes
                    .iter()
                    .map(|&j| (euclid(matrix, at, j, cell_cm), g.id, j))
            })
            .collect();
        if options.is_empty() {
            break;
        }
        options.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
                .then_with(|| a.2.cmp(&b.2))
        });

        let mut advanced = false;
        for (_, id, j) in options {
            if let Some(leg_cost) = matrix.cost(at, j) {
                mask |= group_bit(groups, id);
                cost += leg_cost;
                at = j;
                nodes.push(j);
                advanced = true;
                break;
            }
        }
        if !advanced {
            // Nothing left is reachable from here; greedy does not
            // backtrack
            break;
        }
    }

    finish_tour(matrix, groups, nodes, mask, cost, false)
}

fn bfs_tour(matrix: &LegMatrix, groups: &[Group], full_mask: u64, max_expansions: usize) -> Tour {
    let mut layer: HashMap<(u64, usize), f32> = HashMap::new();
    let mut parent: HashMap<(u64, usize), (u64, usize)> = HashMap::new();
    layer.insert((0, 0), 0.0);

    let mut expansions = 0usize;
    let mut truncated = false;
    let mut best_partial: (u32, f32, u64, usize) = (0, 0.0, 0, 0);

    for _ in 0..groups.len() {
        let mut entries: Vec<((u64, usize), f32)> = layer.drain().collect();
        entries.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| node_id(matrix, a.0 .1).cmp(&node_id(matrix, b.0 .1)))
                .then_with(|| a.0 .1.cmp(&b.0 .1))
        });

        let mut next: HashMap<(u64, usize), f32> = HashMap::new();
        for ((mask, at), g) in entries {
            let visited_count = mask.count_ones();
            if visited_count > best_partial.0
                || (visited_count == best_partial.0 && g < best_partial.1)
            {
                best_partial = (visited_count, g, mask, at);
            }

            expansions += 1;
            if expansions > max_expansions {
                warn!("layered search exceeded expansion budget, returning best found");
                truncated = true;
                break;
            }

            expand(matrix, groups, mask, at, |id, j, leg_cost| {
                let child_mask = mask | group_bit(groups, id);
                let child_key = (child_mask, j);
                let child_g = g + leg_cost;
                if child_g < next.get(&child_key).copied().unwrap_or(f32::MAX) {
                    next.insert(child_key, child_g);
                    parent.insert(child_key, (mask, at));
                }
            });
        }

        layer = next;
        if truncated || layer.is_empty() {
            break;
        }
    }

    // Lowest-cost terminal in the final layer, if the search got there
    let mut terminal: Option<((u64, usize), f32)> = None;
    for (&(mask, at), &g) in &layer {
        if mask != full_mask {
            continue;
        }
        let better = match terminal {
            None => true,
            Some((t_key, t_g)) => {
                g < t_g || (g == t_g && node_id(matrix, at) < node_id(matrix, t_key.1))
            }
        };
        if better {
            terminal = Some(((mask, at), g));
        }
    }

    match terminal {
        Some(((mask, at), g)) => build_tour(matrix, groups, &parent, mask, at, g, truncated),
        None => {
            let (_, cost, mask, at) = best_partial;
            build_tour(matrix, groups, &parent, mask, at, cost, truncated)
        }
    }
}

/// Obstacle id of a matrix node (0 for the start node).
#[inline]
fn node_id(matrix: &LegMatrix, node: usize) -> u32 {
    matrix.nodes()[node].obstacle_id.unwrap_or(0)
}

#[inline]
fn group_bit(groups: &[Group], id: u32) -> u64 {
    groups
        .iter()
        .find(|g| g.id == id)
        .map(|g| g.bit)
        .unwrap_or(0)
}

/// Invoke `visit(id, node, leg_cost)` for every feasible edge out of
/// a search state, in ascending obstacle-id order.
fn expand<F: FnMut(u32, usize, f32)>(
    matrix: &LegMatrix,
    groups: &[Group],
    mask: u64,
    at: usize,
    mut visit: F,
) {
    for group in groups.iter().filter(|g| mask & g.bit == 0) {
        for &j in &group.nodes {
            if let Some(leg_cost) = matrix.cost(at, j) {
                visit(group.id, j, leg_cost);
            }
        }
    }
}

/// Walk the parent map back to the root and assemble the tour.
fn build_tour(
    matrix: &LegMatrix,
    groups: &[Group],
    parent: &HashMap<(u64, usize), (u64, usize)>,
    mask: u64,
    at: usize,
    cost: f32,
    truncated: bool,
) -> Tour {
    let mut nodes = Vec::new();
    let mut key = (mask, at);
    while key != (0, 0) {
        nodes.push(key.1);
        match parent.get(&key) {
            Some(&prev) => key = prev,
            None => break,
        }
    }
    nodes.reverse();
    finish_tour(matrix, groups, nodes, mask, cost, truncated)
}

fn finish_tour(
    matrix: &LegMatrix,
    groups: &[Group],
    nodes: Vec<usize>,
    mask: u64,
    cost: f32,
    truncated: bool,
) -> Tour {
    let visited = nodes.iter().map(|&j| node_id(matrix, j)).collect();
    let unreachable = groups
        .iter()
        .filter(|g| mask & g.bit == 0)
        .map(|g| g.id)
        .collect();

    debug!(
        "tour: {} visited, {} unreachable, cost {:.1}",
        nodes.len(),
        groups.len() - nodes.len(),
        cost
    );

    Tour {
        nodes,
        visited,
        unreachable,
        cost,
        truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Arena, Obstacle};
    use crate::core::Direction;
    use crate::planning::candidates::generate_candidates;
    use crate::planning::route::LegPlannerConfig;
    use crate::planning::GridPose;

    fn leg_config() -> LegPlannerConfig {
        LegPlannerConfig {
            turn_radius_cells: 2,
            arc_cost_weight: 1.2,
            max_iterations: 20_000,
        }
    }

    fn matrix_for(obstacles: Vec<Obstacle>) -> (Arena, LegMatrix) {
        let arena = Arena::new(200.0, 10.0, 10.0, 10.0, obstacles).unwrap();
        let candidates = generate_candidates(&arena, 3, 1);
        let matrix = LegMatrix::build(
            &arena,
            leg_config(),
            GridPose::new(1, 1, Direction::North),
            &candidates,
            1,
        );
        (arena, matrix)
    }

    fn two_obstacle_matrix() -> (Arena, LegMatrix) {
        matrix_for(vec![
            Obstacle::new(1, 4, 8, Direction::North),
            Obstacle::new(2, 15, 15, Direction::South),
        ])
    }

    #[test]
    fn test_astar_visits_all() {
        let (_, matrix) = two_obstacle_matrix();
        let tour = search_tour(&matrix, 10.0, AlgoType::ExhaustiveAstar, 100_000);
        assert_eq!(tour.visited.len(), 2);
        assert!(tour.unreachable.is_empty());
        assert!(!tour.truncated);
        assert!(tour.cost > 0.0);
    }

    #[test]
    fn test_astar_orders_near_first() {
        // Obstacle 1 sits close to the start, obstacle 2 far away; the
        // optimal tour visits 1 before 2
        let (_, matrix) = two_obstacle_matrix();
        let tour = search_tour(&matrix, 10.0, AlgoType::ExhaustiveAstar, 100_000);
        assert_eq!(tour.visited, vec![1, 2]);
    }

    #[test]
    fn test_each_obstacle_visited_once() {
        let (_, matrix) = matrix_for(vec![
            Obstacle::new(1, 4, 8, Direction::North),
            Obstacle::new(2, 15, 15, Direction::South),
            Obstacle::new(3, 15, 4, Direction::West),
        ]);
        for algo in [AlgoType::ExhaustiveAstar, AlgoType::Euclidean, AlgoType::Bfs] {
            let tour = search_tour(&matrix, 10.0, algo, 100_000);
            let mut ids = tour.visited.clone();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), tour.visited.len(), "{:?} repeated a visit", algo);
        }
    }

    #[test]
    fn test_astar_dominates_greedy_and_bfs() {
        let (_, matrix) = matrix_for(vec![
            Obstacle::new(1, 4, 8, Direction::North),
            Obstacle::new(2, 15, 15, Direction::South),
            Obstacle::new(3, 15, 4, Direction::West),
        ]);
        let astar = search_tour(&matrix, 10.0, AlgoType::ExhaustiveAstar, 100_000);
        let greedy = search_tour(&matrix, 10.0, AlgoType::Euclidean, 100_000);
        let bfs = search_tour(&matrix, 10.0, AlgoType::Bfs, 100_000);

        assert_eq!(astar.visited.len(), 3);
        assert_eq!(greedy.visited.len(), 3);
        assert_eq!(bfs.visited.len(), 3);
        assert!(astar.cost <= greedy.cost + 1e-3);
        assert!(astar.cost <= bfs.cost + 1e-3);
        // Layered search keeps every (set, pose) state, so it finds the
        // same optimum
        assert!((astar.cost - bfs.cost).abs() < 1e-2);
    }

    #[test]
    fn test_truncated_astar_returns_partial() {
        let (_, matrix) = matrix_for(vec![
            Obstacle::new(1, 4, 8, Direction::North),
            Obstacle::new(2, 15, 15, Direction::South),
            Obstacle::new(3, 15, 4, Direction::West),
        ]);
        let tour = search_tour(&matrix, 10.0, AlgoType::ExhaustiveAstar, 1);
        assert!(tour.truncated);
        assert!(tour.visited.len() < 3);
    }

    #[test]
    fn test_empty_candidate_set_gives_empty_tour() {
        // The only obstacle faces the wall, so it has no candidates
        let arena = Arena::new(
            200.0,
            10.0,
            10.0,
            10.0,
            vec![Obstacle::new(7, 10, 19, Direction::North)],
        )
        .unwrap();
        let candidates = generate_candidates(&arena, 3, 1);
        let matrix = LegMatrix::build(
            &arena,
            leg_config(),
            GridPose::new(1, 1, Direction::North),
            &candidates,
            1,
        );
        let tour = search_tour(&matrix, 10.0, AlgoType::ExhaustiveAstar, 100_000);
        assert!(tour.visited.is_empty());
        assert!(tour.unreachable.is_empty());
        assert_eq!(tour.cost, 0.0);
    }
}
