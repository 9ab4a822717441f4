//! YatraNav - Scan-tour planner for a wheeled robot
//!
//! Plans a drivable tour over a bounded arena populated with oriented
//! obstacles. Each obstacle must be scanned from the side it faces at
//! a fixed standoff distance; the planner picks a stopping pose per
//! obstacle, orders the visits, and emits the discrete motion
//! primitives that drive the tour.
//!
//! # Architecture
//!
//! The crate is organized into layers, bottom up:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     api                             │  ← Request boundary
//! │        (AlgoInput → actions + status)               │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    motion/                          │  ← Primitives
//! │      (actions, leg conversion, replay check)        │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   planning/                         │  ← Search
//! │  (candidates, feasibility, legs, cost matrix, tour) │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    arena/                           │  ← Spatial model
//! │           (obstacles, bounds, inflation)            │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │              (math, poses, directions)              │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Planning pipeline
//!
//! 1. Build the [`arena::Arena`] from the request's obstacle set
//! 2. Generate candidate scan poses per obstacle
//! 3. Plan every pose-to-pose leg on the motion lattice
//! 4. Search the visit order (best-first, greedy, or layered)
//! 5. Convert the winning legs into [`motion::RobotAction`]s and
//!    verify them by kinematic replay
//!
//! Every run is stateless: the arena and all search state live for
//! one request, so concurrent requests are fully independent.

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Spatial model (depends on core)
// ============================================================================
pub mod arena;

// ============================================================================
// Layer 3: Planning (depends on core, arena)
// ============================================================================
pub mod planning;

// ============================================================================
// Layer 4: Motion primitives (depends on core, planning)
// ============================================================================
pub mod motion;

// ============================================================================
// Layer 5: Request boundary (depends on all layers)
// ============================================================================
pub mod api;

pub mod config;
pub mod error;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

pub use crate::core::{Direction, Point2D, Pose2D, TurnDirection};

pub use api::{
    plan, AlgoInput, InitialPosition, Mode, ObstacleInput, PlanOutcome, PlanResponse, PlanStatus,
};
pub use arena::{Arena, CellState, Obstacle};
pub use config::PlannerConfig;
pub use error::{PlanError, Result};
pub use motion::RobotAction;
pub use planning::AlgoType;
