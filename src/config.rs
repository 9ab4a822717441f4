//! Configuration loading for YatraNav

use crate::error::{PlanError, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub arena: ArenaConfig,
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Arena dimensions
#[derive(Clone, Debug, Deserialize)]
pub struct ArenaConfig {
    /// Side length of the square arena in centimeters (default: 200)
    #[serde(default = "default_arena_size")]
    pub size_cm: f32,
}

/// Robot physical parameters
#[derive(Clone, Debug, Deserialize)]
pub struct RobotConfig {
    /// Half of the robot's footprint width in centimeters (default: 10)
    #[serde(default = "default_half_width")]
    pub half_width_cm: f32,

    /// Extra clearance kept from obstacles in centimeters (default: 10)
    #[serde(default = "default_clearance")]
    pub clearance_cm: f32,

    /// Minimum turning radius in centimeters (default: 20)
    ///
    /// Must be a whole number of grid cells in the selected mode.
    #[serde(default = "default_turn_radius")]
    pub turn_radius_cm: f32,
}

/// Scan pose generation
#[derive(Clone, Debug, Deserialize)]
pub struct ScanConfig {
    /// Distance from the obstacle at which a scan is valid, in
    /// centimeters (default: 30)
    ///
    /// Must be a whole number of grid cells in the selected mode.
    #[serde(default = "default_standoff")]
    pub standoff_cm: f32,

    /// Lateral candidate offsets, in cells to each side (default: 1)
    #[serde(default = "default_lateral_offset")]
    pub lateral_offset_cells: i32,
}

/// Search budgets and weights
#[derive(Clone, Debug, Deserialize)]
pub struct SearchConfig {
    /// Cost multiplier for arc moves relative to their length
    /// (default: 1.2, must be >= 1)
    #[serde(default = "default_arc_cost_weight")]
    pub arc_cost_weight: f32,

    /// Iteration budget for a single pose-to-pose leg search
    /// (default: 20000)
    #[serde(default = "default_max_leg_iterations")]
    pub max_leg_iterations: usize,

    /// Node expansion budget for the visit-order search
    /// (default: 100000)
    #[serde(default = "default_max_search_expansions")]
    pub max_search_expansions: usize,

    /// Worker threads for the leg-cost matrix; 0 or 1 runs serially
    /// (default: 4)
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Default start pose in grid units, facing North.
pub const DEFAULT_START_CELL: (i32, i32) = (1, 1);

// Default value functions
fn default_arena_size() -> f32 {
    200.0
}
fn default_half_width() -> f32 {
    10.0
}
fn default_clearance() -> f32 {
    10.0
}
fn default_turn_radius() -> f32 {
    20.0
}
fn default_standoff() -> f32 {
    30.0
}
fn default_lateral_offset() -> i32 {
    1
}
fn default_arc_cost_weight() -> f32 {
    1.2
}
fn default_max_leg_iterations() -> usize {
    20_000
}
fn default_max_search_expansions() -> usize {
    100_000
}
fn default_workers() -> usize {
    4
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            size_cm: default_arena_size(),
        }
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            half_width_cm: default_half_width(),
            clearance_cm: default_clearance(),
            turn_radius_cm: default_turn_radius(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            standoff_cm: default_standoff(),
            lateral_offset_cells: default_lateral_offset(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            arc_cost_weight: default_arc_cost_weight(),
            max_leg_iterations: default_max_leg_iterations(),
            max_search_expansions: default_max_search_expansions(),
            workers: default_workers(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            robot: RobotConfig::default(),
            scan: ScanConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PlanError::Config(format!("Failed to read config file: {}", e)))?;
        let config: PlannerConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that do not depend on the grid resolution.
    ///
    /// Cell-alignment of the turn radius and standoff depends on the
    /// request mode and is checked when the arena is built.
    pub fn validate(&self) -> Result<()> {
        if self.arena.size_cm <= 0.0 {
            return Err(PlanError::Config("arena size must be positive".into()));
        }
        if self.robot.half_width_cm <= 0.0 || self.robot.turn_radius_cm <= 0.0 {
            return Err(PlanError::Config(
                "robot dimensions must be positive".into(),
            ));
        }
        if self.robot.clearance_cm < 0.0 {
            return Err(PlanError::Config("clearance must not be negative".into()));
        }
        if self.scan.standoff_cm <= 0.0 {
            return Err(PlanError::Config("scan standoff must be positive".into()));
        }
        if self.scan.lateral_offset_cells < 0 {
            return Err(PlanError::Config(
                "lateral offset must not be negative".into(),
            ));
        }
        if self.search.arc_cost_weight < 1.0 {
            return Err(PlanError::Config(
                "arc cost weight must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
