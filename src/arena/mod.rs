//! Arena layer: grid bounds, obstacles and collision queries.
//!
//! - [`Obstacle`]: oriented obstacle on a grid cell
//! - [`Arena`]: request-scoped spatial model with inflated footprints

mod map;
mod obstacle;

pub use map::{Arena, CellState, MAX_OBSTACLES};
pub use obstacle::{Obstacle, OBSTACLE_HALF_CM};
