//! Obstacle model.

use serde::{Deserialize, Serialize};

use crate::core::{Direction, Point2D};

/// Half extent of an obstacle block in centimeters.
///
/// Obstacles are 10 cm cubes regardless of the grid resolution the
/// request uses.
pub const OBSTACLE_HALF_CM: f32 = 5.0;

/// An oriented obstacle on the arena grid.
///
/// The obstacle occupies one grid cell and must be scanned from the
/// side it faces. Immutable for the duration of a planning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Unique obstacle id
    pub id: u32,
    /// Grid cell X coordinate
    pub x: i32,
    /// Grid cell Y coordinate
    pub y: i32,
    /// Side the obstacle faces; scans happen from this side
    pub facing: Direction,
}

impl Obstacle {
    /// Create a new obstacle.
    pub fn new(id: u32, x: i32, y: i32, facing: Direction) -> Self {
        Self { id, x, y, facing }
    }

    /// Obstacle center in centimeters for a given cell size.
    #[inline]
    pub fn center_cm(&self, cell_cm: f32) -> Point2D {
        Point2D::new(self.x as f32 * cell_cm, self.y as f32 * cell_cm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_scales_with_cell_size() {
        let ob = Obstacle::new(1, 15, 10, Direction::West);
        let live = ob.center_cm(10.0);
        assert_eq!((live.x, live.y), (150.0, 100.0));
        let sim = ob.center_cm(5.0);
        assert_eq!((sim.x, sim.y), (75.0, 50.0));
    }
}
