//! Pose and swept-motion validity predicates.
//!
//! Pure functions over the arena used by candidate generation and the
//! leg planner. A motion is valid when every sampled point of the
//! robot center's path is inside the wall margins and outside every
//! inflated obstacle footprint.

use crate::arena::Arena;
use crate::core::Point2D;

/// Sampling step along swept paths, in centimeters.
const SAMPLE_STEP_CM: f32 = 2.5;

/// Whether the robot center may rest at `point`.
#[inline]
pub fn pose_is_valid(arena: &Arena, point: Point2D) -> bool {
    arena.in_bounds(point) && !arena.point_blocked(point)
}

/// Whether a straight run between two points stays valid.
///
/// Samples the segment every [`SAMPLE_STEP_CM`], endpoints included.
pub fn straight_is_valid(arena: &Arena, from: Point2D, to: Point2D) -> bool {
    let length = from.distance(&to);
    let steps = (length / SAMPLE_STEP_CM).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let p = Point2D::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
        if !pose_is_valid(arena, p) {
            return false;
        }
    }
    true
}

/// Whether an arc stays valid.
///
/// The arc is centered at `center` with the given radius, starting at
/// `start_angle` (radians, measured from the center) and sweeping by
/// `sweep` (signed). Sampled every [`SAMPLE_STEP_CM`] of arc length,
/// endpoints included.
pub fn arc_is_valid(
    arena: &Arena,
    center: Point2D,
    radius: f32,
    start_angle: f32,
    sweep: f32,
) -> bool {
    let length = radius * sweep.abs();
    let steps = (length / SAMPLE_STEP_CM).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let angle = start_angle + sweep * t;
        let p = Point2D::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        );
        if !pose_is_valid(arena, p) {
            return false;
        }
    }
    true
}
