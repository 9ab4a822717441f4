//! Motion layer: discrete actions, leg-to-action conversion and
//! replay verification.
//!
//! - [`RobotAction`]: the robot's primitive vocabulary
//! - [`convert_legs`]: planned legs → action list with scans
//! - [`replay`]: forward-kinematic check of an emitted plan

pub mod action;
pub mod converter;
pub mod simulate;

pub use action::RobotAction;
pub use converter::{convert_legs, ConvertedPlan};
pub use simulate::{replay, HEADING_TOLERANCE_RAD, POSITION_TOLERANCE_CM};
