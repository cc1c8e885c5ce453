//! # C3 trajectory module
//!
//! The C3 trajectory is a reference point which chases a waypoint while never exceeding the
//! vehicle's velocity and acceleration limits, expressed in the body frame. Rather than clamping
//! and integrating, translation follows a discrete braking profile along the straight line to the
//! waypoint and each angular axis follows its own, so that a stationary waypoint is always
//! reached at rest without overshoot.
//!
//! The trajectory is advanced in fixed steps by the goal manager, see `crate::goal_mgr`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod frames;
mod limits;
mod point;
pub mod profile;
mod trajectory;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use frames::{point_from_pose_twist, pose_from_q, pose_twist_from_point, BodyFrame};
pub use limits::*;
pub use point::*;
pub use trajectory::*;
