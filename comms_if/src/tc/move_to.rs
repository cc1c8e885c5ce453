//! # Move-to goal telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::msg::{Pose, Twist};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Identifier assigned to each goal when it is submitted.
pub type GoalId = u64;

/// A request to move the vehicle to a target pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveToGoal {
    /// The target pose in the fixed frame.
    pub pose: Pose,

    /// Target twist in the body frame. A non-zero twist makes the goal a moving target.
    #[serde(default)]
    pub twist: Twist,

    /// Maximum translational approach speed. Zero means the speed is only bounded by the
    /// vehicle's limits.
    #[serde(default)]
    pub speed_ms: f64,

    /// If true translation and rotation are profiled independently rather than arriving
    /// together.
    #[serde(default)]
    pub uncoordinated: bool,

    /// Position tolerance for success, the configured default is used if not given.
    #[serde(default)]
    pub linear_tolerance_m: Option<f64>,

    /// Attitude tolerance for success, the configured default is used if not given.
    #[serde(default)]
    pub angular_tolerance_rad: Option<f64>,
}

/// The result of a goal, reported once per goal.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalResult {
    pub id: GoalId,
    pub outcome: GoalOutcome,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// How a goal finished.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalOutcome {
    /// The vehicle reached the goal within tolerance and came to rest.
    Succeeded,

    /// The goal was cancelled, either explicitly or by a newer goal.
    Cancelled,

    /// The goal was never tracked, either the validity gate refused it or there was no
    /// trajectory to track it with.
    Rejected,

    /// Tracking stopped without reaching the goal, because motion was killed or disabled or the
    /// trajectory ran into an occupied region.
    Aborted,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GoalResult {
    pub fn new(id: GoalId, outcome: GoalOutcome) -> Self {
        Self { id, outcome }
    }
}
