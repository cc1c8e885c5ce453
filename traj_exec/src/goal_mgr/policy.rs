//! # Goal admission policy
//!
//! Decides what to do with a goal the validity gate has objected to.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::validity::WaypointError;

use crate::c3::Point;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Largest horizontal move, along either axis, allowed into an unknown region.
pub const UNKNOWN_REGION_MAX_DISPLACEMENT_M: f64 = 0.5;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The gate had no objection
    Accept,

    /// The goal is in an unknown region but close enough to the last commanded point to be
    /// worth the risk
    AcceptUnknown,

    Reject(WaypointError),
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Decide whether to accept a proposed goal given the gate's verdict on it and the previously
/// commanded point.
pub fn admit(check: Result<(), WaypointError>, previous: &Point, proposed: &Point) -> Admission {
    match check {
        Ok(()) => Admission::Accept,
        Err(WaypointError::Occupied) => Admission::Reject(WaypointError::Occupied),
        Err(WaypointError::Unknown) => {
            let dx = (proposed.q[0] - previous.q[0]).abs();
            let dy = (proposed.q[1] - previous.q[1]).abs();

            if dx > UNKNOWN_REGION_MAX_DISPLACEMENT_M || dy > UNKNOWN_REGION_MAX_DISPLACEMENT_M {
                Admission::Reject(WaypointError::Unknown)
            }
            else {
                Admission::AcceptUnknown
            }
        }
    }
}
