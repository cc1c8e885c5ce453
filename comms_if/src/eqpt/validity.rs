//! # Waypoint validity interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use thiserror::Error;

use crate::msg::Pose;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Reasons a pose may not be valid to command.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum WaypointError {
    /// The pose lies in a region nothing is known about.
    #[error("Pose is in an unknown region")]
    Unknown,

    /// The pose lies in a region known to be occupied.
    #[error("Pose is in an occupied region")]
    Occupied,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Checks whether a pose in the fixed frame is safe to command.
pub trait WaypointValidity: Send {
    fn check(&self, pose: &Pose) -> Result<(), WaypointError>;
}

impl<F> WaypointValidity for F
where
    F: Fn(&Pose) -> Result<(), WaypointError> + Send,
{
    fn check(&self, pose: &Pose) -> Result<(), WaypointError> {
        self(pose)
    }
}
