//! Trajectory generator module
//!
//! Runs the goal lifecycle once per control cycle, advancing the C3 trajectory in fixed sub-steps
//! up to the current time.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod events;
mod params;
mod state;

#[cfg(test)]
mod test;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use events::*;
pub use params::*;
pub use state::*;

use crate::c3::LimitsError;
use comms_if::eqpt::kill::KillMonitorError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during TrajGen operation.
#[derive(Debug, thiserror::Error)]
pub enum TrajGenError {
    #[error("Parameter {0} has an invalid value: {1}")]
    InvalidParam(&'static str, f64),

    #[error("Parameter {0} must name a frame")]
    MissingFrame(&'static str),

    #[error("Invalid limits: {0}")]
    InvalidLimits(LimitsError),

    #[error("Could not connect to the kill monitor: {0}")]
    KillMonitor(KillMonitorError),

    #[error("Cycle time {0} s is not finite or is before the previous cycle")]
    InvalidTime(f64),
}
