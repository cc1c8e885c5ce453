//! Parameters structure for the trajectory generator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::c3::LimitsParams;
use super::TrajGenError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the trajectory generator, loaded from `traj_gen.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Frame the trajectory pose is expressed in
    pub fixed_frame: String,

    /// Frame attached to the vehicle
    pub body_frame: String,

    /// Body-frame kinematic limits
    pub limits: LimitsParams,

    /// Fixed integration step of the trajectory.
    ///
    /// Units: seconds
    pub traj_dt_s: f64,

    /// Target period of the control loop.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Default position tolerance for declaring a goal reached.
    ///
    /// Units: meters
    pub linear_tolerance_m: f64,

    /// Default attitude tolerance for declaring a goal reached.
    ///
    /// Units: radians
    pub angular_tolerance_rad: f64,

    /// How long to wait for the kill monitor to connect on startup.
    ///
    /// Units: seconds
    pub kill_connect_timeout_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the parameters other than the limits, which validate themselves.
    pub fn validate(&self) -> Result<(), TrajGenError> {
        let positive = [
            ("traj_dt_s", self.traj_dt_s),
            ("cycle_period_s", self.cycle_period_s),
        ];
        let non_negative = [
            ("linear_tolerance_m", self.linear_tolerance_m),
            ("angular_tolerance_rad", self.angular_tolerance_rad),
            ("kill_connect_timeout_s", self.kill_connect_timeout_s),
        ];

        for &(name, value) in positive.iter() {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrajGenError::InvalidParam(name, value));
            }
        }
        for &(name, value) in non_negative.iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(TrajGenError::InvalidParam(name, value));
            }
        }

        if self.fixed_frame.is_empty() {
            return Err(TrajGenError::MissingFrame("fixed_frame"));
        }
        if self.body_frame.is_empty() {
            return Err(TrajGenError::MissingFrame("body_frame"));
        }

        Ok(())
    }
}
