//! # Static validity gate
//!
//! A validity gate built from fixed axis-aligned regions, standing in for an occupancy map in
//! simulation.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use comms_if::{
    eqpt::validity::{WaypointError, WaypointValidity},
    msg::Pose,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An axis-aligned box in the fixed frame.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub min_m: [f64; 3],
    pub max_m: [f64; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidityParams {
    /// Regions known to be occupied
    #[serde(default)]
    pub occupied: Vec<Region>,

    /// Regions nothing is known about
    #[serde(default)]
    pub unknown: Vec<Region>,
}

#[derive(Debug, Clone)]
pub struct StaticValidityGate {
    params: ValidityParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Region {
    pub fn contains(&self, pose: &Pose) -> bool {
        (0..3).all(|i| {
            pose.position_m[i] >= self.min_m[i] && pose.position_m[i] <= self.max_m[i]
        })
    }
}

impl StaticValidityGate {
    pub fn new(params: ValidityParams) -> Self {
        Self { params }
    }
}

impl WaypointValidity for StaticValidityGate {
    /// Occupied regions take precedence over unknown ones.
    fn check(&self, pose: &Pose) -> Result<(), WaypointError> {
        if self.params.occupied.iter().any(|r| r.contains(pose)) {
            Err(WaypointError::Occupied)
        }
        else if self.params.unknown.iter().any(|r| r.contains(pose)) {
            Err(WaypointError::Unknown)
        }
        else {
            Ok(())
        }
    }
}
