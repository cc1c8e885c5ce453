//! # Simulation Client
//!
//! A simulated vehicle which tracks the generated trajectory perfectly. It provides the odometry
//! that initialises the trajectory and the validity regions the gate checks against, so the exec
//! can be run without any hardware.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::warn;
use serde::Deserialize;

use crate::validity::ValidityParams;
use comms_if::msg::{Odometry, Pose, PoseTwistStamped, Twist};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulated world, loaded from `sim.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SimParams {
    /// Units: meters
    pub initial_position_m: [f64; 3],

    /// Units: radians
    pub initial_yaw_rad: f64,

    #[serde(default)]
    pub validity: ValidityParams,
}

pub struct SimClient {
    fixed_frame: String,
    body_frame: String,
    pose: Pose,
    twist: Twist,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimClient {
    pub fn new(params: &SimParams, fixed_frame: &str, body_frame: &str) -> Self {
        let [x, y, z] = params.initial_position_m;

        Self {
            fixed_frame: fixed_frame.to_string(),
            body_frame: body_frame.to_string(),
            pose: Pose::from_xyz_rpy(x, y, z, 0.0, 0.0, params.initial_yaw_rad),
            twist: Twist::default(),
        }
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Current odometry of the simulated vehicle.
    pub fn odometry(&self) -> Odometry {
        Odometry {
            frame_id: self.fixed_frame.clone(),
            child_frame_id: self.body_frame.clone(),
            pose: self.pose,
            twist: self.twist,
        }
    }

    /// Move the vehicle exactly onto the trajectory.
    pub fn track(&mut self, traj: &PoseTwistStamped) {
        if traj.frame_id != self.fixed_frame {
            warn!(
                "Trajectory is in frame {} but the simulation is in {}, not tracking",
                traj.frame_id, self.fixed_frame
            );
            return;
        }

        self.pose = traj.posetwist.pose;
        self.twist = traj.posetwist.twist;
    }

    /// Stop the vehicle where it is, used when there is no trajectory to follow.
    pub fn hold(&mut self) {
        self.twist = Twist::default();
    }
}
