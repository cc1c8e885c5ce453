//! # Message definitions
//!
//! Geometry and odometry messages exchanged between the trajectory generator and the rest of the
//! system. Positions and attitudes are expressed in the fixed (world) frame, rates and
//! accelerations in the body frame, matching the usual odometry conventions.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Position and attitude of the vehicle body in the fixed frame.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position of the body origin in the fixed frame
    pub position_m: Vector3<f64>,

    /// Attitude of the body in the fixed frame, rotating body vectors into the fixed frame.
    pub attitude_q: UnitQuaternion<f64>,
}

/// Linear and angular rates of the vehicle, expressed in the body frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Twist {
    pub linear_ms: Vector3<f64>,
    pub angular_rads: Vector3<f64>,
}

/// Linear and angular accelerations of the vehicle, expressed in the body frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Accel {
    pub linear_mss: Vector3<f64>,
    pub angular_radss: Vector3<f64>,
}

/// A full kinematic reference: pose, twist and acceleration.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseTwist {
    pub pose: Pose,
    pub twist: Twist,
    pub accel: Accel,
}

/// An odometry sample from the vehicle's navigation system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Odometry {
    /// Frame the pose is expressed in
    pub frame_id: String,

    /// Frame the twist is expressed in
    pub child_frame_id: String,

    pub pose: Pose,

    pub twist: Twist,
}

/// A kinematic reference stamped with the time it is valid for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseTwistStamped {
    /// Time in seconds the reference is valid at
    pub stamp_s: f64,

    pub frame_id: String,

    pub posetwist: PoseTwist,
}

/// A pose stamped with the time it is valid for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseStamped {
    pub stamp_s: f64,
    pub frame_id: String,
    pub pose: Pose,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose {
    /// Build a pose from a position and roll, pitch, yaw angles in radians.
    pub fn from_xyz_rpy(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self {
            position_m: Vector3::new(x, y, z),
            attitude_q: UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position_m: Vector3::zeros(),
            attitude_q: UnitQuaternion::identity(),
        }
    }
}
