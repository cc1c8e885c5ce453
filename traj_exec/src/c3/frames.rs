//! # Frame transforms
//!
//! Generalised coordinates are 6-vectors `[x, y, z, roll, pitch, yaw]` in the fixed frame, with
//! the orientation stored as ZYX Euler angles. Rates of the generalised coordinates are converted
//! to and from body-frame twists here.
//!
//! The Euler kinematics are singular at a pitch of ±pi/2. The vehicle is assumed to operate far
//! from this pitch, no attempt is made to handle it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3, Vector6};

use comms_if::msg::{Accel, Pose, PoseTwist, Twist};

use super::{Point, PointWithAcceleration};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The body frame at a particular set of generalised coordinates.
#[derive(Debug, Clone)]
pub struct BodyFrame {
    /// Rotation of body vectors into the fixed frame
    world_from_body: Rotation3<f64>,

    /// Euler angle rates to body angular rates
    body_from_euler: Matrix3<f64>,

    /// Body angular rates to Euler angle rates
    euler_from_body: Matrix3<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl BodyFrame {
    pub fn at(q: &Vector6<f64>) -> Self {
        Self {
            world_from_body: world_from_body(q),
            body_from_euler: body_rates_from_euler_rates(q),
            euler_from_body: euler_rates_from_body_rates(q),
        }
    }

    /// Express a fixed-frame rate (or displacement) of the generalised coordinates in the body
    /// frame.
    pub fn to_body(&self, v: &Vector6<f64>) -> Vector6<f64> {
        join(
            &(self.world_from_body.inverse() * head(v)),
            &(self.body_from_euler * tail(v)),
        )
    }

    /// Express a body-frame twist as a rate of the generalised coordinates.
    pub fn to_world(&self, v_b: &Vector6<f64>) -> Vector6<f64> {
        join(
            &(self.world_from_body * head(v_b)),
            &(self.euler_from_body * tail(v_b)),
        )
    }

    /// Convert body angular rates into Euler angle rates.
    pub fn euler_rates(&self, omega_b: &Vector3<f64>) -> Vector3<f64> {
        self.euler_from_body * omega_b
    }

    /// Rotate a body vector into the fixed frame.
    pub fn rotate_to_world(&self, v_b: &Vector3<f64>) -> Vector3<f64> {
        self.world_from_body * v_b
    }

    /// Rotate a fixed-frame vector into the body frame.
    pub fn rotate_to_body(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.world_from_body.inverse() * v
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Linear part of a 6-vector
pub fn head(v: &Vector6<f64>) -> Vector3<f64> {
    Vector3::new(v[0], v[1], v[2])
}

/// Angular part of a 6-vector
pub fn tail(v: &Vector6<f64>) -> Vector3<f64> {
    Vector3::new(v[3], v[4], v[5])
}

pub fn join(lin: &Vector3<f64>, ang: &Vector3<f64>) -> Vector6<f64> {
    Vector6::new(lin[0], lin[1], lin[2], ang[0], ang[1], ang[2])
}

/// Rotation from the body frame at `q` into the fixed frame.
pub fn world_from_body(q: &Vector6<f64>) -> Rotation3<f64> {
    Rotation3::from_euler_angles(q[3], q[4], q[5])
}

/// Matrix mapping `[roll, pitch, yaw]` rates to body angular rates.
pub fn body_rates_from_euler_rates(q: &Vector6<f64>) -> Matrix3<f64> {
    let (sr, cr) = q[3].sin_cos();
    let (sp, cp) = q[4].sin_cos();

    Matrix3::new(
        1.0, 0.0, -sp,
        0.0, cr, sr * cp,
        0.0, -sr, cr * cp,
    )
}

/// Matrix mapping body angular rates to `[roll, pitch, yaw]` rates.
///
/// Singular at a pitch of ±pi/2.
pub fn euler_rates_from_body_rates(q: &Vector6<f64>) -> Matrix3<f64> {
    let (sr, cr) = q[3].sin_cos();
    let (sp, cp) = q[4].sin_cos();
    let tp = sp / cp;

    Matrix3::new(
        1.0, sr * tp, cr * tp,
        0.0, cr, -sr,
        0.0, sr / cp, cr / cp,
    )
}

/// Generalised coordinates of a pose.
pub fn q_from_pose(pose: &Pose) -> Vector6<f64> {
    let (roll, pitch, yaw) = pose.attitude_q.euler_angles();
    join(&pose.position_m, &Vector3::new(roll, pitch, yaw))
}

/// Pose described by the generalised coordinates.
pub fn pose_from_q(q: &Vector6<f64>) -> Pose {
    Pose {
        position_m: head(q),
        attitude_q: UnitQuaternion::from_euler_angles(q[3], q[4], q[5]),
    }
}

/// Build a point from a fixed-frame pose and a body-frame twist.
pub fn point_from_pose_twist(pose: &Pose, twist: &Twist) -> Point {
    let q = q_from_pose(pose);
    let qdot = BodyFrame::at(&q).to_world(&join(&twist.linear_ms, &twist.angular_rads));

    Point::new(q, qdot)
}

/// Express a trajectory point as a pose with body-frame twist and acceleration.
pub fn pose_twist_from_point(point: &PointWithAcceleration) -> PoseTwist {
    let frame = BodyFrame::at(&point.q);
    let v_b = frame.to_body(&point.qdot);
    let a_b = frame.to_body(&point.qdotdot);

    PoseTwist {
        pose: pose_from_q(&point.q),
        twist: Twist {
            linear_ms: head(&v_b),
            angular_rads: tail(&v_b),
        },
        accel: Accel {
            linear_mss: head(&a_b),
            angular_radss: tail(&a_b),
        },
    }
}
