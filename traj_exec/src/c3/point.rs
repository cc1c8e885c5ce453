//! # Trajectory point types

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{UnitQuaternion, Vector6};
use serde::Serialize;

use super::frames::{head, tail};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Generalised coordinates and their rates, all in the fixed frame.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Point {
    /// `[x, y, z, roll, pitch, yaw]`
    pub q: Vector6<f64>,

    pub qdot: Vector6<f64>,
}

/// A point with accelerations, only ever produced by the integrator.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct PointWithAcceleration {
    pub q: Vector6<f64>,
    pub qdot: Vector6<f64>,
    pub qdotdot: Vector6<f64>,
}

/// A target for the integrator to approach.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    /// Target point. Non-zero rates make the target move.
    pub r: Point,

    /// Cap on the translational approach speed, no cap if zero.
    pub speed: f64,

    /// If true all axes are profiled to arrive together.
    pub coordinated: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Point {
    pub fn new(q: Vector6<f64>, qdot: Vector6<f64>) -> Self {
        Self { q, qdot }
    }

    /// A stationary point at `q`.
    pub fn at_rest(q: Vector6<f64>) -> Self {
        Self {
            q,
            qdot: Vector6::zeros(),
        }
    }

    /// The same point with all rates zeroed.
    pub fn stopped(&self) -> Self {
        Self::at_rest(self.q)
    }

    /// True if the point is within `linear_tol` of `other`'s position and within `angular_tol`
    /// of its orientation. Rates are not compared.
    pub fn is_approximately(&self, other: &Point, linear_tol: f64, angular_tol: f64) -> bool {
        let lin_err = (head(&self.q) - head(&other.q)).norm();
        let ang_err = attitude(&self.q).angle_to(&attitude(&other.q));

        lin_err < linear_tol && ang_err < angular_tol
    }

    /// True if both the translational speed and the angular rate are below the tolerances.
    pub fn is_at_rest(&self, linear_tol: f64, angular_tol: f64) -> bool {
        head(&self.qdot).norm() < linear_tol && tail(&self.qdot).norm() < angular_tol
    }
}

impl PointWithAcceleration {
    pub fn point(&self) -> Point {
        Point::new(self.q, self.qdot)
    }
}

impl From<Point> for Waypoint {
    /// Hold the point with no speed cap.
    fn from(r: Point) -> Self {
        Self {
            r,
            speed: 0.0,
            coordinated: true,
        }
    }
}

fn attitude(q: &Vector6<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(q[3], q[4], q[5])
}
