//! # Kinematic limits
//!
//! All limits are expressed in the body frame. The first three components of each 6-vector are
//! the linear axes (x forward, y left, z up), the last three the angular axes (roll, pitch, yaw
//! rates about the body axes).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Vector3, Vector6};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Validated per-axis kinematic limits of the vehicle.
///
/// Construct with `Limits::new` or `LimitsParams::into_limits`, both of which check that the
/// limits describe a vehicle which can always stop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Limits {
    /// Minimum body velocity, non-positive
    pub vmin_b: Vector6<f64>,

    /// Maximum body velocity, non-negative
    pub vmax_b: Vector6<f64>,

    /// Minimum body acceleration, strictly negative
    pub amin_b: Vector6<f64>,

    /// Maximum body acceleration, strictly positive
    pub amax_b: Vector6<f64>,

    /// Lever arm from the body origin to the axis the vehicle rotates about.
    pub arevoffset_b: Vector3<f64>,

    /// Maximum rate of change of body acceleration while speeding up.
    pub umax_b: Vector6<f64>,
}

/// Limits as they appear in a parameter file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsParams {
    pub vmin_b: [f64; 6],
    pub vmax_b: [f64; 6],
    pub amin_b: [f64; 6],
    pub amax_b: [f64; 6],

    #[serde(default)]
    pub arevoffset_b: [f64; 3],

    pub umax_b: [f64; 6],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum LimitsError {
    #[error("{quantity}[{axis}] is not a finite number")]
    NotFinite { quantity: &'static str, axis: usize },

    #[error("Minimum {quantity} on axis {axis} is greater than the maximum")]
    MinAboveMax { quantity: &'static str, axis: usize },

    #[error("Velocity limits on axis {0} do not allow the vehicle to be at rest")]
    RestExcluded(usize),

    #[error("Acceleration limits on axis {0} do not allow the vehicle to both brake and accelerate")]
    CannotBrake(usize),

    #[error("Maximum control effort on axis {0} must be positive")]
    NonPositiveEffort(usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Limits {
    pub fn new(
        vmin_b: Vector6<f64>,
        vmax_b: Vector6<f64>,
        amin_b: Vector6<f64>,
        amax_b: Vector6<f64>,
        arevoffset_b: Vector3<f64>,
        umax_b: Vector6<f64>,
    ) -> Result<Self, LimitsError> {
        let named = [
            ("vmin_b", &vmin_b),
            ("vmax_b", &vmax_b),
            ("amin_b", &amin_b),
            ("amax_b", &amax_b),
            ("umax_b", &umax_b),
        ];
        for &(quantity, v) in named.iter() {
            if let Some(axis) = v.iter().position(|x| !x.is_finite()) {
                return Err(LimitsError::NotFinite { quantity, axis });
            }
        }
        if let Some(axis) = arevoffset_b.iter().position(|x| !x.is_finite()) {
            return Err(LimitsError::NotFinite {
                quantity: "arevoffset_b",
                axis,
            });
        }

        for axis in 0..6 {
            if vmin_b[axis] > vmax_b[axis] {
                return Err(LimitsError::MinAboveMax {
                    quantity: "velocity",
                    axis,
                });
            }
            if amin_b[axis] > amax_b[axis] {
                return Err(LimitsError::MinAboveMax {
                    quantity: "acceleration",
                    axis,
                });
            }
            if vmin_b[axis] > 0.0 || vmax_b[axis] < 0.0 {
                return Err(LimitsError::RestExcluded(axis));
            }
            if amin_b[axis] >= 0.0 || amax_b[axis] <= 0.0 {
                return Err(LimitsError::CannotBrake(axis));
            }
            if umax_b[axis] <= 0.0 {
                return Err(LimitsError::NonPositiveEffort(axis));
            }
        }

        Ok(Self {
            vmin_b,
            vmax_b,
            amin_b,
            amax_b,
            arevoffset_b,
            umax_b,
        })
    }

    /// Limits which are the same on every axis and in both directions, with no revolute offset.
    pub fn symmetric(vmax: f64, amax: f64, umax: f64) -> Result<Self, LimitsError> {
        Self::new(
            Vector6::repeat(-vmax),
            Vector6::repeat(vmax),
            Vector6::repeat(-amax),
            Vector6::repeat(amax),
            Vector3::zeros(),
            Vector6::repeat(umax),
        )
    }

    /// Deceleration the linear axes can achieve in any direction, the smallest linear
    /// acceleration limit in either sense.
    pub fn linear_decel(&self) -> f64 {
        (0..3)
            .map(|i| (-self.amin_b[i]).min(self.amax_b[i]))
            .fold(f64::INFINITY, f64::min)
    }
}

impl LimitsParams {
    pub fn into_limits(&self) -> Result<Limits, LimitsError> {
        Limits::new(
            Vector6::from_row_slice(&self.vmin_b),
            Vector6::from_row_slice(&self.vmax_b),
            Vector6::from_row_slice(&self.amin_b),
            Vector6::from_row_slice(&self.amax_b),
            Vector3::from_row_slice(&self.arevoffset_b),
            Vector6::from_row_slice(&self.umax_b),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> LimitsParams {
        LimitsParams {
            vmin_b: [-1.0; 6],
            vmax_b: [1.0; 6],
            amin_b: [-0.5; 6],
            amax_b: [0.5; 6],
            arevoffset_b: [0.0; 3],
            umax_b: [10.0; 6],
        }
    }

    #[test]
    fn test_valid_limits() {
        let limits = params().into_limits().unwrap();
        assert_eq!(limits, Limits::symmetric(1.0, 0.5, 10.0).unwrap());
        assert_eq!(limits.linear_decel(), 0.5);

        // Asymmetric velocity limits are allowed so long as rest is included
        let mut p = params();
        p.vmin_b[0] = 0.0;
        p.amin_b[1] = -0.2;
        p.amax_b[5] = 0.1;
        let limits = p.into_limits().unwrap();
        assert_eq!(limits.linear_decel(), 0.2);
    }

    #[test]
    fn test_invalid_limits() {
        let mut p = params();
        p.vmin_b[2] = 2.0;
        assert_eq!(
            p.into_limits(),
            Err(LimitsError::MinAboveMax {
                quantity: "velocity",
                axis: 2
            })
        );

        let mut p = params();
        p.amax_b[4] = -1.0;
        assert_eq!(
            p.into_limits(),
            Err(LimitsError::MinAboveMax {
                quantity: "acceleration",
                axis: 4
            })
        );

        let mut p = params();
        p.vmax_b[1] = -0.1;
        p.vmin_b[1] = -0.2;
        assert_eq!(p.into_limits(), Err(LimitsError::RestExcluded(1)));

        let mut p = params();
        p.amin_b[5] = 0.0;
        assert_eq!(p.into_limits(), Err(LimitsError::CannotBrake(5)));

        let mut p = params();
        p.umax_b[0] = 0.0;
        assert_eq!(p.into_limits(), Err(LimitsError::NonPositiveEffort(0)));

        let mut p = params();
        p.arevoffset_b[1] = f64::NAN;
        assert_eq!(
            p.into_limits(),
            Err(LimitsError::NotFinite {
                quantity: "arevoffset_b",
                axis: 1
            })
        );
    }
}
