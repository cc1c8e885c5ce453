//! # Discrete braking profile
//!
//! The integrator steps velocity in increments of `a * dt` and then position with the new
//! velocity. A vehicle at speed `n * a * dt` therefore covers `dt * a * dt * n * (n + 1) / 2`
//! while braking at `a`. These functions invert and evaluate that relationship so the profile
//! never needs to brake harder than its limits allow.

/// Largest speed from which braking at `decel` stops within `dist`.
///
/// This is the exact inverse of one step at the returned speed followed by
/// `braking_distance`. Between multiples of `decel * dt` the distance is linear in the speed, so
/// the number of whole braking steps is found first and the speed solved for on that segment.
/// Tiny distances are covered in a single step.
pub fn stopping_speed(dist: f64, decel: f64, dt: f64) -> f64 {
    if dist <= 0.0 {
        return 0.0;
    }

    let step = decel * dt;
    let n = ((0.25 + 2.0 * dist / (step * dt)).sqrt() - 0.5).floor().max(0.0);

    dist / (dt * (n + 1.0)) + step * n / 2.0
}

/// Velocity to command on one axis with `err` remaining to the target.
pub fn approach_velocity(err: f64, vmin: f64, vmax: f64, amin: f64, amax: f64, dt: f64) -> f64 {
    if err > 0.0 {
        stopping_speed(err, -amin, dt).min(vmax)
    }
    else if err < 0.0 {
        -stopping_speed(-err, amax, dt).min(-vmin)
    }
    else {
        0.0
    }
}

/// Distance covered while braking from `speed` to rest at `decel`.
pub fn braking_distance(speed: f64, decel: f64, dt: f64) -> f64 {
    if speed <= 0.0 {
        return 0.0;
    }

    let step = decel * dt;
    let n = (speed / step).floor();

    dt * (n * speed - step * n * (n + 1.0) / 2.0)
}

#[cfg(test)]
mod test {
    use super::*;

    const DT: f64 = 0.01;
    const DECEL: f64 = 0.5;

    /// Simulate braking from `speed` at `DECEL`, returning the distance covered.
    fn simulate_braking(mut speed: f64) -> f64 {
        let mut dist = 0.0;
        while speed > 0.0 {
            speed = (speed - DECEL * DT).max(0.0);
            dist += speed * DT;
        }
        dist
    }

    #[test]
    fn test_braking_distance() {
        for &speed in [0.0, 0.004, 0.005, 0.1, 0.3337, 1.0].iter() {
            assert!(
                (braking_distance(speed, DECEL, DT) - simulate_braking(speed)).abs() < 1e-9,
                "speed {}", speed
            );
        }
    }

    #[test]
    fn test_stopping_speed_matches_braking_distance() {
        // Moving one step at the stopping speed then braking covers exactly the distance
        for n in 2..200 {
            let speed = n as f64 * DECEL * DT;
            let dist = speed * DT + braking_distance(speed, DECEL, DT);
            assert!((stopping_speed(dist, DECEL, DT) - speed).abs() < 1e-9);
        }

        assert_eq!(stopping_speed(0.0, DECEL, DT), 0.0);
        assert_eq!(stopping_speed(-1.0, DECEL, DT), 0.0);

        // Tiny distances are covered in one step
        assert!((stopping_speed(1e-6, DECEL, DT) - 1e-4).abs() < 1e-12);
    }

    #[test]
    fn test_stopping_speed_between_grid_speeds() {
        // Off-grid speeds must still stop within the distance they were chosen for
        for &dist in [0.0123, 0.1, 0.4567, 0.9999, 2.5].iter() {
            let speed = stopping_speed(dist, DECEL, DT);
            assert!(
                speed * DT + simulate_braking(speed) <= dist + 1e-12,
                "dist {}", dist
            );
            assert!(speed <= dist / DT);
        }
    }

    #[test]
    fn test_approach_velocity() {
        // Far away the velocity limit applies
        assert_eq!(approach_velocity(10.0, -1.0, 1.0, -0.5, 0.5, DT), 1.0);
        assert_eq!(approach_velocity(-10.0, -0.5, 1.0, -0.5, 0.5, DT), -0.5);

        // Close in the braking profile applies
        let v = approach_velocity(0.1, -1.0, 1.0, -0.5, 0.5, DT);
        assert!(v > 0.0 && v < 1.0);
        assert_eq!(v, stopping_speed(0.1, 0.5, DT));

        assert_eq!(approach_velocity(0.0, -1.0, 1.0, -0.5, 0.5, DT), 0.0);
    }
}
