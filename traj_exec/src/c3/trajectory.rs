//! # C3 trajectory integrator

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Vector3, Vector6};

use util::maths::{clamp, wrap_angle};

use super::{
    frames::{head, join, tail, BodyFrame},
    profile, Limits, Point, PointWithAcceleration, Waypoint,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Axes with less error than this are not used to coordinate the others.
const COORDINATION_MIN_ERROR: f64 = 1e-9;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Integrates a reference point toward waypoints while keeping its body-frame velocity and
/// acceleration within the vehicle's limits.
///
/// Each call to `update` advances the point by one fixed step. Translation runs along the
/// straight line to the target in the fixed frame, with its speed taken from a discrete braking
/// profile at the deceleration the vehicle can manage in any direction. Rotation is profiled per
/// body axis. Limits are applied to the linear velocity and acceleration by scaling the whole
/// vector, so the vehicle turning underneath never bends the path and a stationary target is
/// reached at rest without overshoot.
#[derive(Debug, Clone)]
pub struct C3Trajectory {
    limits: Limits,

    q: Vector6<f64>,
    qdot: Vector6<f64>,
    qdotdot: Vector6<f64>,

    /// Body-frame velocity, the state the limits are applied to
    v_b: Vector6<f64>,

    /// Body-frame acceleration applied in the last step
    a_b: Vector6<f64>,
}

/// Velocity toward the target before any feed-forward.
struct Approach {
    /// Linear velocity in the fixed frame
    linear: Vector3<f64>,

    /// Body angular rates
    angular: Vector3<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl C3Trajectory {
    pub fn new(start: Point, limits: Limits) -> Self {
        let mut traj = Self {
            limits,
            q: Vector6::zeros(),
            qdot: Vector6::zeros(),
            qdotdot: Vector6::zeros(),
            v_b: Vector6::zeros(),
            a_b: Vector6::zeros(),
        };
        traj.reset(start);
        traj
    }

    /// Hard reset to the given point. Accelerations are zeroed so the next step is free to apply
    /// any acceleration within the limits.
    pub fn reset(&mut self, point: Point) {
        self.q = wrap_angles(point.q);
        self.qdot = point.qdot;
        self.qdotdot = Vector6::zeros();
        self.v_b = BodyFrame::at(&self.q).to_body(&self.qdot);
        self.a_b = Vector6::zeros();
    }

    /// Advance one step of `dt` toward the waypoint.
    ///
    /// `waypoint_age_s` is the time since the waypoint was commanded, used to extrapolate a
    /// moving target.
    pub fn update(&mut self, dt: f64, waypoint: &Waypoint, waypoint_age_s: f64) {
        let l = self.limits;
        let frame = BodyFrame::at(&self.q);

        let target = waypoint.r.q + waypoint.r.qdot * waypoint_age_s.max(0.0);
        let approach = self.approach(dt, &frame, &self.error_to(&target), waypoint);

        let v_lin_des = frame.rotate_to_body(&(head(&waypoint.r.qdot) + approach.linear));
        let v_lin_des = v_lin_des * box_scale(&v_lin_des, &head(&l.vmin_b), &head(&l.vmax_b));
        let rdot_ang_b = tail(&frame.to_body(&waypoint.r.qdot));
        let v_ang_des = Vector3::from_fn(|i, _| {
            clamp(
                &(rdot_ang_b[i] + approach.angular[i]),
                &l.vmin_b[i + 3],
                &l.vmax_b[i + 3],
            )
        });

        let v_des = join(&v_lin_des, &v_ang_des);
        let a_b = self.limit_acceleration(&((v_des - self.v_b) / dt), dt);

        // Linear velocity is held in the fixed frame while the body rotates under it
        let v_lin = frame.rotate_to_world(&(head(&self.v_b) + head(&a_b) * dt));
        let omega_b = Vector3::from_fn(|i, _| {
            clamp(
                &(self.v_b[i + 3] + a_b[i + 3] * dt),
                &l.vmin_b[i + 3],
                &l.vmax_b[i + 3],
            )
        });

        let angles = tail(&self.q) + frame.euler_rates(&omega_b) * dt;
        let mut q = wrap_angles(join(&head(&self.q), &angles));
        let new_frame = BodyFrame::at(&q);

        // The new attitude can put the velocity outside the body limits
        let v_lin_b = new_frame.rotate_to_body(&v_lin);
        let scale = box_scale(&v_lin_b, &head(&l.vmin_b), &head(&l.vmax_b));
        let (v_lin, v_lin_b) = (v_lin * scale, v_lin_b * scale);

        for i in 0..3 {
            q[i] += v_lin[i] * dt;
        }

        self.q = q;
        self.qdot = join(&v_lin, &new_frame.euler_rates(&omega_b));
        self.qdotdot = join(
            &frame.rotate_to_world(&head(&a_b)),
            &new_frame.euler_rates(&tail(&a_b)),
        );
        self.v_b = join(&v_lin_b, &omega_b);
        self.a_b = a_b;
    }

    pub fn current(&self) -> PointWithAcceleration {
        PointWithAcceleration {
            q: self.q,
            qdot: self.qdot,
            qdotdot: self.qdotdot,
        }
    }

    pub fn current_point(&self) -> Point {
        Point::new(self.q, self.qdot)
    }

    pub fn body_velocity(&self) -> Vector6<f64> {
        self.v_b
    }

    pub fn body_acceleration(&self) -> Vector6<f64> {
        self.a_b
    }

    pub fn is_approximately(&self, other: &Point, linear_tol: f64, angular_tol: f64) -> bool {
        self.current_point()
            .is_approximately(other, linear_tol, angular_tol)
    }

    /// The point at which the trajectory comes to rest if it brakes as hard as `update` allows
    /// with steps of `dt`.
    ///
    /// Translation stops along the current fixed-frame velocity, so a turning vehicle still
    /// brakes in a straight line. Each angular axis brakes at its own limit.
    pub fn stopping_point(&self, dt: f64) -> Point {
        let l = &self.limits;

        let v_lin = head(&self.qdot);
        let speed = v_lin.norm();
        let d_lin = if speed > 0.0 {
            v_lin * (profile::braking_distance(speed, l.linear_decel(), dt) / speed)
        }
        else {
            Vector3::zeros()
        };

        let d_ang_b = Vector3::from_fn(|i, _| {
            let v = self.v_b[i + 3];
            if v > 0.0 {
                profile::braking_distance(v, -l.amin_b[i + 3], dt)
            }
            else if v < 0.0 {
                -profile::braking_distance(-v, l.amax_b[i + 3], dt)
            }
            else {
                0.0
            }
        });

        let d = join(&d_lin, &BodyFrame::at(&self.q).euler_rates(&d_ang_b));

        Point::at_rest(wrap_angles(self.q + d))
    }

    /// Error from the current coordinates to the target, with angles taking the short way round.
    fn error_to(&self, target: &Vector6<f64>) -> Vector6<f64> {
        let mut e = target - self.q;
        for i in 3..6 {
            e[i] = wrap_angle(e[i]);
        }
        e
    }

    fn approach(
        &self,
        dt: f64,
        frame: &BodyFrame,
        error: &Vector6<f64>,
        waypoint: &Waypoint,
    ) -> Approach {
        let l = &self.limits;

        let error_lin = head(error);
        let dist = error_lin.norm();
        let dir = if dist > 0.0 {
            error_lin / dist
        }
        else {
            Vector3::zeros()
        };
        let mut speed = if dist > 0.0 {
            let dir_b = frame.rotate_to_body(&dir);
            profile::stopping_speed(dist, l.linear_decel(), dt)
                .min(max_scale(&dir_b, &head(&l.vmin_b), &head(&l.vmax_b)))
        }
        else {
            0.0
        };

        let error_ang_b = tail(&frame.to_body(error));
        let mut omega = Vector3::from_fn(|i, _| {
            profile::approach_velocity(
                error_ang_b[i],
                l.vmin_b[i + 3],
                l.vmax_b[i + 3],
                l.amin_b[i + 3],
                l.amax_b[i + 3],
                dt,
            )
        });

        if waypoint.coordinated {
            // Slow translation and every angular axis to the time-to-go of the slowest
            let translating = dist > COORDINATION_MIN_ERROR && speed > 0.0;
            let turning: Vec<usize> = (0..3)
                .filter(|&i| error_ang_b[i].abs() > COORDINATION_MIN_ERROR && omega[i] != 0.0)
                .collect();
            let ratio = turning
                .iter()
                .map(|&i| omega[i] / error_ang_b[i])
                .chain(if translating { Some(speed / dist) } else { None })
                .fold(f64::INFINITY, f64::min);

            if ratio.is_finite() {
                if translating {
                    speed = dist * ratio;
                }
                for &i in turning.iter() {
                    omega[i] = error_ang_b[i] * ratio;
                }
            }
        }

        if waypoint.speed > 0.0 && speed > waypoint.speed {
            if waypoint.coordinated {
                omega *= waypoint.speed / speed;
            }
            speed = waypoint.speed;
        }

        Approach {
            linear: dir * speed,
            angular: omega,
        }
    }

    /// Limit a desired body acceleration.
    ///
    /// Angular axes are limited first since angular acceleration about an offset axis induces
    /// a linear acceleration at the body origin, which narrows the linear window. The linear
    /// acceleration is scaled as a whole to keep its direction.
    fn limit_acceleration(&self, a_des: &Vector6<f64>, dt: f64) -> Vector6<f64> {
        let l = &self.limits;

        let alpha = Vector3::from_fn(|i, _| {
            let j = i + 3;
            let a_j = clamp(&a_des[j], &l.amin_b[j], &l.amax_b[j]);
            limit_jerk(a_j, self.v_b[j], self.a_b[j], l.umax_b[j], dt)
        });

        let induced = alpha.cross(&l.arevoffset_b);

        // Zero is always allowed
        let lo = Vector3::from_fn(|i, _| l.amin_b[i].max(l.amin_b[i] - induced[i]).min(0.0));
        let hi = Vector3::from_fn(|i, _| l.amax_b[i].min(l.amax_b[i] - induced[i]).max(0.0));

        let a_lin = head(a_des);
        let a_lin = a_lin * box_scale(&a_lin, &lo, &hi);

        join(&self.limit_linear_jerk(&a_lin, dt), &alpha)
    }

    /// Limit the growth of a linear acceleration which speeds the vehicle up, scaling the whole
    /// vector. Braking is never limited.
    fn limit_linear_jerk(&self, a: &Vector3<f64>, dt: f64) -> Vector3<f64> {
        let v = head(&self.v_b);
        if a.dot(&v) <= 0.0 && v.iter().any(|&x| x != 0.0) {
            return *a;
        }

        let a_prev = head(&self.a_b);
        let scale = (0..3)
            .filter(|&i| a[i] != 0.0)
            .map(|i| {
                let max_mag = (a_prev[i] * a[i].signum()).max(0.0) + self.limits.umax_b[i] * dt;
                max_mag / a[i].abs()
            })
            .fold(1.0, f64::min);

        a * scale
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn wrap_angles(mut q: Vector6<f64>) -> Vector6<f64> {
    for i in 3..6 {
        q[i] = wrap_angle(q[i]);
    }
    q
}

/// Largest factor `v` can be multiplied by and stay within `[lo, hi]` on every axis. Infinite
/// for a zero vector.
fn max_scale(v: &Vector3<f64>, lo: &Vector3<f64>, hi: &Vector3<f64>) -> f64 {
    (0..3)
        .map(|i| {
            if v[i] > 0.0 {
                hi[i] / v[i]
            }
            else if v[i] < 0.0 {
                lo[i] / v[i]
            }
            else {
                f64::INFINITY
            }
        })
        .fold(f64::INFINITY, f64::min)
        .max(0.0)
}

/// Factor which brings `v` inside `[lo, hi]` without changing its direction, one if it is
/// already inside.
fn box_scale(v: &Vector3<f64>, lo: &Vector3<f64>, hi: &Vector3<f64>) -> f64 {
    max_scale(v, lo, hi).min(1.0)
}

/// Limit the growth of an acceleration which speeds the axis up. Braking is never limited.
fn limit_jerk(a: f64, v: f64, a_prev: f64, umax: f64, dt: f64) -> f64 {
    if a * v > 0.0 || v == 0.0 {
        let max_mag = (a_prev * a.signum()).max(0.0) + umax * dt;
        a.signum() * a.abs().min(max_mag)
    }
    else {
        a
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const DT: f64 = 0.01;

    /// Small deterministic generator so the tests are repeatable.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> f64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (self.0 >> 11) as f64 / (1u64 << 53) as f64
        }

        fn range(&mut self, lo: f64, hi: f64) -> f64 {
            lo + (hi - lo) * self.next()
        }
    }

    fn limits() -> Limits {
        Limits::symmetric(1.0, 0.5, 10.0).unwrap()
    }

    fn asymmetric_limits() -> Limits {
        Limits::new(
            Vector6::new(-0.3, -0.5, -0.2, -0.4, -0.4, -0.8),
            Vector6::new(1.2, 0.5, 0.2, 0.4, 0.4, 0.6),
            Vector6::new(-0.8, -0.4, -0.3, -0.5, -0.5, -1.0),
            Vector6::new(0.6, 0.4, 0.3, 0.5, 0.5, 0.7),
            Vector3::new(0.2, -0.1, 0.05),
            Vector6::new(5.0, 5.0, 5.0, 8.0, 8.0, 8.0),
        )
        .unwrap()
    }

    fn stationary(q: Vector6<f64>) -> Waypoint {
        Waypoint::from(Point::at_rest(q))
    }

    /// Run until the trajectory is at rest at the waypoint, returning the number of steps.
    fn run_to_rest(c3: &mut C3Trajectory, wp: &Waypoint, max_steps: usize) -> usize {
        for n in 0..max_steps {
            c3.update(DT, wp, n as f64 * DT);
            if c3.is_approximately(&wp.r, 1e-6, 1e-6) && c3.current_point().is_at_rest(1e-9, 1e-9) {
                return n + 1;
            }
        }
        panic!("Trajectory did not converge in {} steps: {:?}", max_steps, c3.current());
    }

    #[test]
    fn test_idempotent_at_waypoint() {
        let q = Vector6::new(1.0, -2.0, 0.3, 0.05, -0.1, 2.0);
        let mut c3 = C3Trajectory::new(Point::at_rest(q), limits());
        let before = c3.current();

        for n in 0..100 {
            c3.update(DT, &stationary(q), n as f64 * DT);
        }

        assert_eq!(c3.current(), before);
        assert_eq!(c3.body_velocity(), Vector6::zeros());
    }

    #[test]
    fn test_limits_respected_for_any_waypoints() {
        let l = asymmetric_limits();
        let mut rng = Lcg(0xC3);
        let mut c3 = C3Trajectory::new(Point::at_rest(Vector6::zeros()), l);

        for _ in 0..40 {
            let mut q = Vector6::from_fn(|_, _| rng.range(-5.0, 5.0));
            q[3] = rng.range(-0.3, 0.3);
            q[4] = rng.range(-0.3, 0.3);
            q[5] = rng.range(-PI, PI);
            let qdot = Vector6::from_fn(|_, _| rng.range(-0.2, 0.2));

            let wp = Waypoint {
                r: Point::new(q, qdot),
                speed: if rng.next() > 0.5 { rng.range(0.1, 2.0) } else { 0.0 },
                coordinated: rng.next() > 0.5,
            };

            let steps = (rng.range(10.0, 400.0)) as usize;
            for n in 0..steps {
                c3.update(DT, &wp, n as f64 * DT);

                let v = c3.body_velocity();
                let a = c3.body_acceleration();
                for i in 0..6 {
                    assert!(v[i] >= l.vmin_b[i] - 1e-9 && v[i] <= l.vmax_b[i] + 1e-9);
                    assert!(a[i] >= l.amin_b[i] - 1e-9 && a[i] <= l.amax_b[i] + 1e-9);
                }
                assert!(c3.current().q[5] > -PI && c3.current().q[5] <= PI);
            }
        }
    }

    #[test]
    fn test_converges_without_overshoot() {
        let target = Vector6::new(3.0, -2.0, 0.5, 0.0, 0.0, 0.0);

        for &coordinated in [true, false].iter() {
            let wp = Waypoint {
                coordinated,
                ..stationary(target)
            };
            let mut c3 = C3Trajectory::new(Point::at_rest(Vector6::zeros()), limits());

            for n in 0..2000 {
                c3.update(DT, &wp, n as f64 * DT);

                let p = c3.current();
                for i in 0..3 {
                    // The error never changes sign
                    assert!((target[i] - p.q[i]) * target[i].signum() >= -1e-9);
                }
            }

            assert!(c3.is_approximately(&wp.r, 1e-9, 1e-9));
            assert!(c3.current_point().is_at_rest(1e-12, 1e-12));
        }
    }

    #[test]
    fn test_single_axis_speed_profile() {
        let wp = stationary(Vector6::new(3.0, 0.0, 0.0, 0.0, 0.0, 0.0));
        let mut c3 = C3Trajectory::new(Point::at_rest(Vector6::zeros()), limits());
        let mut prev_speed = 0.0;
        let mut braking = false;

        let steps = run_to_rest(&mut c3, &wp, 2000);
        let mut c3 = C3Trajectory::new(Point::at_rest(Vector6::zeros()), limits());

        for n in 0..steps {
            c3.update(DT, &wp, n as f64 * DT);
            let speed = c3.body_velocity()[0];

            // Speeds up, cruises, then slows monotonically to rest
            if speed < prev_speed - 1e-12 {
                braking = true;
            }
            if braking {
                assert!(speed <= prev_speed + 1e-12, "speed rose while braking at {}", n);
            }
            prev_speed = speed;
        }

        // Accelerate for about 2 s, cruise for 1 s, brake for 2 s
        assert!(steps > 480 && steps < 560, "took {} steps", steps);
    }

    #[test]
    fn test_converges_with_rotation() {
        let start = Vector6::new(0.0, 0.0, 0.0, 0.0, 0.0, 2.8);
        let target = Vector6::new(2.0, 1.0, 0.0, 0.1, -0.05, -2.8);

        let mut c3 = C3Trajectory::new(Point::at_rest(start), limits());
        let steps = run_to_rest(&mut c3, &stationary(target), 5000);

        // Yaw takes the short way round through pi
        assert!(steps < 1000, "took {} steps", steps);
        assert!((c3.current().q[5] + 2.8).abs() < 1e-6);
    }

    #[test]
    fn test_coordinated_axes_arrive_together() {
        let target = Vector6::new(4.0, 0.0, 0.0, 0.0, 0.0, 0.3);

        let arrival_steps = |coordinated: bool| {
            let wp = Waypoint {
                coordinated,
                ..stationary(target)
            };
            let mut c3 = C3Trajectory::new(Point::at_rest(Vector6::zeros()), limits());
            let mut arrived = [None, None];

            for n in 0..3000 {
                c3.update(DT, &wp, n as f64 * DT);
                let q = c3.current().q;
                for (k, &i) in [0, 5].iter().enumerate() {
                    if arrived[k].is_none() && (target[i] - q[i]).abs() < 1e-3 {
                        arrived[k] = Some(n);
                    }
                }
            }

            (arrived[0].unwrap() as f64, arrived[1].unwrap() as f64)
        };

        let (x, yaw) = arrival_steps(true);
        assert!((x - yaw).abs() <= 0.1 * x, "x at {}, yaw at {}", x, yaw);

        let (x, yaw) = arrival_steps(false);
        assert!(yaw < 0.7 * x, "x at {}, yaw at {}", x, yaw);
    }

    #[test]
    fn test_translation_is_straight_while_turning() {
        let target = Vector6::new(3.0, -1.5, 0.4, 0.0, 0.0, 0.0);
        let dist = head(&target).norm();
        let dir = head(&target) / dist;

        for &yaw in [FRAC_PI_2, 3.0, -2.0, 1.0].iter() {
            for &coordinated in [true, false].iter() {
                let mut q = target;
                q[5] = yaw;
                let wp = Waypoint {
                    coordinated,
                    ..stationary(q)
                };
                let mut c3 = C3Trajectory::new(Point::at_rest(Vector6::zeros()), limits());

                for n in 0..2000 {
                    c3.update(DT, &wp, n as f64 * DT);

                    let pos = head(&c3.current().q);
                    let along = pos.dot(&dir);
                    assert!(
                        along - dist < 1e-3,
                        "overshot by {} turning to {} (coordinated {})",
                        along - dist,
                        yaw,
                        coordinated
                    );
                    assert!((pos - dir * along).norm() < 1e-9);
                }

                assert!(c3.is_approximately(&wp.r, 1e-9, 1e-9));
                assert!(c3.current_point().is_at_rest(1e-12, 1e-12));
            }
        }
    }

    #[test]
    fn test_forward_goal_with_turn_never_overshoots() {
        for &yaw in [FRAC_PI_2, 3.0].iter() {
            for &coordinated in [true, false].iter() {
                let wp = Waypoint {
                    coordinated,
                    ..stationary(Vector6::new(3.0, 0.0, 0.0, 0.0, 0.0, yaw))
                };
                let mut c3 = C3Trajectory::new(Point::at_rest(Vector6::zeros()), limits());
                let mut max_x = 0.0f64;

                for n in 0..2000 {
                    c3.update(DT, &wp, n as f64 * DT);
                    max_x = max_x.max(c3.current().q[0]);
                }

                assert!(max_x - 3.0 < 1e-3, "overshot by {} turning to {}", max_x - 3.0, yaw);
                assert!(c3.is_approximately(&wp.r, 1e-9, 1e-9));
            }
        }
    }

    #[test]
    fn test_speed_cap() {
        let wp = Waypoint {
            r: Point::at_rest(Vector6::new(3.0, 3.0, 0.0, 0.0, 0.0, 0.0)),
            speed: 0.3,
            coordinated: true,
        };
        let mut c3 = C3Trajectory::new(Point::at_rest(Vector6::zeros()), limits());

        for n in 0..3000 {
            c3.update(DT, &wp, n as f64 * DT);
            assert!(head(&c3.current().qdot).norm() <= 0.3 + 1e-9);
        }
        assert!(c3.is_approximately(&wp.r, 1e-6, 1e-6));
    }

    #[test]
    fn test_stopping_point() {
        let mut c3 = C3Trajectory::new(Point::at_rest(Vector6::zeros()), limits());
        let far = stationary(Vector6::new(100.0, 0.0, 0.0, 0.0, 0.0, 0.0));

        // Get up to speed
        for n in 0..300 {
            c3.update(DT, &far, n as f64 * DT);
        }
        let v0 = c3.body_velocity()[0];
        assert!((v0 - 1.0).abs() < 1e-9);

        // Stop as fast as possible
        let stop = c3.stopping_point(DT);
        let start_x = c3.current().q[0];
        assert!(stop.q[0] > start_x && stop.q[0] < start_x + 1.1);

        c3.reset(c3.current_point());
        let mut prev_speed = v0;
        for n in 0..500 {
            c3.update(DT, &Waypoint::from(stop), n as f64 * DT);
            let speed = c3.body_velocity()[0];
            assert!(speed <= prev_speed + 1e-12);
            assert!(c3.body_acceleration()[0] >= -0.5 - 1e-9);
            prev_speed = speed;
        }

        assert!(c3.is_approximately(&stop, 1e-9, 1e-9));
        assert!(c3.body_velocity()[0].abs() < 1e-12);
    }

    #[test]
    fn test_stopping_point_while_turning() {
        let mut c3 = C3Trajectory::new(Point::at_rest(Vector6::zeros()), limits());
        let goal = stationary(Vector6::new(5.0, 0.0, 0.0, 0.0, 0.0, 3.0));

        let mut n = 0;
        while c3.current().q[0] < 2.0 {
            c3.update(DT, &goal, n as f64 * DT);
            n += 1;
        }
        assert!(c3.body_velocity()[5].abs() > 0.1, "not turning when stopped");

        let stop = c3.stopping_point(DT);
        let v0 = head(&c3.current().qdot);
        let dir = v0 / v0.norm();
        let start = head(&c3.current().q);

        let hold = Waypoint {
            coordinated: false,
            ..Waypoint::from(stop)
        };

        c3.reset(c3.current_point());
        let mut prev_speed = v0.norm();
        for n in 0..1000 {
            c3.update(DT, &hold, n as f64 * DT);
            let p = c3.current();
            let speed = head(&p.qdot).norm();
            assert!(speed <= prev_speed + 1e-12, "speed rose at step {}", n);
            prev_speed = speed;

            // Braking follows the velocity at the moment of stopping
            let offset = head(&p.q) - start;
            assert!((offset - dir * offset.dot(&dir)).norm() < 1e-9);
        }

        assert!(c3.is_approximately(&stop, 1e-9, 1e-9));
        assert!(c3.current_point().is_at_rest(1e-12, 1e-12));
    }

    #[test]
    fn test_moving_target() {
        let wp = Waypoint {
            r: Point::new(
                Vector6::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0),
                Vector6::new(0.2, 0.0, 0.0, 0.0, 0.0, 0.0),
            ),
            speed: 0.0,
            coordinated: true,
        };
        let mut c3 = C3Trajectory::new(Point::at_rest(Vector6::zeros()), limits());

        for n in 0..2000 {
            c3.update(DT, &wp, n as f64 * DT);
        }

        // Tracking the target at its speed
        let target_x = 1.0 + 0.2 * 1999.0 * DT;
        assert!((c3.current().q[0] - target_x).abs() < 0.01);
        assert!((c3.body_velocity()[0] - 0.2).abs() < 0.01);
    }
}
