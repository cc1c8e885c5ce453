//! Scenario tests for the trajectory generator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{Arc, Mutex};

use super::*;
use crate::{
    c3::{frames::head, LimitsParams},
    goal_mgr::GoalState,
    kill_switch::KillSwitch,
};
use comms_if::{
    eqpt::validity::{WaypointError, WaypointValidity},
    msg::{Odometry, Pose, Twist},
    tc::move_to::{GoalId, GoalOutcome, GoalResult, MoveToGoal},
};
use util::module::State;

// ---------------------------------------------------------------------------
// HELPERS
// ---------------------------------------------------------------------------

const TICK_S: f64 = 0.02;

fn params() -> Params {
    Params {
        fixed_frame: "map".into(),
        body_frame: "base_link".into(),
        limits: LimitsParams {
            vmin_b: [-1.0; 6],
            vmax_b: [1.0; 6],
            amin_b: [-0.5; 6],
            amax_b: [0.5; 6],
            arevoffset_b: [0.0; 3],
            umax_b: [10.0; 6],
        },
        traj_dt_s: 0.01,
        cycle_period_s: TICK_S,
        linear_tolerance_m: 0.01,
        angular_tolerance_rad: 0.01,
        kill_connect_timeout_s: 1.0,
    }
}

fn free(_: &Pose) -> Result<(), WaypointError> {
    Ok(())
}

fn odom(x: f64, y: f64, yaw: f64) -> Odometry {
    Odometry {
        frame_id: "map".into(),
        child_frame_id: "base_link".into(),
        pose: Pose::from_xyz_rpy(x, y, 0.0, 0.0, 0.0, yaw),
        twist: Twist::default(),
    }
}

fn goal_to(x: f64) -> MoveToGoal {
    MoveToGoal {
        pose: Pose::from_xyz_rpy(x, 0.0, 0.0, 0.0, 0.0, 0.0),
        twist: Twist::default(),
        speed_ms: 1.0,
        uncoordinated: false,
        linear_tolerance_m: None,
        angular_tolerance_rad: None,
    }
}

/// Drives a `TrajGen` at a fixed tick, recording every goal result.
struct Harness {
    tg: TrajGen,
    kill: KillSwitch,
    now_s: f64,
    results: Vec<GoalResult>,
}

impl Harness {
    fn new(gate: Box<dyn WaypointValidity>) -> Self {
        let kill = KillSwitch::new();
        let tg = TrajGen::new(params(), gate, Box::new(kill.clone())).unwrap();

        Self {
            tg,
            kill,
            now_s: 0.0,
            results: Vec::new(),
        }
    }

    /// A harness with the trajectory initialised at the origin.
    fn at_origin() -> Self {
        let mut h = Self::new(Box::new(free));
        h.tg.event_sender().send_odometry(odom(0.0, 0.0, 0.0));
        let (_, report) = h.tick();
        assert_eq!(report.state, GoalState::Idle);
        h
    }

    fn tick(&mut self) -> (OutputData, StatusReport) {
        let (output, report) = self
            .tg
            .proc(&InputData { now_s: self.now_s })
            .unwrap();
        self.now_s += TICK_S;
        self.results.extend(output.results.iter().copied());
        (output, report)
    }

    fn outcomes_of(&self, id: GoalId) -> Vec<GoalOutcome> {
        self.results
            .iter()
            .filter(|r| r.id == id)
            .map(|r| r.outcome)
            .collect()
    }

    fn x(output: &OutputData) -> f64 {
        output.point.unwrap().q[0]
    }

    fn speed(output: &OutputData) -> f64 {
        head(&output.point.unwrap().qdot).norm()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[test]
fn test_goal_succeeds_once() {
    let mut h = Harness::at_origin();
    let id = h.tg.event_sender().send_goal(goal_to(5.0));

    let mut successes = 0;
    let mut last = None;
    for _ in 0..1500 {
        let (output, report) = h.tick();
        if report.state == GoalState::Succeeded {
            successes += 1;
        }
        last = Some(output);
    }

    let last = last.unwrap();
    assert_eq!(successes, 1);
    assert_eq!(h.outcomes_of(id), vec![GoalOutcome::Succeeded]);
    assert!((Harness::x(&last) - 5.0).abs() < 0.01);
    assert!(Harness::speed(&last) < 1e-6);
    assert_eq!(h.tg.goal_mgr().state(), GoalState::Idle);
}

#[test]
fn test_output_stamped_with_sim_time() {
    let mut h = Harness::at_origin();
    h.tg.event_sender().send_goal(goal_to(1.0));

    for _ in 0..10 {
        let (output, report) = h.tick();
        let sim_time_s = report.sim_time_s.unwrap();

        assert_eq!(output.trajectory.as_ref().unwrap().stamp_s, sim_time_s);
        assert_eq!(output.waypoint.as_ref().unwrap().stamp_s, sim_time_s);
        assert_eq!(output.trajectory.unwrap().frame_id, "map");

        // The trajectory never runs ahead of the loop, and lags it by less than one sub-step
        let loop_time_s = h.now_s - TICK_S;
        assert!(sim_time_s <= loop_time_s + 1e-9);
        assert!(loop_time_s - sim_time_s < 0.01 + 1e-9);
    }

    assert_eq!(h.tg.cycle_period_s(), TICK_S);
}

#[test]
fn test_cancel_brakes_monotonically() {
    let mut h = Harness::at_origin();
    let id = h.tg.event_sender().send_goal(goal_to(5.0));

    let mut cancelled = false;
    let mut prev_speed = f64::INFINITY;
    let mut final_x = 0.0;

    for _ in 0..1500 {
        let (output, _) = h.tick();
        let x = Harness::x(&output);
        let speed = Harness::speed(&output);

        if cancelled {
            assert!(speed <= prev_speed + 1e-9, "speed rose from {} to {}", prev_speed, speed);
            prev_speed = speed;
        }
        else if x >= 2.0 {
            assert!(speed > 0.5);
            h.tg.event_sender().cancel();
            cancelled = true;
            prev_speed = speed;
        }

        final_x = x;
    }

    assert!(cancelled);
    assert!(prev_speed < 1e-9);
    assert!(final_x > 2.0 && final_x < 5.0, "stopped at {}", final_x);
    assert_eq!(h.outcomes_of(id), vec![GoalOutcome::Cancelled]);
}

#[test]
fn test_cancel_while_turning_brakes_monotonically() {
    let mut h = Harness::at_origin();
    let mut goal = goal_to(5.0);
    goal.pose = Pose::from_xyz_rpy(5.0, 0.0, 0.0, 0.0, 0.0, 3.0);
    let id = h.tg.event_sender().send_goal(goal);

    let mut cancelled = false;
    let mut prev_speed = f64::INFINITY;
    let mut final_point = None;

    for _ in 0..1500 {
        let (output, _) = h.tick();
        let point = output.point.unwrap();
        let speed = Harness::speed(&output);

        if cancelled {
            assert!(speed <= prev_speed + 1e-9, "speed rose from {} to {}", prev_speed, speed);
            prev_speed = speed;
        }
        else if point.q[0] >= 2.0 {
            assert!(point.qdot[5].abs() > 0.1, "not turning at the cancel");
            h.tg.event_sender().cancel();
            cancelled = true;
            prev_speed = speed;
        }

        final_point = Some(point);
    }

    let final_point = final_point.unwrap();
    assert!(cancelled);
    assert!(prev_speed < 1e-9);
    assert!(final_point.qdot.norm() < 1e-9);
    assert!(final_point.q[0] > 2.0 && final_point.q[0] < 5.0);
    assert!(final_point.q[1].abs() < 1e-6, "left the line to {}", final_point.q[1]);
    assert_eq!(h.outcomes_of(id), vec![GoalOutcome::Cancelled]);
}

#[test]
fn test_newer_goal_preempts() {
    let mut h = Harness::at_origin();
    let first = h.tg.event_sender().send_goal(goal_to(5.0));
    for _ in 0..20 {
        h.tick();
    }

    let second = h.tg.event_sender().send_goal(goal_to(0.5));
    for _ in 0..1500 {
        h.tick();
    }

    assert_eq!(h.outcomes_of(first), vec![GoalOutcome::Cancelled]);
    assert_eq!(h.outcomes_of(second), vec![GoalOutcome::Succeeded]);
}

#[test]
fn test_goals_folded_within_a_tick() {
    let mut h = Harness::at_origin();
    let events = h.tg.event_sender();

    let first = events.send_goal(goal_to(5.0));
    let second = events.send_goal(goal_to(3.0));
    h.tick();

    assert_eq!(h.outcomes_of(first), vec![GoalOutcome::Cancelled]);
    assert_eq!(h.tg.goal_mgr().active_goal(), Some(second));
    assert_eq!(h.tg.goal_mgr().commanded().unwrap().waypoint.r.q[0], 3.0);

    // A goal followed by a cancel within one tick never runs
    let third = events.send_goal(goal_to(4.0));
    events.cancel();
    let (_, report) = h.tick();

    assert_eq!(h.outcomes_of(second), vec![GoalOutcome::Cancelled]);
    assert_eq!(h.outcomes_of(third), vec![GoalOutcome::Cancelled]);
    assert_eq!(report.state, GoalState::Idle);
}

#[test]
fn test_rollback_on_occupied_trajectory() {
    let threshold = Arc::new(Mutex::new(f64::INFINITY));
    let gate_threshold = threshold.clone();
    let gate = move |pose: &Pose| -> Result<(), WaypointError> {
        if pose.position_m[0] > *gate_threshold.lock().unwrap() {
            Err(WaypointError::Occupied)
        }
        else {
            Ok(())
        }
    };

    let mut h = Harness::new(Box::new(gate));
    h.tg.event_sender().send_odometry(odom(0.0, 0.0, 0.0));
    h.tick();
    let id = h.tg.event_sender().send_goal(goal_to(5.0));

    let mut prev = None;
    loop {
        let (output, report) = h.tick();
        assert!(!report.rolled_back);
        if Harness::x(&output) >= 1.5 {
            prev = output.point;
            break;
        }
        assert!(h.now_s < 30.0);
    }
    let prev = prev.unwrap();

    // Make everything just beyond the current point occupied
    *threshold.lock().unwrap() = prev.q[0] + 1e-3;

    let (output, report) = h.tick();
    assert!(report.rolled_back);
    assert_eq!(report.state, GoalState::Idle);
    assert_eq!(h.outcomes_of(id), vec![GoalOutcome::Aborted]);

    let commanded = h.tg.goal_mgr().commanded().unwrap().waypoint.r;
    assert_eq!(commanded.q, prev.q);
    assert_eq!(commanded.qdot, nalgebra::Vector6::zeros());
    assert_eq!(output.point.unwrap().q, prev.q);

    let (output, report) = h.tick();
    assert!(!report.rolled_back);
    assert_eq!(output.point.unwrap().qdot, nalgebra::Vector6::zeros());
    assert_eq!(Harness::x(&output), prev.q[0]);
}

#[test]
fn test_kill_and_reinitialise() {
    let mut h = Harness::at_origin();
    let events = h.tg.event_sender();
    let id = events.send_goal(goal_to(5.0));
    for _ in 0..50 {
        h.tick();
    }

    h.kill.raise();
    let (output, report) = h.tick();
    assert!(report.killed);
    assert_eq!(report.state, GoalState::Uninitialized);
    assert!(output.trajectory.is_none());
    assert!(output.point.is_none());
    assert_eq!(h.outcomes_of(id), vec![GoalOutcome::Aborted]);

    // Odometry is ignored while killed, goals rejected
    events.send_odometry(odom(1.0, 1.0, 0.0));
    let rejected = events.send_goal(goal_to(2.0));
    let (output, report) = h.tick();
    assert!(output.trajectory.is_none());
    assert!(report.goal_rejected);
    assert_eq!(h.outcomes_of(rejected), vec![GoalOutcome::Rejected]);

    // Re-initialised at the vehicle's pose after the kill clears
    h.kill.clear();
    events.send_odometry(odom(1.2, 3.0, 0.5));
    let (output, report) = h.tick();
    assert!(!report.killed);
    assert_eq!(report.state, GoalState::Idle);

    let q = output.point.unwrap().q;
    assert!((q[0] - 1.2).abs() < 1e-9);
    assert!((q[1] - 3.0).abs() < 1e-9);
    assert!((q[5] - 0.5).abs() < 1e-9);
}

#[test]
fn test_kill_edge_between_ticks() {
    let mut h = Harness::at_origin();

    // Raised and cleared before the tick sees the monitor, the edge still counts
    h.kill.raise();
    h.kill.clear();
    let (_, report) = h.tick();
    assert!(report.killed);
    assert_eq!(report.state, GoalState::Uninitialized);

    let (_, report) = h.tick();
    assert!(!report.killed);
}

#[test]
fn test_disable() {
    let mut h = Harness::at_origin();
    let events = h.tg.event_sender();
    let id = events.send_goal(goal_to(5.0));
    h.tick();

    events.set_disabled(true);
    let (output, report) = h.tick();
    assert!(report.disabled);
    assert!(output.trajectory.is_none());
    assert_eq!(h.outcomes_of(id), vec![GoalOutcome::Aborted]);

    // Stays disabled without further commands
    events.send_odometry(odom(0.0, 0.0, 0.0));
    let (_, report) = h.tick();
    assert!(report.disabled);
    assert_eq!(report.state, GoalState::Uninitialized);

    events.set_disabled(false);
    events.send_odometry(odom(0.0, 0.0, 0.0));
    let (_, report) = h.tick();
    assert!(!report.disabled);
    assert_eq!(report.state, GoalState::Idle);
}

#[test]
fn test_goal_before_odometry_rejected() {
    let mut h = Harness::new(Box::new(free));
    let id = h.tg.event_sender().send_goal(goal_to(1.0));

    let (output, report) = h.tick();
    assert!(report.goal_rejected);
    assert!(output.trajectory.is_none());
    assert_eq!(h.outcomes_of(id), vec![GoalOutcome::Rejected]);
}

#[test]
fn test_construction_errors() {
    let unreachable = TrajGen::new(params(), Box::new(free), Box::new(KillSwitch::unreachable()));
    assert!(matches!(unreachable, Err(TrajGenError::KillMonitor(_))));

    let mut bad_dt = params();
    bad_dt.traj_dt_s = 0.0;
    assert!(matches!(
        TrajGen::new(bad_dt, Box::new(free), Box::new(KillSwitch::new())),
        Err(TrajGenError::InvalidParam("traj_dt_s", _))
    ));

    let mut bad_limits = params();
    bad_limits.limits.vmin_b[2] = 2.0;
    assert!(matches!(
        TrajGen::new(bad_limits, Box::new(free), Box::new(KillSwitch::new())),
        Err(TrajGenError::InvalidLimits(_))
    ));

    let mut no_frame = params();
    no_frame.body_frame.clear();
    assert!(matches!(
        TrajGen::new(no_frame, Box::new(free), Box::new(KillSwitch::new())),
        Err(TrajGenError::MissingFrame("body_frame"))
    ));
}

#[test]
fn test_time_must_not_go_backwards() {
    let mut h = Harness::at_origin();
    h.tick();

    assert!(matches!(
        h.tg.proc(&InputData { now_s: 0.0 }),
        Err(TrajGenError::InvalidTime(_))
    ));
    assert!(matches!(
        h.tg.proc(&InputData { now_s: f64::NAN }),
        Err(TrajGenError::InvalidTime(_))
    ));
}
