//! # Goal lifecycle manager
//!
//! Owns the trajectory being generated and the waypoint it is chasing, and moves goals through
//! their lifecycle:
//!
//! ```text
//! Uninitialized --odometry--> Idle --goal--> Tracking --tolerance--> Succeeded --next tick--> Idle
//!                                             |
//!                                             +--cancel--> Preempting --same tick--> Idle
//! ```
//!
//! Killing or disabling motion from any state destroys the trajectory and returns to
//! `Uninitialized`. All goal outcomes are pushed into the `results` vector passed to each
//! operation, at most one result is ever produced per goal.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod policy;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, error, info, trace, warn};
use nalgebra::Vector6;
use serde::Serialize;

// Internal
use crate::c3::{point_from_pose_twist, pose_from_q, C3Trajectory, Limits, Point, Waypoint};
use comms_if::{
    eqpt::validity::{WaypointError, WaypointValidity},
    msg::Odometry,
    tc::move_to::{GoalId, GoalOutcome, GoalResult, MoveToGoal},
};
use policy::Admission;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Goal tolerances are never tighter than this.
pub const MIN_TOLERANCE: f64 = 1e-3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The integrator and the simulation time it has been advanced to.
#[derive(Debug, Clone)]
pub struct TrajectoryState {
    pub c3: C3Trajectory,
    pub time_s: f64,
}

/// The waypoint being chased and the simulation time it was commanded at.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CommandedWaypoint {
    pub waypoint: Waypoint,
    pub set_time_s: f64,
}

/// Parameters of the goal manager.
#[derive(Debug, Copy, Clone)]
pub struct GoalMgrParams {
    pub limits: Limits,

    /// Fixed integration step
    pub dt_s: f64,

    /// Default tolerances for goals which don't give their own
    pub linear_tolerance_m: f64,
    pub angular_tolerance_rad: f64,
}

#[derive(Debug, Copy, Clone)]
struct ActiveGoal {
    id: GoalId,
    linear_tolerance_m: f64,
    angular_tolerance_rad: f64,
}

pub struct GoalMgr {
    params: GoalMgrParams,
    state: GoalState,
    traj: Option<TrajectoryState>,
    commanded: Option<CommandedWaypoint>,
    active: Option<ActiveGoal>,

    /// Trajectory point at the end of the previous tick, the rollback target
    last_good: Option<Point>,

    /// Set while the trajectory is at rest inside a region the gate reports as occupied
    holding_in_occupied: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum GoalState {
    /// No trajectory, waiting for odometry
    Uninitialized,

    /// Holding the commanded waypoint with no goal active
    Idle,

    /// Chasing an accepted goal
    Tracking,

    /// A cancelled goal is being brought to a stop
    Preempting,

    /// The active goal was reached this tick
    Succeeded,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryState {
    /// Advance one fixed step toward the commanded waypoint.
    pub fn advance(&mut self, dt: f64, commanded: &CommandedWaypoint) {
        let age_s = self.time_s - commanded.set_time_s;
        self.c3.update(dt, &commanded.waypoint, age_s);
        self.time_s += dt;
    }
}

impl GoalMgr {
    pub fn new(params: GoalMgrParams) -> Self {
        Self {
            params,
            state: GoalState::Uninitialized,
            traj: None,
            commanded: None,
            active: None,
            last_good: None,
            holding_in_occupied: false,
        }
    }

    pub fn state(&self) -> GoalState {
        self.state
    }

    pub fn trajectory(&self) -> Option<&TrajectoryState> {
        self.traj.as_ref()
    }

    pub fn commanded(&self) -> Option<&CommandedWaypoint> {
        self.commanded.as_ref()
    }

    pub fn active_goal(&self) -> Option<GoalId> {
        self.active.map(|g| g.id)
    }

    pub fn is_initialised(&self) -> bool {
        self.traj.is_some()
    }

    /// Clear the single-tick `Succeeded` state.
    pub fn begin_tick(&mut self) {
        if self.state == GoalState::Succeeded {
            self.state = GoalState::Idle;
        }
    }

    /// Create the trajectory at the vehicle's pose.
    ///
    /// The vehicle is assumed level and at rest, so roll, pitch and all rates are zeroed. Does
    /// nothing if the trajectory already exists.
    pub fn init_from_odometry(&mut self, odom: &Odometry, now_s: f64) {
        if self.traj.is_some() {
            trace!("Trajectory already initialised, ignoring odometry");
            return;
        }

        let mut q = point_from_pose_twist(&odom.pose, &odom.twist).q;
        q[3] = 0.0;
        q[4] = 0.0;
        let start = Point::at_rest(q);

        self.traj = Some(TrajectoryState {
            c3: C3Trajectory::new(start, self.params.limits),
            time_s: now_s,
        });
        self.commanded = Some(CommandedWaypoint {
            waypoint: Waypoint::from(start),
            set_time_s: now_s,
        });
        self.last_good = Some(start);
        self.state = GoalState::Idle;

        info!(
            "Trajectory initialised at ({:.3}, {:.3}, {:.3}) yaw {:.3} rad",
            q[0], q[1], q[2], q[5]
        );
    }

    /// Offer a new goal, which replaces any active goal if accepted.
    ///
    /// Returns true if the goal was accepted.
    pub fn accept_goal(
        &mut self,
        id: GoalId,
        goal: &MoveToGoal,
        gate: &dyn WaypointValidity,
        results: &mut Vec<GoalResult>,
    ) -> bool {
        let (traj, commanded) = match (self.traj.as_ref(), self.commanded.as_ref()) {
            (Some(t), Some(c)) => (t, c),
            _ => {
                warn!("Goal {} rejected, no trajectory has been initialised", id);
                results.push(GoalResult::new(id, GoalOutcome::Rejected));
                return false;
            }
        };

        let r = point_from_pose_twist(&goal.pose, &goal.twist);

        match policy::admit(gate.check(&goal.pose), &commanded.waypoint.r, &r) {
            Admission::Accept => (),
            Admission::AcceptUnknown => warn!(
                "Goal {} is in an unknown region but close to the last waypoint, accepting it",
                id
            ),
            Admission::Reject(e) => {
                match e {
                    WaypointError::Occupied => {
                        error!("Goal {} rejected, the goal pose is occupied", id)
                    }
                    WaypointError::Unknown => error!(
                        "Goal {} rejected, the goal pose is in an unknown region too far from the \
                        last waypoint",
                        id
                    ),
                }
                results.push(GoalResult::new(id, GoalOutcome::Rejected));
                return false;
            }
        }

        let set_time_s = traj.time_s;

        if let Some(prev) = self.active.take() {
            info!("Goal {} preempted by goal {}", prev.id, id);
            results.push(GoalResult::new(prev.id, GoalOutcome::Cancelled));
        }

        self.commanded = Some(CommandedWaypoint {
            waypoint: Waypoint {
                r,
                speed: goal.speed_ms,
                coordinated: !goal.uncoordinated,
            },
            set_time_s,
        });
        self.active = Some(ActiveGoal {
            id,
            linear_tolerance_m: goal
                .linear_tolerance_m
                .unwrap_or(self.params.linear_tolerance_m)
                .max(MIN_TOLERANCE),
            angular_tolerance_rad: goal
                .angular_tolerance_rad
                .unwrap_or(self.params.angular_tolerance_rad)
                .max(MIN_TOLERANCE),
        });
        self.state = GoalState::Tracking;

        info!(
            "Goal {} accepted: ({:.3}, {:.3}, {:.3}) yaw {:.3} rad",
            id, r.q[0], r.q[1], r.q[2], r.q[5]
        );

        true
    }

    /// Cancel the active goal, bringing the trajectory to a stop as fast as the limits allow.
    pub fn cancel(&mut self, results: &mut Vec<GoalResult>) {
        let goal = match self.active {
            Some(g) if self.state == GoalState::Tracking => g,
            _ => {
                debug!("Cancel requested with no active goal");
                return;
            }
        };

        let traj = match self.traj.as_mut() {
            Some(t) => t,
            None => return,
        };

        self.state = GoalState::Preempting;

        let stop = traj.c3.stopping_point(self.params.dt_s);
        self.commanded = Some(CommandedWaypoint {
            waypoint: Waypoint {
                r: stop,
                speed: 0.0,
                coordinated: false,
            },
            set_time_s: traj.time_s,
        });
        let current = traj.c3.current_point();
        traj.c3.reset(current);

        info!(
            "Goal {} cancelled, stopping at ({:.3}, {:.3}, {:.3})",
            goal.id, stop.q[0], stop.q[1], stop.q[2]
        );
        results.push(GoalResult::new(goal.id, GoalOutcome::Cancelled));

        self.active = None;
        self.state = GoalState::Idle;
    }

    /// Destroy the trajectory, aborting any active goal.
    pub fn kill(&mut self, results: &mut Vec<GoalResult>) {
        if let Some(goal) = self.active.take() {
            warn!("Goal {} aborted, motion stopped", goal.id);
            results.push(GoalResult::new(goal.id, GoalOutcome::Aborted));
        }

        if self.traj.is_some() {
            warn!("Trajectory destroyed");
        }

        self.traj = None;
        self.commanded = None;
        self.last_good = None;
        self.holding_in_occupied = false;
        self.state = GoalState::Uninitialized;
    }

    /// Step the trajectory until it is within one step of `now_s`.
    ///
    /// Returns the number of steps taken.
    pub fn advance(&mut self, now_s: f64) -> usize {
        let dt = self.params.dt_s;
        let (traj, commanded) = match (self.traj.as_mut(), self.commanded.as_ref()) {
            (Some(t), Some(c)) => (t, c),
            _ => return 0,
        };

        self.last_good = Some(traj.c3.current_point());

        let mut num_steps = 0;
        while traj.time_s + dt < now_s {
            traj.advance(dt, commanded);
            num_steps += 1;
        }

        num_steps
    }

    /// Check the freshly advanced trajectory point against the gate, rolling back to the last
    /// point of the previous tick if it is occupied.
    ///
    /// A trajectory already at rest on that point has nothing to undo. It keeps holding and the
    /// occupied region is only reported the first time.
    ///
    /// Returns true if the trajectory was rolled back.
    pub fn check_trajectory(
        &mut self,
        gate: &dyn WaypointValidity,
        results: &mut Vec<GoalResult>,
    ) -> bool {
        let traj = match self.traj.as_mut() {
            Some(t) => t,
            None => return false,
        };

        let pose = pose_from_q(&traj.c3.current().q);
        match gate.check(&pose) {
            Err(WaypointError::Occupied) => (),
            _ => {
                self.holding_in_occupied = false;
                return false;
            }
        }

        let current = traj.c3.current_point();
        let rollback = match self.last_good {
            Some(p) => p.stopped(),
            None => current.stopped(),
        };

        if current == rollback && self.active.is_none() {
            if !self.holding_in_occupied {
                warn!(
                    "Holding at rest at ({:.3}, {:.3}, {:.3}) inside an occupied region",
                    current.q[0], current.q[1], current.q[2]
                );
                self.holding_in_occupied = true;
            }
            return false;
        }

        error!(
            "Trajectory entered an occupied region, rolling back to ({:.3}, {:.3}, {:.3})",
            rollback.q[0], rollback.q[1], rollback.q[2]
        );

        traj.c3.reset(rollback);
        self.commanded = Some(CommandedWaypoint {
            waypoint: Waypoint::from(rollback),
            set_time_s: traj.time_s,
        });

        if let Some(goal) = self.active.take() {
            results.push(GoalResult::new(goal.id, GoalOutcome::Aborted));
        }
        self.state = GoalState::Idle;

        true
    }

    /// Report success if the trajectory has come to rest at the active goal.
    ///
    /// Returns true if the goal succeeded this call.
    pub fn check_success(&mut self, results: &mut Vec<GoalResult>) -> bool {
        let goal = match self.active {
            Some(g) if self.state == GoalState::Tracking => g,
            _ => return false,
        };
        let (traj, commanded) = match (self.traj.as_ref(), self.commanded.as_ref()) {
            (Some(t), Some(c)) => (t, c),
            _ => return false,
        };

        let target = &commanded.waypoint.r;
        let reached = traj.c3.is_approximately(
            target,
            goal.linear_tolerance_m,
            goal.angular_tolerance_rad,
        ) && target.qdot == Vector6::zeros()
            && traj
                .c3
                .current_point()
                .is_at_rest(goal.linear_tolerance_m, goal.angular_tolerance_rad);

        if !reached {
            return false;
        }

        info!("Goal {} succeeded", goal.id);
        results.push(GoalResult::new(goal.id, GoalOutcome::Succeeded));
        self.active = None;
        self.state = GoalState::Succeeded;

        true
    }
}
