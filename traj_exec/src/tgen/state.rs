//! Implementations for the TrajGen state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use serde::Serialize;
use std::{
    sync::mpsc::{channel, Receiver},
    time::Duration,
};

// Internal
use super::{EventSender, Params, PendingEvents, TrajEvent, TrajGenError};
use crate::{
    c3::{pose_from_q, pose_twist_from_point, BodyFrame, PointWithAcceleration},
    goal_mgr::{GoalMgr, GoalMgrParams, GoalState},
};
use comms_if::{
    eqpt::{kill::KillMonitor, validity::WaypointValidity},
    msg::{Odometry, PoseStamped, PoseTwistStamped},
    tc::move_to::{GoalOutcome, GoalResult},
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Trajectory generator module state
pub struct TrajGen {
    params: Params,

    goal_mgr: GoalMgr,

    gate: Box<dyn WaypointValidity>,
    kill_monitor: Box<dyn KillMonitor>,

    events: EventSender,
    receiver: Receiver<TrajEvent>,

    disabled: bool,
    last_now_s: Option<f64>,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) output: OutputData,
    arch_traj: Archiver,
}

/// Input data to TrajGen.
#[derive(Debug, Default, Copy, Clone)]
pub struct InputData {
    /// Current time of the control loop.
    ///
    /// Units: seconds
    pub now_s: f64,
}

/// Output of one TrajGen cycle, stamped with the trajectory's simulation time.
#[derive(Debug, Default, Clone)]
pub struct OutputData {
    /// The current trajectory point, or `None` while uninitialised
    pub trajectory: Option<PoseTwistStamped>,

    /// The pose of the waypoint being chased
    pub waypoint: Option<PoseStamped>,

    /// The current trajectory point in generalised coordinates
    pub point: Option<PointWithAcceleration>,

    /// Goals which finished this cycle
    pub results: Vec<GoalResult>,
}

/// Status report for TrajGen processing.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct StatusReport {
    pub state: GoalState,
    pub killed: bool,
    pub disabled: bool,
    pub num_substeps: usize,
    pub goal_rejected: bool,
    pub rolled_back: bool,
    pub sim_time_s: Option<f64>,
}

/// Flattened trajectory archive record.
#[derive(Serialize)]
struct TrajRecord {
    now_s: f64,
    sim_time_s: f64,
    x_m: f64,
    y_m: f64,
    z_m: f64,
    roll_rad: f64,
    pitch_rad: f64,
    yaw_rad: f64,
    vx_ms: f64,
    vy_ms: f64,
    vz_ms: f64,
    wx_rads: f64,
    wy_rads: f64,
    wz_rads: f64,
    wp_x_m: f64,
    wp_y_m: f64,
    wp_z_m: f64,
    wp_yaw_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for StatusReport {
    fn default() -> Self {
        Self {
            state: GoalState::Uninitialized,
            killed: false,
            disabled: false,
            num_substeps: 0,
            goal_rejected: false,
            rolled_back: false,
            sim_time_s: None,
        }
    }
}

impl TrajGen {
    /// Create a new trajectory generator.
    ///
    /// Fails if the parameters are invalid or the kill monitor does not connect within
    /// `kill_connect_timeout_s`.
    pub fn new(
        params: Params,
        gate: Box<dyn WaypointValidity>,
        mut kill_monitor: Box<dyn KillMonitor>,
    ) -> Result<Self, TrajGenError> {
        params.validate()?;
        let limits = params
            .limits
            .into_limits()
            .map_err(TrajGenError::InvalidLimits)?;

        kill_monitor
            .connect(Duration::from_secs_f64(params.kill_connect_timeout_s))
            .map_err(TrajGenError::KillMonitor)?;

        let (sender, receiver) = channel();
        let events = EventSender::new(sender);

        let kill_events = events.clone();
        kill_monitor.add_raise_callback(Box::new(move || kill_events.kill_raised()));

        let goal_mgr = GoalMgr::new(GoalMgrParams {
            limits,
            dt_s: params.traj_dt_s,
            linear_tolerance_m: params.linear_tolerance_m,
            angular_tolerance_rad: params.angular_tolerance_rad,
        });

        info!(
            "TrajGen created, trajectory in {} for body {}, sub-step {} s",
            params.fixed_frame, params.body_frame, params.traj_dt_s
        );

        Ok(Self {
            params,
            goal_mgr,
            gate,
            kill_monitor,
            events,
            receiver,
            disabled: false,
            last_now_s: None,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
            output: OutputData::default(),
            arch_traj: Archiver::default(),
        })
    }

    /// Get a handle for sending odometry, goals and commands to the generator.
    pub fn event_sender(&self) -> EventSender {
        self.events.clone()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn goal_mgr(&self) -> &GoalMgr {
        &self.goal_mgr
    }

    fn check_odometry_frames(&self, odom: &Odometry) {
        if odom.frame_id != self.params.fixed_frame {
            warn!(
                "Odometry is in frame {} but the trajectory is in {}",
                odom.frame_id, self.params.fixed_frame
            );
        }
        if odom.child_frame_id != self.params.body_frame {
            warn!(
                "Odometry is for body {} but the trajectory is for {}",
                odom.child_frame_id, self.params.body_frame
            );
        }
    }

    fn build_output(&self, results: Vec<GoalResult>) -> OutputData {
        let traj = self.goal_mgr.trajectory();

        OutputData {
            trajectory: traj.map(|t| PoseTwistStamped {
                stamp_s: t.time_s,
                frame_id: self.params.fixed_frame.clone(),
                posetwist: pose_twist_from_point(&t.c3.current()),
            }),
            waypoint: match (traj, self.goal_mgr.commanded()) {
                (Some(t), Some(c)) => Some(PoseStamped {
                    stamp_s: t.time_s,
                    frame_id: self.params.fixed_frame.clone(),
                    pose: pose_from_q(&c.waypoint.r.q),
                }),
                _ => None,
            },
            point: traj.map(|t| t.c3.current()),
            results,
        }
    }

    fn traj_record(&self) -> Option<TrajRecord> {
        let now_s = self.last_now_s?;
        let traj = self.goal_mgr.trajectory()?;
        let wp = self.goal_mgr.commanded()?.waypoint.r.q;

        let p = traj.c3.current();
        let v_b = BodyFrame::at(&p.q).to_body(&p.qdot);

        Some(TrajRecord {
            now_s,
            sim_time_s: traj.time_s,
            x_m: p.q[0],
            y_m: p.q[1],
            z_m: p.q[2],
            roll_rad: p.q[3],
            pitch_rad: p.q[4],
            yaw_rad: p.q[5],
            vx_ms: v_b[0],
            vy_ms: v_b[1],
            vz_ms: v_b[2],
            wx_rads: v_b[3],
            wy_rads: v_b[4],
            wz_rads: v_b[5],
            wp_x_m: wp[0],
            wp_y_m: wp[1],
            wp_z_m: wp[2],
            wp_yaw_rad: wp[5],
        })
    }
}

impl State for TrajGen {
    type InitData = ();
    type InitError = ArchiveError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = TrajGenError;

    /// Initialise the TrajGen archives.
    ///
    /// Parameters are given to `TrajGen::new`, so no init data is needed.
    fn init(&mut self, _init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        self.arch_report = Archiver::from_path(session, "traj_gen/status_report.csv")?;
        self.arch_traj = Archiver::from_path(session, "traj_gen/trajectory.csv")?;

        Ok(())
    }

    fn cycle_period_s(&self) -> f64 {
        self.params.cycle_period_s
    }

    /// Perform one control cycle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let now_s = input_data.now_s;
        if !now_s.is_finite() || self.last_now_s.map_or(false, |t| now_s < t) {
            return Err(TrajGenError::InvalidTime(now_s));
        }
        self.last_now_s = Some(now_s);

        self.goal_mgr.begin_tick();

        let mut report = StatusReport::default();
        let mut results = Vec::new();

        let pending = PendingEvents::drain(&self.receiver);

        for id in pending.superseded.iter() {
            info!("Goal {} superseded before it was processed", id);
            results.push(GoalResult::new(*id, GoalOutcome::Cancelled));
        }

        if let Some(disabled) = pending.disabled {
            if disabled != self.disabled {
                info!("Motion {}", if disabled { "disabled" } else { "enabled" });
            }
            self.disabled = disabled;
        }

        let killed = pending.kill_raised || self.kill_monitor.is_raised();
        report.killed = killed;
        report.disabled = self.disabled;

        if killed || self.disabled {
            self.goal_mgr.kill(&mut results);

            if let Some((id, _)) = pending.goal {
                warn!(
                    "Goal {} rejected, motion is {}",
                    id,
                    if killed { "killed" } else { "disabled" }
                );
                results.push(GoalResult::new(id, GoalOutcome::Rejected));
                report.goal_rejected = true;
            }
        }
        else {
            if let Some(ref odom) = pending.odometry {
                if !self.goal_mgr.is_initialised() {
                    self.check_odometry_frames(odom);
                }
                self.goal_mgr.init_from_odometry(odom, now_s);
            }

            if pending.cancel_before_goal {
                self.goal_mgr.cancel(&mut results);
            }

            if let Some((id, ref goal)) = pending.goal {
                if !self.goal_mgr.accept_goal(id, goal, &*self.gate, &mut results) {
                    report.goal_rejected = true;
                }
            }

            if pending.cancel_after_goal {
                self.goal_mgr.cancel(&mut results);
            }

            report.num_substeps = self.goal_mgr.advance(now_s);
            report.rolled_back = self.goal_mgr.check_trajectory(&*self.gate, &mut results);

            if !report.rolled_back {
                self.goal_mgr.check_success(&mut results);
            }
        }

        report.state = self.goal_mgr.state();
        report.sim_time_s = self.goal_mgr.trajectory().map(|t| t.time_s);

        trace!("TrajGen status: {:?}", report);

        let output = self.build_output(results);

        self.report = report;
        self.output = output.clone();

        Ok((output, report))
    }
}

impl Archived for TrajGen {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)?;

        if let Some(record) = self.traj_record() {
            self.arch_traj.serialise(record)?;
        }

        Ok(())
    }
}
