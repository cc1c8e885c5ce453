//! # Event intake
//!
//! Odometry, goals, cancellations and kill edges arrive asynchronously. Producers send them
//! through an `EventSender`, and the trajectory generator drains and folds them at the start of
//! each tick, so nothing outside the tick ever touches the trajectory.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{trace, warn};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    mpsc::{Receiver, Sender, TryRecvError},
    Arc, Mutex,
};

use comms_if::{
    msg::Odometry,
    tc::move_to::{GoalId, MoveToGoal},
};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum TrajEvent {
    Odometry(Odometry),
    Goal(GoalId, MoveToGoal),
    Cancel,
    KillRaised,
    SetDisabled(bool),
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Cloneable handle used to send events to the trajectory generator from any thread.
#[derive(Clone)]
pub struct EventSender {
    sender: Arc<Mutex<Sender<TrajEvent>>>,
    next_goal_id: Arc<AtomicU64>,
}

/// All events received since the last tick, folded together.
#[derive(Debug, Default)]
pub struct PendingEvents {
    /// Latest odometry sample
    pub odometry: Option<Odometry>,

    /// Latest goal
    pub goal: Option<(GoalId, MoveToGoal)>,

    /// Goals replaced by a later goal before they could be processed
    pub superseded: Vec<GoalId>,

    /// A cancel arrived before the pending goal (or there is no pending goal)
    pub cancel_before_goal: bool,

    /// A cancel arrived after the pending goal
    pub cancel_after_goal: bool,

    /// The kill signal was raised at some point since the last tick
    pub kill_raised: bool,

    /// Latest requested disabled state
    pub disabled: Option<bool>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl EventSender {
    pub(crate) fn new(sender: Sender<TrajEvent>) -> Self {
        Self {
            sender: Arc::new(Mutex::new(sender)),
            next_goal_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn send_odometry(&self, odometry: Odometry) {
        self.send(TrajEvent::Odometry(odometry))
    }

    /// Submit a goal, returning the ID its result will be reported under.
    pub fn send_goal(&self, goal: MoveToGoal) -> GoalId {
        let id = self.next_goal_id.fetch_add(1, Ordering::Relaxed);
        self.send(TrajEvent::Goal(id, goal));
        id
    }

    pub fn cancel(&self) {
        self.send(TrajEvent::Cancel)
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.send(TrajEvent::SetDisabled(disabled))
    }

    /// Notify the generator of a kill raise. Safe to call from the kill monitor's callback.
    pub fn kill_raised(&self) {
        self.send(TrajEvent::KillRaised)
    }

    fn send(&self, event: TrajEvent) {
        let sender = match self.sender.lock() {
            Ok(s) => s,
            Err(_) => {
                warn!("Event sender lock poisoned, dropping {:?}", event);
                return;
            }
        };

        if sender.send(event).is_err() {
            warn!("Trajectory generator has stopped, event dropped");
        }
    }
}

impl PendingEvents {
    /// Take every event currently queued.
    pub fn drain(receiver: &Receiver<TrajEvent>) -> Self {
        let mut pending = Self::default();

        loop {
            match receiver.try_recv() {
                Ok(event) => pending.fold(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        pending
    }

    fn fold(&mut self, event: TrajEvent) {
        trace!("Folding event {:?}", event);

        match event {
            TrajEvent::Odometry(o) => self.odometry = Some(o),
            TrajEvent::Goal(id, goal) => {
                if let Some((old_id, _)) = self.goal.take() {
                    self.superseded.push(old_id);
                }
                self.cancel_after_goal = false;
                self.goal = Some((id, goal));
            }
            TrajEvent::Cancel => {
                if self.goal.is_some() {
                    self.cancel_after_goal = true;
                }
                else {
                    self.cancel_before_goal = true;
                }
            }
            // Odometry from before motion stopped must not re-initialise the trajectory
            TrajEvent::KillRaised => {
                self.kill_raised = true;
                self.odometry = None;
            }
            TrajEvent::SetDisabled(disabled) => {
                if disabled {
                    self.odometry = None;
                }
                self.disabled = Some(disabled);
            }
        }
    }
}
