//! # Telecommand processor module
//!
//! The telecommand processor handles TCs coming from the script and forwards them to the
//! trajectory generator or the kill switch.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};

// Internal
use comms_if::tc::Tc;
use traj_lib::{kill_switch::KillSwitch, tgen::EventSender};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
pub(crate) fn exec(tc: &Tc, events: &EventSender, kill_switch: &KillSwitch) {
    match tc {
        Tc::MoveTo(goal) => {
            let id = events.send_goal(goal.clone());
            info!(
                "Goal {} submitted: move to ({:.3}, {:.3}, {:.3})",
                id, goal.pose.position_m[0], goal.pose.position_m[1], goal.pose.position_m[2]
            );
        }
        Tc::Cancel => {
            debug!("Recieved Cancel command");
            events.cancel();
        }
        Tc::Kill => {
            debug!("Recieved Kill command");
            kill_switch.raise();
        }
        Tc::Unkill => {
            debug!("Recieved Unkill command");
            kill_switch.clear();
        }
        Tc::SetDisabled(d) => {
            debug!("Recieved SetDisabled({}) command", d);
            events.set_disabled(*d);
        }
    }
}
