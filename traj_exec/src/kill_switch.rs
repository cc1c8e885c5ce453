//! # Kill switch
//!
//! An in-process kill monitor. The executable raises and clears it from telecommands, tests raise
//! it directly. Clones share the same switch.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, warn};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use comms_if::eqpt::kill::{KillMonitor, KillMonitorError, RaiseCallback};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Clone)]
pub struct KillSwitch {
    shared: Arc<Shared>,
}

struct Shared {
    raised: AtomicBool,

    /// False for a switch standing in for a source which never answers
    reachable: bool,

    callbacks: Mutex<Vec<RaiseCallback>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl KillSwitch {
    pub fn new() -> Self {
        Self::with_reachable(true)
    }

    /// A switch whose `connect` always times out.
    pub fn unreachable() -> Self {
        Self::with_reachable(false)
    }

    fn with_reachable(reachable: bool) -> Self {
        Self {
            shared: Arc::new(Shared {
                raised: AtomicBool::new(false),
                reachable,
                callbacks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Raise the kill signal, notifying callbacks on the rising edge only.
    pub fn raise(&self) {
        if self.shared.raised.swap(true, Ordering::SeqCst) {
            return;
        }

        warn!("Kill raised");

        match self.shared.callbacks.lock() {
            Ok(callbacks) => callbacks.iter().for_each(|cb| cb()),
            Err(_) => warn!("Kill callbacks lock poisoned, callbacks not notified"),
        }
    }

    pub fn clear(&self) {
        if self.shared.raised.swap(false, Ordering::SeqCst) {
            info!("Kill cleared");
        }
    }
}

impl Default for KillSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl KillMonitor for KillSwitch {
    fn connect(&mut self, timeout: Duration) -> Result<(), KillMonitorError> {
        if self.shared.reachable {
            Ok(())
        }
        else {
            Err(KillMonitorError::ConnectionTimeout(timeout))
        }
    }

    fn is_raised(&self) -> bool {
        self.shared.raised.load(Ordering::SeqCst)
    }

    fn add_raise_callback(&mut self, callback: RaiseCallback) {
        match self.shared.callbacks.lock() {
            Ok(mut callbacks) => callbacks.push(callback),
            Err(_) => warn!("Kill callbacks lock poisoned, callback not added"),
        }
    }
}
