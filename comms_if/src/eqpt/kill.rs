//! # Kill monitor interface
//!
//! The kill signal is an external switch which, while raised, forbids any motion. The monitor is
//! polled every cycle and may also notify the trajectory generator as soon as the signal is
//! raised.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::Duration;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// Callback invoked when the kill signal is raised. It may be called from any thread.
pub type RaiseCallback = Box<dyn Fn() + Send + Sync>;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum KillMonitorError {
    #[error("Could not connect to the kill monitor within {0:?}")]
    ConnectionTimeout(Duration),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

pub trait KillMonitor: Send {
    /// Connect to the kill signal source, blocking for at most `timeout`.
    fn connect(&mut self, timeout: Duration) -> Result<(), KillMonitorError>;

    /// Returns true while the kill signal is raised.
    fn is_raised(&self) -> bool;

    /// Register a callback to be invoked each time the kill signal is raised.
    fn add_raise_callback(&mut self, callback: RaiseCallback);
}
