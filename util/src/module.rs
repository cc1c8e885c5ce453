//! Cyclic module interface
//!
//! A module is initialised once against the session, then processed once per cycle of a fixed
//! period. The executable sleeps out whatever is left of each cycle, see `State::cycle_remaining`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Std
use std::time::Duration;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The module's internal state.
pub trait State {
    /// Data required during initialisation
    type InitData;
    /// An error which can occur during initialisation.
    type InitError;

    /// Data required for cyclic processing, at least the time the cycle is for.
    type InputData;
    /// Data produced by cyclic processing.
    type OutputData;
    /// A report on the status of the cyclic processing, archived every cycle.
    type StatusReport;
    /// An error which can occur during cyclic processing.
    type ProcError;

    /// Set up the module's archives in the session.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Process one cycle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;

    /// Period the module expects `proc` to be called at, strictly positive.
    fn cycle_period_s(&self) -> f64;

    /// Time left in the current cycle once `elapsed` has been spent in it.
    ///
    /// Returns the overrun in seconds as the error if the cycle took longer than its period.
    fn cycle_remaining(&self, elapsed: Duration) -> Result<Duration, f64> {
        let period_s = self.cycle_period_s();

        Duration::from_secs_f64(period_s.max(0.0))
            .checked_sub(elapsed)
            .ok_or_else(|| elapsed.as_secs_f64() - period_s)
    }
}
