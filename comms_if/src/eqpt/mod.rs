//! # Equipment Interface
//!
//! This module defines the interfaces to the external equipment the trajectory generator depends
//! on: a gate deciding whether a pose may be commanded, and a monitor for the vehicle's kill
//! signal.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod kill;
pub mod validity;
