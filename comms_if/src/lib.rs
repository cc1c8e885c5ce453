//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the trajectory generator: the messages it
//! consumes and produces, the telecommands that drive it, and the traits its external
//! collaborators (waypoint validity checking, kill monitoring) must implement.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Interfaces to external equipment (validity gate, kill monitor)
pub mod eqpt;

/// Geometry and state messages
pub mod msg;
