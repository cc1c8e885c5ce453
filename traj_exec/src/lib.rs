//! # Trajectory generation library.
//!
//! This library allows other crates in the workspace to access items defined inside the
//! trajectory exec crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// C3 trajectory integrator - bounded velocity, acceleration and effort motion toward a waypoint
pub mod c3;

/// Goal lifecycle manager - accepts, cancels and completes goals against the trajectory
pub mod goal_mgr;

/// Trajectory generator - the fixed-rate control loop module
pub mod tgen;

/// Static validity gate - occupied and unknown regions from parameters
pub mod validity;

/// Kill switch - in-process kill monitor
pub mod kill_switch;

/// Simulation client - a simulated vehicle which tracks the trajectory perfectly
pub mod sim_client;

/// Global data store
pub mod data_store;
