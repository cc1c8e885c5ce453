//! # Data Store

use log::info;

use crate::tgen;
use comms_if::tc::move_to::{GoalOutcome, GoalResult};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Session elapsed time at the start of the cycle
    pub sim_time_s: f64,

    // TrajGen
    pub traj_gen_input: tgen::InputData,
    pub traj_gen_output: tgen::OutputData,
    pub traj_gen_status_rpt: tgen::StatusReport,

    /// Every goal result produced this session, in order
    pub goal_results: Vec<GoalResult>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Clear items that need wiping at the start of the cycle.
    pub fn cycle_start(&mut self) {
        self.sim_time_s = util::session::get_elapsed_seconds();

        self.traj_gen_input = tgen::InputData {
            now_s: self.sim_time_s,
        };
        self.traj_gen_output = tgen::OutputData::default();
        self.traj_gen_status_rpt = tgen::StatusReport::default();
    }

    /// Keep this cycle's goal results.
    pub fn record_results(&mut self) {
        for result in self.traj_gen_output.results.iter() {
            info!("Goal {} finished: {:?}", result.id, result.outcome);
        }

        self.goal_results
            .extend(self.traj_gen_output.results.iter().copied());
    }

    /// Number of recorded results with the given outcome.
    pub fn num_results(&self, outcome: GoalOutcome) -> usize {
        self.goal_results
            .iter()
            .filter(|r| r.outcome == outcome)
            .count()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_record_results() {
        let mut ds = DataStore::default();

        ds.traj_gen_output.results = vec![
            GoalResult::new(1, GoalOutcome::Cancelled),
            GoalResult::new(2, GoalOutcome::Succeeded),
        ];
        ds.record_results();
        ds.cycle_start();
        assert!(ds.traj_gen_output.results.is_empty());
        ds.record_results();

        assert_eq!(ds.goal_results.len(), 2);
        assert_eq!(ds.num_results(GoalOutcome::Succeeded), 1);
        assert_eq!(ds.num_results(GoalOutcome::Aborted), 0);
    }
}
