//! Main trajectory generator executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Odometry acquisition from the simulated vehicle
//!         - Telecommand processing and handling
//!         - Trajectory generation
//!         - Simulated vehicle tracking
//!         - Archiving
//!
//! # Modules
//!
//! All modules (e.g. `tgen`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use traj_lib::{
    data_store::DataStore,
    kill_switch::KillSwitch,
    sim_client::{SimClient, SimParams},
    tgen::{self, TrajGen},
    validity::StaticValidityGate,
};

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use std::path::PathBuf;
use std::thread;
use std::time::Instant;
use structopt::StructOpt;

// Internal
use comms_if::tc::move_to::GoalOutcome;
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "traj_exec", about = "C3 trajectory generator")]
struct Opt {
    /// Path to the telecommand script to run
    #[structopt(parse(from_os_str))]
    script_path: PathBuf,

    /// Time to keep generating after the last telecommand, in seconds
    #[structopt(long, default_value = "10.0")]
    settle_time_s: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("traj_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(
        LevelFilter::Info,
        &[
            ("traj_lib::goal_mgr", LevelFilter::Debug),
            ("traj_exec::tc_processor", LevelFilter::Debug),
        ],
        &session,
    )
    .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("C3 Trajectory Generator Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let tg_params: tgen::Params =
        util::params::load("traj_gen.toml").wrap_err("Could not load trajectory params")?;
    let sim_params: SimParams =
        util::params::load("sim.toml").wrap_err("Could not load simulation params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    info!("Loading script from {:?}", opt.script_path);

    let mut script =
        ScriptInterpreter::new(&opt.script_path).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} TCs\n",
        script.get_duration(),
        script.get_num_tcs()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    let mut sim = SimClient::new(&sim_params, &tg_params.fixed_frame, &tg_params.body_frame);
    let kill_switch = KillSwitch::new();

    let mut traj_gen = TrajGen::new(
        tg_params,
        Box::new(StaticValidityGate::new(sim_params.validity)),
        Box::new(kill_switch.clone()),
    )
    .wrap_err("Failed to create TrajGen")?;
    traj_gen
        .init((), &session)
        .wrap_err("Failed to initialise TrajGen")?;
    let events = traj_gen.event_sender();

    info!("TrajGen init complete");
    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut end_of_script_s: Option<f64> = None;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start();

        // ---- DATA INPUT ----

        events.send_odometry(sim.odometry());

        // ---- TELECOMMAND PROCESSING ----

        match script.get_pending_tcs(ds.sim_time_s) {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    tc_processor::exec(tc, &events, &kill_switch);
                }
            }
            PendingTcs::EndOfScript => {
                let end_s = *end_of_script_s.get_or_insert_with(|| {
                    info!("End of TC script reached, settling for {} s", opt.settle_time_s);
                    ds.sim_time_s
                });

                if ds.sim_time_s - end_s > opt.settle_time_s {
                    info!("Settle time elapsed, stopping");
                    break;
                }
            }
        }

        // ---- TRAJECTORY GENERATION ----

        match traj_gen.proc(&ds.traj_gen_input) {
            Ok((o, r)) => {
                ds.traj_gen_output = o;
                ds.traj_gen_status_rpt = r;
            }
            Err(e) => warn!("Error during TrajGen processing: {}", e),
        }

        ds.record_results();

        // ---- SIMULATED VEHICLE ----

        match ds.traj_gen_output.trajectory {
            Some(ref traj) => sim.track(traj),
            None => sim.hold(),
        }

        // ---- WRITE ARCHIVES ----

        if let Err(e) = traj_gen.write() {
            warn!("Could not write TrajGen archives: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match traj_gen.cycle_remaining(cycle_dur) {
            Ok(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            Err(overrun_s) => {
                warn!("Cycle overran by {:.06} s", overrun_s);
                ds.num_consec_cycle_overruns += 1;
            }
        }

        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!(
        "{} goals succeeded, {} cancelled, {} rejected, {} aborted",
        ds.num_results(GoalOutcome::Succeeded),
        ds.num_results(GoalOutcome::Cancelled),
        ds.num_results(GoalOutcome::Rejected),
        ds.num_results(GoalOutcome::Aborted)
    );
    info!(
        "Vehicle finished at ({:.3}, {:.3}, {:.3})",
        sim.pose().position_m[0],
        sim.pose().position_m[1],
        sim.pose().position_m[2]
    );

    session.save("goal_results.json", ds.goal_results.clone());

    info!("End of execution");

    session.exit();

    Ok(())
}
