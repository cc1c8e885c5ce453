//! Session logger
//!
//! Everything is written to stdout and to the session's log file. Goal lifecycle messages are
//! also collected in a separate goal log in the session directory, so the history of every goal
//! can be read without the per-tick noise.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{self, info};
use fern;
use colored::{ColoredString, Colorize};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the goal log within the session directory
pub const GOAL_LOG_NAME: &str = "goals.log";

/// Log target of the goal lifecycle messages
pub const GOAL_LOG_TARGET: &str = "traj_lib::goal_mgr";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// `target_levels` overrides `min_level` for individual module paths, for instance to see the
/// goal manager's debug messages without everything else's.
///
/// # Notes
///
/// - `min_level` must be at least `log::Level::Info`.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    min_level: self::LevelFilter,
    target_levels: &[(&'static str, LevelFilter)],
    session: &session::Session
) -> Result<(), LoggerInitError> {

    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;
    let goal_log_file = fern::log_file(session.session_root.join(GOAL_LOG_NAME))
        .map_err(LoggerInitError::LogFileInitError)?;

    let mut main_log = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{}", format_record(message, record, true)))
        })
        .level(min_level);
    for &(target, level) in target_levels.iter() {
        main_log = main_log.level_for(target, level);
    }

    let goal_log = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{}", format_record(message, record, false)))
        })
        .level(LevelFilter::Off)
        .level_for(GOAL_LOG_TARGET, LevelFilter::Info);

    fern::Dispatch::new()
        .chain(main_log.chain(std::io::stdout()).chain(log_file))
        .chain(goal_log.chain(goal_log_file))
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    for (target, level) in target_levels.iter() {
        info!("    Log level for {}: {:?}", target, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format one record, stamped with the seconds since the session epoch.
///
/// Debug and trace records carry their target. Colour codes are left out of files which are
/// only ever read back as text.
fn format_record(
    message: &std::fmt::Arguments,
    record: &log::Record,
    coloured: bool
) -> String {
    let level = if coloured {
        level_to_str(record.level()).to_string()
    }
    else {
        level_to_plain_str(record.level()).to_string()
    };

    if record.level() > log::Level::Info {
        format!(
            "[{:10.6} {}] {}: {}",
            session::get_elapsed_seconds(),
            level,
            record.target(),
            message
        )
    }
    else {
        format!(
            "[{:10.6} {}] {}",
            session::get_elapsed_seconds(),
            level,
            message
        )
    }
}

/// Get the coloured string representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    let s = level_to_plain_str(level);
    match level {
        log::Level::Trace => s.dimmed().italic(),
        log::Level::Debug => s.dimmed(),
        log::Level::Info  => s.normal(),
        log::Level::Warn  => s.yellow(),
        log::Level::Error => s.red().bold()
    }
}

fn level_to_plain_str(level: log::Level) -> &'static str {
    match level {
        log::Level::Trace => "TRC",
        log::Level::Debug => "DBG",
        log::Level::Info  => "INF",
        log::Level::Warn  => "WRN",
        log::Level::Error => "ERR"
    }
}
