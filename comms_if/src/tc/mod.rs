//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications
//! interface. Telecommands are received as JSON objects of the form
//! `{"type": "...", "payload": ...}`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod move_to;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde_json::{self, Value};
use thiserror::Error;

// Internal
use self::move_to::MoveToGoal;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static TYPE_HAS_NO_PAYLOAD: [TcType; 3] = [
    TcType::Cancel,
    TcType::Kill,
    TcType::Unkill
];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the trajectory generator by an
/// operator, a mission planner or a script.
#[derive(Debug, Clone, PartialEq)]
pub enum Tc {
    /// Move to the given goal, preempting any goal currently being tracked.
    MoveTo(MoveToGoal),

    /// Cancel the goal currently being tracked.
    Cancel,

    /// Raise the kill signal.
    Kill,

    /// Clear the kill signal.
    Unkill,

    /// Enable or disable trajectory generation.
    SetDisabled(bool),
}

/// Telecommand types.
///
/// The type is used to identify the purpose of the telecommand before its
/// payload is parsed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TcType {
    MoveTo,
    Cancel,
    Kill,
    Unkill,
    SetDisabled,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC has an invalid type ({0})")]
    InvalidType(String),

    #[error("TC of type {0:?} is expected to have a payload but it doesn't")]
    MissingPayload(TcType),

    #[error("TC of type {0:?} has an invalid payload")]
    InvalidPayload(TcType),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {

    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        // Parse the JSON string into a value
        let val: Value = serde_json::from_str(json_str)
            .map_err(TcParseError::InvalidJson)?;

        // Get the type of the TC
        let type_str = match val["type"].as_str() {
            Some(s) => s,
            None => return Err(TcParseError::InvalidType(String::from(
                "Expected \"type\" to be a string"
            )))
        };
        let tc_type = match TcType::from_str(type_str) {
            Some(t) => t,
            None => return Err(TcParseError::InvalidType(
                format!("{} is not a recognised TC type", type_str)
            ))
        };

        // Get the payload. If it's null and the type has a payload then an
        // error is returned
        let payload = &val["payload"];
        if payload.is_null() && !TYPE_HAS_NO_PAYLOAD.contains(&tc_type) {
            return Err(TcParseError::MissingPayload(tc_type))
        }

        Ok(match tc_type {
            TcType::MoveTo => Tc::MoveTo(
                serde_json::from_value(payload.clone())
                    .map_err(TcParseError::InvalidJson)?
            ),
            TcType::Cancel => Tc::Cancel,
            TcType::Kill => Tc::Kill,
            TcType::Unkill => Tc::Unkill,
            TcType::SetDisabled => Tc::SetDisabled(
                payload.as_bool()
                    .ok_or(TcParseError::InvalidPayload(tc_type))?
            ),
        })
    }
}

impl TcType {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "MOVE_TO" => Some(TcType::MoveTo),
            "CANCEL" => Some(TcType::Cancel),
            "KILL" => Some(TcType::Kill),
            "UNKILL" => Some(TcType::Unkill),
            "SET_DISABLED" => Some(TcType::SetDisabled),
            _ => None
        }
    }
}
