//! Wire and state-machine data types: `SessionId`, `SessionData`, `Status`.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identity of a coupling. Field-wise equality, immutable once minted — this
/// is the registry's map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId {
    pub source_model_id: i64,
    pub destination_model_id: i64,
    pub initiator_id: i64,
    pub invitee_id: i64,
    pub client_id: String,
}

impl SessionId {
    /// The five fields joined by commas, in declaration order — used by
    /// clients that need a single header-value-safe representation.
    pub fn to_header_value(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.source_model_id,
            self.destination_model_id,
            self.initiator_id,
            self.invitee_id,
            self.client_id
        )
    }

    /// Inverse of [`Self::to_header_value`].
    pub fn from_header_value(value: &str) -> Result<Self, crate::error::BrokerError> {
        let parts: Vec<&str> = value.splitn(5, ',').collect();
        let invalid = || {
            crate::error::BrokerError::InvalidInput(format!(
                "malformed session id header value: {value}"
            ))
        };
        if parts.len() != 5 {
            return Err(invalid());
        }
        let parse_i64 = |s: &str| s.parse::<i64>().map_err(|_| invalid());
        Ok(SessionId {
            source_model_id: parse_i64(parts[0])?,
            destination_model_id: parse_i64(parts[1])?,
            initiator_id: parse_i64(parts[2])?,
            invitee_id: parse_i64(parts[3])?,
            client_id: parts[4].to_string(),
        })
    }
}

/// Creation parameters for a new session, as posted to `/create_session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub source_model_id: i64,
    pub destination_model_id: i64,
    pub initiator_id: i64,
    pub invitee_id: i64,
    pub input_variables_id: Vec<i64>,
    pub input_variables_size: Vec<i64>,
    pub output_variables_id: Vec<i64>,
    pub output_variables_size: Vec<i64>,
}

/// Session lifecycle status. Serializes/deserializes as the bare integer
/// the wire format expects (`{status:int, ...}`), not as a tagged object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Status {
    Error = -1,
    Unknown = 0,
    Created = 1,
    Active = 2,
    PartialEnd = 3,
    End = 4,
}

impl Status {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i32::deserialize(deserializer)?;
        match raw {
            -1 => Ok(Status::Error),
            0 => Ok(Status::Unknown),
            1 => Ok(Status::Created),
            2 => Ok(Status::Active),
            3 => Ok(Status::PartialEnd),
            4 => Ok(Status::End),
            other => Err(de::Error::custom(format!("unknown status value {other}"))),
        }
    }
}

/// Ownership of a session's variable slots by participant tag, used at
/// partial-end to determine which slots the departing participant clears.
pub type ClientVars = HashMap<i64, Vec<i64>>;
