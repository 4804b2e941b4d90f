//! Error taxonomy shared by the registry, state machine, and RPC surface.
//!
//! The four variants correspond exactly to the taxonomy in the broker
//! specification: malformed input or framing, missing sessions/variables/data,
//! conflicting state transitions, and participants acting outside their role.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("forbidden: {0}")]
    Forbidden(String),
}

pub type BrokerResult<T> = Result<T, BrokerError>;
