//! Client-side error taxonomy: broker errors plus the transport-error kind
//! that only exists on this side of the wire.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("broker returned invalid input: {0}")]
    InvalidInput(String),

    #[error("broker returned not found: {0}")]
    NotFound(String),

    #[error("broker returned conflict: {0}")]
    Conflict(String),

    #[error("broker returned forbidden: {0}")]
    Forbidden(String),

    #[error("unexpected response: {0}")]
    Protocol(String),
}

impl ClientError {
    pub fn is_terminal_conflict(&self) -> bool {
        matches!(self, ClientError::Conflict(_))
    }
}
