//! Wire DTOs for the RPC surface. These wrap `broker-core` types in the
//! envelope shapes the spec's endpoint table names.

use broker_core::{SessionData, SessionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub status: i32,
    pub session_id: SessionId,
}

#[derive(Debug, Deserialize)]
pub struct JoinSessionRequest {
    pub session_id: SessionId,
    pub invitee_id: i64,
}

#[derive(Debug, Serialize)]
pub struct JoinSessionResponse {
    pub status: i32,
    pub session_id: SessionId,
}

#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    pub status: i32,
    pub session_id: SessionId,
}

#[derive(Debug, Serialize)]
pub struct SendDataResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct VariableQuery {
    pub session_id: String,
    pub var_id: i64,
}

#[derive(Debug, Serialize)]
pub struct VariableFlagResponse {
    pub var_id: i64,
    pub flag_status: u8,
}

#[derive(Debug, Serialize)]
pub struct VariableSizeResponse {
    pub var_id: i64,
    pub size: i64,
}

/// Re-exported so handler signatures only need one `use` for creation params.
pub type CreateSessionRequest = SessionData;
