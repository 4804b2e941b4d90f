//! Thin async wrapper over the broker's HTTP surface. One method per
//! endpoint in the spec's interface table; no retry logic here (see
//! [`crate::retry`]).

use broker_core::{SessionData, SessionId};
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ClientError;

#[derive(Clone)]
pub struct BrokerClient {
    http: HttpClient,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl BrokerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        BrokerClient {
            http: HttpClient::new(),
            base_url: base_url.into(),
        }
    }

    async fn error_from_response(status: StatusCode, body: &[u8]) -> ClientError {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| String::from_utf8_lossy(body).to_string());
        match status {
            StatusCode::BAD_REQUEST => ClientError::InvalidInput(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::CONFLICT => ClientError::Conflict(message),
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            other => ClientError::Protocol(format!("unexpected status {other}: {message}")),
        }
    }

    pub async fn create_session(&self, data: &SessionData) -> Result<SessionId, ClientError> {
        let resp = self
            .http
            .post(format!("{}/create_session", self.base_url))
            .json(data)
            .send()
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(Self::error_from_response(status, &bytes).await);
        }
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Protocol(e.to_string()))?;
        serde_json::from_value(body["session_id"].clone())
            .map_err(|e| ClientError::Protocol(e.to_string()))
    }

    pub async fn join_session(
        &self,
        session_id: &SessionId,
        invitee_id: i64,
    ) -> Result<i32, ClientError> {
        let resp = self
            .http
            .post(format!("{}/join_session", self.base_url))
            .json(&serde_json::json!({"session_id": session_id, "invitee_id": invitee_id}))
            .send()
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(Self::error_from_response(status, &bytes).await);
        }
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Protocol(e.to_string()))?;
        body["status"]
            .as_i64()
            .map(|s| s as i32)
            .ok_or_else(|| ClientError::Protocol("missing status field".to_string()))
    }

    pub async fn get_session_status(&self, session_id: &SessionId) -> Result<i32, ClientError> {
        let resp = self
            .http
            .get(format!("{}/get_session_status", self.base_url))
            .json(session_id)
            .send()
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(Self::error_from_response(status, &bytes).await);
        }
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Protocol(e.to_string()))
    }

    pub async fn get_variable_flag(
        &self,
        session_id: &SessionId,
        var_id: i64,
    ) -> Result<u8, ClientError> {
        let resp = self
            .http
            .get(format!("{}/get_variable_flag", self.base_url))
            .query(&[
                ("session_id", session_id.to_header_value()),
                ("var_id", var_id.to_string()),
            ])
            .send()
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(Self::error_from_response(status, &bytes).await);
        }
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Protocol(e.to_string()))?;
        body["flag_status"]
            .as_u64()
            .map(|f| f as u8)
            .ok_or_else(|| ClientError::Protocol("missing flag_status field".to_string()))
    }

    pub async fn get_variable_size(
        &self,
        session_id: &SessionId,
        var_id: i64,
    ) -> Result<i64, ClientError> {
        let resp = self
            .http
            .get(format!("{}/get_variable_size", self.base_url))
            .query(&[
                ("session_id", session_id.to_header_value()),
                ("var_id", var_id.to_string()),
            ])
            .send()
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(Self::error_from_response(status, &bytes).await);
        }
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Protocol(e.to_string()))?;
        body["size"]
            .as_i64()
            .ok_or_else(|| ClientError::Protocol("missing size field".to_string()))
    }

    pub async fn send_data(
        &self,
        session_id: &SessionId,
        var_id: i64,
        payload: &[f64],
    ) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(format!("{}/send_data", self.base_url))
            .header("Session-ID", session_id.to_header_value())
            .header("Var-ID", var_id.to_string())
            .body(broker_core::codec::encode(payload))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let bytes = resp.bytes().await?;
            return Err(Self::error_from_response(status, &bytes).await);
        }
        Ok(())
    }

    pub async fn receive_data(
        &self,
        session_id: &SessionId,
        var_id: i64,
    ) -> Result<Vec<f64>, ClientError> {
        let resp = self
            .http
            .get(format!("{}/receive_data", self.base_url))
            .query(&[
                ("session_id", session_id.to_header_value()),
                ("var_id", var_id.to_string()),
            ])
            .send()
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(Self::error_from_response(status, &bytes).await);
        }
        broker_core::codec::decode(&bytes).map_err(|e| ClientError::Protocol(e.to_string()))
    }

    pub async fn end_session(
        &self,
        session_id: &SessionId,
        participant_id: i64,
    ) -> Result<i32, ClientError> {
        let resp = self
            .http
            .post(format!("{}/end_session", self.base_url))
            .header("Participant-ID", participant_id.to_string())
            .json(session_id)
            .send()
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(Self::error_from_response(status, &bytes).await);
        }
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Protocol(e.to_string()))?;
        body["status"]
            .as_i64()
            .map(|s| s as i32)
            .ok_or_else(|| ClientError::Protocol("missing status field".to_string()))
    }
}
