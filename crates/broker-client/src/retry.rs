//! Bounded-retry wrappers layered over [`crate::client::BrokerClient`],
//! per the broker's client protocol contract. Delays are plain wall-clock
//! sleeps, not exponential backoff.

use std::time::Duration;

use broker_core::{SessionId, Status};

use crate::client::BrokerClient;

/// Repeatedly calls `join_session`. Returns `Status::Created` on success,
/// `Status::Error` immediately on "already active", `Status::Unknown` on
/// retry exhaustion.
pub async fn join_with_retries(
    client: &BrokerClient,
    session_id: &SessionId,
    invitee_id: i64,
    max_retries: u32,
    delay: Duration,
) -> Status {
    for _ in 0..max_retries {
        match client.join_session(session_id, invitee_id).await {
            Ok(_) => return Status::Created,
            Err(err) if err.is_terminal_conflict() => return Status::Error,
            Err(_) => tokio::time::sleep(delay).await,
        }
    }
    Status::Unknown
}

/// Polls the variable flag until it reads empty (consumer has drained the
/// previous value), then sends. Returns `true` on success, `false` on
/// retry exhaustion or a transport/protocol error.
pub async fn send_with_retries(
    client: &BrokerClient,
    session_id: &SessionId,
    var_id: i64,
    payload: &[f64],
    max_retries: u32,
    delay: Duration,
) -> bool {
    for _ in 0..max_retries {
        match client.get_variable_flag(session_id, var_id).await {
            Ok(1) => {
                tokio::time::sleep(delay).await;
                continue;
            }
            Ok(_) => {
                return client.send_data(session_id, var_id, payload).await.is_ok();
            }
            Err(_) => return false,
        }
    }
    false
}

/// Polls the variable flag until it reads full. Returns `true` once seen,
/// `false` on exhaustion.
pub async fn availability_with_retries(
    client: &BrokerClient,
    session_id: &SessionId,
    var_id: i64,
    max_retries: u32,
    delay: Duration,
) -> bool {
    for _ in 0..max_retries {
        match client.get_variable_flag(session_id, var_id).await {
            Ok(1) => return true,
            Ok(_) => tokio::time::sleep(delay).await,
            Err(_) => tokio::time::sleep(delay).await,
        }
    }
    false
}

/// Polls the variable flag until full, then receives. Returns the decoded
/// sequence on success, `None` on exhaustion.
pub async fn receive_with_retries(
    client: &BrokerClient,
    session_id: &SessionId,
    var_id: i64,
    max_retries: u32,
    delay: Duration,
) -> Option<Vec<f64>> {
    for _ in 0..max_retries {
        match client.get_variable_flag(session_id, var_id).await {
            Ok(1) => {
                return client.receive_data(session_id, var_id).await.ok();
            }
            Ok(_) => tokio::time::sleep(delay).await,
            Err(_) => tokio::time::sleep(delay).await,
        }
    }
    None
}
