//! The process-wide session table.
//!
//! One `parking_lot::Mutex` guards the whole map so every handler observes
//! and mutates sessions under a single mutual-exclusion discipline — no
//! per-entry sharding, no separate locks for different operations.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::BrokerError;
use crate::model::{SessionData, SessionId};
use crate::session::{EndOutcome, Session};

const MAX_ID_ATTEMPTS: usize = 8;

#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<Mutex<HashMap<SessionId, Session>>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Creates a new session, minting a fresh `client_id` and retrying on
    /// the vanishingly unlikely event of a UUID collision with an existing
    /// record for the same model/participant tuple.
    pub fn create(&self, data: SessionData) -> Result<SessionId, BrokerError> {
        let mut table = self.inner.lock();
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = SessionId {
                source_model_id: data.source_model_id,
                destination_model_id: data.destination_model_id,
                initiator_id: data.initiator_id,
                invitee_id: data.invitee_id,
                client_id: Uuid::new_v4().to_string(),
            };
            if table.contains_key(&id) {
                continue;
            }
            let session = Session::create(&data);
            table.insert(id.clone(), session);
            return Ok(id);
        }
        Err(BrokerError::Conflict(
            "could not mint a unique session id".to_string(),
        ))
    }

    /// Joins the invitee and returns the resulting status, both under the
    /// same lock acquisition — callers must not re-look-up the session to
    /// learn the status a join just produced.
    pub fn join(&self, id: &SessionId, invitee_id: i64) -> Result<i32, BrokerError> {
        self.with_session_mut(id, |session| {
            session.join(invitee_id)?;
            Ok(session.status().as_i32())
        })
    }

    pub fn send_data(&self, id: &SessionId, var_id: i64, value: Vec<f64>) -> Result<(), BrokerError> {
        self.with_session_mut(id, |session| session.send_data(var_id, value))
    }

    pub fn receive_data(&self, id: &SessionId, var_id: i64) -> Result<Vec<f64>, BrokerError> {
        self.with_session_mut(id, |session| session.receive_data(var_id))
    }

    pub fn peek_flag(&self, id: &SessionId, var_id: i64) -> Result<u8, BrokerError> {
        self.with_session(id, |session| session.peek_flag(var_id))
    }

    pub fn peek_size(&self, id: &SessionId, var_id: i64) -> Result<i64, BrokerError> {
        self.with_session(id, |session| session.peek_size(var_id))
    }

    pub fn status(&self, id: &SessionId) -> Result<i32, BrokerError> {
        self.with_session(id, |session| Ok(session.status().as_i32()))
    }

    /// Posts an end request. Deletes the record outright once both
    /// participants have ended, per spec §4.3.
    pub fn end_session(&self, id: &SessionId, participant_id: i64) -> Result<i32, BrokerError> {
        let mut table = self.inner.lock();
        let session = table
            .get_mut(id)
            .ok_or_else(|| BrokerError::NotFound("no such session".to_string()))?;
        let outcome = session.end_session(participant_id)?;
        let status = session.status().as_i32();
        if outcome == EndOutcome::Ended {
            table.remove(id);
        }
        Ok(status)
    }

    /// Snapshot of every live session's variable flags, for the housekeeper.
    pub fn snapshot_flags(&self) -> Vec<(SessionId, Vec<(i64, u8)>)> {
        let table = self.inner.lock();
        table
            .iter()
            .map(|(id, session)| (id.clone(), session.flag_snapshot()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    fn with_session<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&Session) -> Result<T, BrokerError>,
    ) -> Result<T, BrokerError> {
        let table = self.inner.lock();
        let session = table
            .get(id)
            .ok_or_else(|| BrokerError::NotFound("no such session".to_string()))?;
        f(session)
    }

    fn with_session_mut<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut Session) -> Result<T, BrokerError>,
    ) -> Result<T, BrokerError> {
        let mut table = self.inner.lock();
        let session = table
            .get_mut(id)
            .ok_or_else(|| BrokerError::NotFound("no such session".to_string()))?;
        f(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> SessionData {
        SessionData {
            source_model_id: 2001,
            destination_model_id: 2005,
            initiator_id: 35,
            invitee_id: 38,
            input_variables_id: vec![1],
            input_variables_size: vec![50],
            output_variables_id: vec![],
            output_variables_size: vec![],
        }
    }

    #[test]
    fn create_mints_distinct_client_ids_for_identical_data() {
        let registry = Registry::new();
        let first = registry.create(sample_data()).unwrap();
        let second = registry.create(sample_data()).unwrap();
        assert_ne!(first.client_id, second.client_id);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn lookup_of_unknown_session_is_not_found() {
        let registry = Registry::new();
        let bogus = SessionId {
            source_model_id: 0,
            destination_model_id: 0,
            initiator_id: 0,
            invitee_id: 0,
            client_id: "nope".to_string(),
        };
        assert!(matches!(
            registry.status(&bogus),
            Err(BrokerError::NotFound(_))
        ));
    }

    #[test]
    fn full_lifecycle_removes_record_on_mutual_end() {
        let registry = Registry::new();
        let id = registry.create(sample_data()).unwrap();
        registry.join(&id, 38).unwrap();
        registry.send_data(&id, 1, vec![1.0; 50]).unwrap();
        assert_eq!(registry.receive_data(&id, 1).unwrap(), vec![1.0; 50]);

        assert_eq!(registry.end_session(&id, 35).unwrap(), 3);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.end_session(&id, 38).unwrap(), 4);
        assert_eq!(registry.len(), 0);
        assert!(matches!(
            registry.status(&id),
            Err(BrokerError::NotFound(_))
        ));
    }

    #[test]
    fn snapshot_flags_reflects_live_sessions() {
        let registry = Registry::new();
        let id = registry.create(sample_data()).unwrap();
        registry.send_data(&id, 1, vec![1.0; 50]).unwrap();
        let snapshot = registry.snapshot_flags();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].0, id);
        assert_eq!(snapshot[0].1, vec![(1, 1)]);
    }
}
