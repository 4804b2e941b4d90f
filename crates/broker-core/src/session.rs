//! Per-coupling record and its state transitions.

use std::collections::{HashMap, HashSet};

use crate::error::BrokerError;
use crate::model::{ClientVars, SessionData, Status};
use crate::slot::Slot;

/// Outcome of a successful `end_session` call, used by the registry to
/// decide whether to retain or delete the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOutcome {
    PartialEnd,
    Ended,
}

/// The broker's per-coupling record (spec §3 "Session").
#[derive(Debug, Clone)]
pub struct Session {
    status: Status,
    slots: HashMap<i64, Slot>,
    client_vars: ClientVars,
    initiator_id: i64,
    invitee_id: i64,
    joined: bool,
    end_requests: HashSet<i64>,
}

impl Session {
    /// Constructs a freshly CREATED session from creation parameters. The
    /// slot set is the union of declared input and output variables; the
    /// initiator owns the input variables by declaration.
    pub fn create(data: &SessionData) -> Self {
        let mut slots = HashMap::new();
        for (&id, &size) in data
            .input_variables_id
            .iter()
            .zip(data.input_variables_size.iter())
        {
            slots.insert(id, Slot::new(size));
        }
        for (&id, &size) in data
            .output_variables_id
            .iter()
            .zip(data.output_variables_size.iter())
        {
            slots.insert(id, Slot::new(size));
        }

        let mut client_vars = HashMap::new();
        client_vars.insert(data.initiator_id, data.input_variables_id.clone());

        Session {
            status: Status::Created,
            slots,
            client_vars,
            initiator_id: data.initiator_id,
            invitee_id: data.invitee_id,
            joined: false,
            end_requests: HashSet::new(),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Joins the session as the invitee declared at creation. The joiner's
    /// owned variables are the slot key set minus the initiator's.
    pub fn join(&mut self, invitee_id: i64) -> Result<(), BrokerError> {
        if self.joined {
            return Err(BrokerError::Conflict("session already active".to_string()));
        }
        if invitee_id != self.invitee_id {
            return Err(BrokerError::Forbidden("invitee id mismatch".to_string()));
        }

        let initiator_owned: HashSet<i64> = self
            .client_vars
            .get(&self.initiator_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .collect();
        let joiner_owned: Vec<i64> = self
            .slots
            .keys()
            .copied()
            .filter(|id| !initiator_owned.contains(id))
            .collect();
        self.client_vars.insert(invitee_id, joiner_owned);

        self.joined = true;
        self.status = Status::Active;
        Ok(())
    }

    pub fn peek_flag(&self, var_id: i64) -> Result<u8, BrokerError> {
        self.slot(var_id).map(Slot::peek_flag)
    }

    pub fn peek_size(&self, var_id: i64) -> Result<i64, BrokerError> {
        self.slot(var_id).map(Slot::peek_size)
    }

    /// Stores `value` into `var_id`'s slot. Rejects with `Conflict` if the
    /// slot is already full — send/receive are permitted immediately after
    /// CREATED, the flag is the sole synchronizer.
    pub fn send_data(&mut self, var_id: i64, value: Vec<f64>) -> Result<(), BrokerError> {
        self.slot_mut(var_id)?.put(value)
    }

    /// Drains `var_id`'s slot. Rejects with `NotFound` if empty.
    pub fn receive_data(&mut self, var_id: i64) -> Result<Vec<f64>, BrokerError> {
        self.slot_mut(var_id)?.take()
    }

    /// Posts an end request from `participant_id`. The first request from a
    /// valid participant clears their owned slots and moves the session to
    /// PARTIAL_END; the second moves it to END, signalling the registry to
    /// delete the record.
    pub fn end_session(&mut self, participant_id: i64) -> Result<EndOutcome, BrokerError> {
        let is_participant = participant_id == self.initiator_id
            || (self.joined && participant_id == self.invitee_id);
        if !is_participant {
            return Err(BrokerError::Forbidden(
                "client is not a participant of this session".to_string(),
            ));
        }

        if self.end_requests.contains(&participant_id) {
            return Err(BrokerError::Conflict(
                "participant has already requested end".to_string(),
            ));
        }

        self.end_requests.insert(participant_id);
        if let Some(owned) = self.client_vars.get(&participant_id).cloned() {
            for var_id in owned {
                if let Some(slot) = self.slots.get_mut(&var_id) {
                    slot.clear();
                }
            }
        }

        if self.end_requests.len() >= 2 {
            self.status = Status::End;
            Ok(EndOutcome::Ended)
        } else {
            self.status = Status::PartialEnd;
            Ok(EndOutcome::PartialEnd)
        }
    }

    /// Read-only snapshot of `(var_id, flag)` pairs for the housekeeper.
    pub fn flag_snapshot(&self) -> Vec<(i64, u8)> {
        self.slots
            .iter()
            .map(|(&id, slot)| (id, slot.peek_flag()))
            .collect()
    }

    fn slot(&self, var_id: i64) -> Result<&Slot, BrokerError> {
        self.slots
            .get(&var_id)
            .ok_or_else(|| BrokerError::NotFound(format!("unknown variable {var_id}")))
    }

    fn slot_mut(&mut self, var_id: i64) -> Result<&mut Slot, BrokerError> {
        self.slots
            .get_mut(&var_id)
            .ok_or_else(|| BrokerError::NotFound(format!("unknown variable {var_id}")))
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
    fn happy_path_matches_scenario_one() {
        let mut session = Session::create(&sample_data());
        assert_eq!(session.status().as_i32(), 1);

        session.join(38).unwrap();
        assert_eq!(session.status().as_i32(), 2);

        let payload = vec![1.0; 50];
        session.send_data(1, payload.clone()).unwrap();
        assert_eq!(session.peek_flag(1).unwrap(), 1);

        let received = session.receive_data(1).unwrap();
        assert_eq!(received, payload);
        assert_eq!(session.peek_flag(1).unwrap(), 0);

        assert_eq!(session.end_session(35).unwrap(), EndOutcome::PartialEnd);
        assert_eq!(session.status().as_i32(), 3);
        assert_eq!(session.end_session(38).unwrap(), EndOutcome::Ended);
        assert_eq!(session.status().as_i32(), 4);
    }

    #[test]
    fn wrong_invitee_is_forbidden_and_status_unchanged() {
        let mut session = Session::create(&sample_data());
        assert!(matches!(session.join(99), Err(BrokerError::Forbidden(_))));
        assert_eq!(session.status().as_i32(), 1);
    }

    #[test]
    fn double_send_without_receive_is_conflict() {
        let mut session = Session::create(&sample_data());
        session.send_data(1, vec![1.0, 2.0]).unwrap();
        assert!(matches!(
            session.send_data(1, vec![3.0, 4.0]),
            Err(BrokerError::Conflict(_))
        ));
    }

    #[test]
    fn receive_without_send_is_not_found() {
        let mut session = Session::create(&sample_data());
        assert!(matches!(
            session.receive_data(1),
            Err(BrokerError::NotFound(_))
        ));
    }

    #[test]
    fn send_and_receive_permitted_before_join() {
        let mut session = Session::create(&sample_data());
        session.send_data(1, vec![9.0]).unwrap();
        assert_eq!(session.receive_data(1).unwrap(), vec![9.0]);
    }

    #[test]
    fn joiner_owns_complement_of_initiator_variables() {
        let mut data = sample_data();
        data.output_variables_id = vec![2, 3];
        data.output_variables_size = vec![1, 1];
        let mut session = Session::create(&data);
        session.join(38).unwrap();
        let mut joiner_owned = session.client_vars.get(&38).cloned().unwrap();
        joiner_owned.sort();
        assert_eq!(joiner_owned, vec![2, 3]);
    }

    #[test]
    fn end_session_from_non_participant_is_forbidden() {
        let mut session = Session::create(&sample_data());
        assert!(matches!(
            session.end_session(1234),
            Err(BrokerError::Forbidden(_))
        ));
    }

    #[test]
    fn partial_end_clears_only_departing_participants_slots() {
        let mut data = sample_data();
        data.output_variables_id = vec![2];
        data.output_variables_size = vec![1];
        let mut session = Session::create(&data);
        session.join(38).unwrap();

        session.send_data(1, vec![1.0]).unwrap();
        session.send_data(2, vec![2.0]).unwrap();

        session.end_session(35).unwrap();
        // Initiator owns var 1: cleared.
        assert_eq!(session.peek_flag(1).unwrap(), 0);
        // Invitee owns var 2 and hasn't ended yet: untouched.
        assert_eq!(session.peek_flag(2).unwrap(), 1);
    }
}
