//! The six literal scenarios and the numbered invariants from the broker
//! specification, exercised against the public registry API.

use broker_core::{BrokerError, Registry, SessionData};

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
fn scenario_happy_path() {
    let registry = Registry::new();
    let id = registry.create(sample_data()).unwrap();
    assert_eq!(registry.status(&id).unwrap(), 1);

    registry.join(&id, 38).unwrap();
    assert_eq!(registry.status(&id).unwrap(), 2);

    let payload = vec![1.0; 50];
    registry.send_data(&id, 1, payload.clone()).unwrap();
    assert_eq!(registry.peek_flag(&id, 1).unwrap(), 1);

    assert_eq!(registry.receive_data(&id, 1).unwrap(), payload);
    assert_eq!(registry.peek_flag(&id, 1).unwrap(), 0);

    assert_eq!(registry.end_session(&id, 35).unwrap(), 3);
    assert_eq!(registry.end_session(&id, 38).unwrap(), 4);
    assert!(matches!(
        registry.status(&id),
        Err(BrokerError::NotFound(_))
    ));
}

#[test]
fn scenario_wrong_invitee() {
    let registry = Registry::new();
    let id = registry.create(sample_data()).unwrap();
    assert!(matches!(
        registry.join(&id, 99),
        Err(BrokerError::Forbidden(_))
    ));
    assert_eq!(registry.status(&id).unwrap(), 1);
}

#[test]
fn scenario_double_send_conflict() {
    let registry = Registry::new();
    let id = registry.create(sample_data()).unwrap();
    registry.send_data(&id, 1, vec![1.0, 2.0]).unwrap();
    assert!(matches!(
        registry.send_data(&id, 1, vec![1.0, 2.0]),
        Err(BrokerError::Conflict(_))
    ));
}

#[test]
fn scenario_receive_empty() {
    let registry = Registry::new();
    let id = registry.create(sample_data()).unwrap();
    assert!(matches!(
        registry.receive_data(&id, 1),
        Err(BrokerError::NotFound(_))
    ));
}

#[test]
fn scenario_unknown_session() {
    let registry = Registry::new();
    let bogus = broker_core::SessionId {
        source_model_id: 2001,
        destination_model_id: 2005,
        initiator_id: 35,
        invitee_id: 38,
        client_id: "never-created".to_string(),
    };
    assert!(matches!(
        registry.peek_flag(&bogus, 1),
        Err(BrokerError::NotFound(_))
    ));
}

#[test]
fn scenario_deleted_session_is_not_found() {
    let registry = Registry::new();
    let id = registry.create(sample_data()).unwrap();
    registry.end_session(&id, 35).unwrap();
    registry.end_session(&id, 38).unwrap();
    assert!(matches!(
        registry.peek_flag(&id, 1),
        Err(BrokerError::NotFound(_))
    ));
}

#[test]
fn scenario_duplicate_create() {
    let registry = Registry::new();
    let first = registry.create(sample_data()).unwrap();
    let second = registry.create(sample_data()).unwrap();
    assert_ne!(first.client_id, second.client_id);

    registry.join(&first, 38).unwrap();
    registry.join(&second, 38).unwrap();
    registry.send_data(&first, 1, vec![1.0; 50]).unwrap();
    assert!(matches!(
        registry.receive_data(&second, 1),
        Err(BrokerError::NotFound(_))
    ));
    assert_eq!(registry.receive_data(&first, 1).unwrap(), vec![1.0; 50]);
}

#[test]
fn invariant_repeated_receive_without_send_is_not_found() {
    let registry = Registry::new();
    let id = registry.create(sample_data()).unwrap();
    registry.send_data(&id, 1, vec![1.0; 50]).unwrap();
    registry.receive_data(&id, 1).unwrap();
    assert!(matches!(
        registry.receive_data(&id, 1),
        Err(BrokerError::NotFound(_))
    ));
}

#[test]
fn invariant_joiner_owns_complement_of_initiator_variables() {
    let mut data = sample_data();
    data.output_variables_id = vec![2, 3];
    data.output_variables_size = vec![8, 8];
    let registry = Registry::new();
    let id = registry.create(data).unwrap();
    registry.join(&id, 38).unwrap();

    // The initiator owns var 1 (declared input); ending as initiator must
    // not disturb the invitee's vars 2 and 3.
    registry.send_data(&id, 2, vec![1.0]).unwrap();
    registry.send_data(&id, 3, vec![1.0]).unwrap();
    registry.end_session(&id, 35).unwrap();
    assert_eq!(registry.peek_flag(&id, 2).unwrap(), 1);
    assert_eq!(registry.peek_flag(&id, 3).unwrap(), 1);
}

#[test]
fn round_trip_preserves_arbitrary_float_sequences() {
    let registry = Registry::new();
    let id = registry.create(sample_data()).unwrap();

    let xs: Vec<f64> = vec![0.0, -1.5, 3.25, f64::MAX, f64::MIN_POSITIVE];
    let bytes = broker_core::codec::encode(&xs);
    let decoded = broker_core::codec::decode(&bytes).unwrap();
    registry.send_data(&id, 1, decoded).unwrap();
    assert_eq!(registry.receive_data(&id, 1).unwrap(), xs);
}
