use sentrywear_backend::models::user::Role;
use sentrywear_backend::services::authz::{allow, Action, Target};
use sentrywear_backend::services::event_bus::room_name_allowed;
use sentrywear_backend::sockets::messages::InboundCommand;
use uuid::Uuid;

#[test]
fn every_documented_command_parses_from_its_wire_shape() {
    let user_id = Uuid::new_v4();
    let alert_id = Uuid::new_v4();

    let cases = vec![
        (
            format!(r#"{{"op":"subscribe_vitals","data":{{"user_id":"{user_id}"}}}}"#),
            "subscribe_vitals",
        ),
        (
            format!(r#"{{"op":"unsubscribe_vitals","data":{{"user_id":"{user_id}"}}}}"#),
            "unsubscribe_vitals",
        ),
        (r#"{"op":"join_room","data":{"room":"supervisors"}}"#.to_string(), "join_room"),
        (r#"{"op":"leave_room","data":{"room":"supervisors"}}"#.to_string(), "leave_room"),
        (
            format!(r#"{{"op":"acknowledge_alert","data":{{"id":"{alert_id}"}}}}"#),
            "acknowledge_alert",
        ),
        (
            r#"{"op":"toggle_location_sharing","data":{"enabled":true}}"#.to_string(),
            "toggle_location_sharing",
        ),
        (r#"{"op":"heartbeat"}"#.to_string(), "heartbeat"),
    ];

    for (wire, label) in cases {
        let parsed: Result<InboundCommand, _> = serde_json::from_str(&wire);
        assert!(parsed.is_ok(), "expected {label} to parse from {wire}");
    }
}

#[test]
fn unknown_command_fails_to_parse() {
    let parsed: Result<InboundCommand, _> = serde_json::from_str(r#"{"op":"not_a_real_command"}"#);
    assert!(parsed.is_err());
}

/// End-to-end shape of the `subscribe_vitals` handler's authorisation
/// check (spec section 4.G): an employee may subscribe to their own
/// vitals room but not anyone else's, while the room name itself must
/// also satisfy the allow-listed grammar.
#[test]
fn subscribe_vitals_authorisation_matches_room_grammar() {
    let employee_id = Uuid::new_v4();
    let someone_elses_id = Uuid::new_v4();

    let employee = sentrywear_backend::middleware::AuthContext {
        user_id: employee_id,
        email: "worker@example.com".to_string(),
        role: Role::Employee,
    };

    assert!(allow(Action::Read, &employee, Target::owned_by(employee_id)));
    assert!(room_name_allowed(&format!("vitals_{employee_id}")));

    assert!(!allow(Action::Read, &employee, Target::owned_by(someone_elses_id)));
}
