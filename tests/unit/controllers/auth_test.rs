use sentrywear_backend::middleware::{validate_token, TokenType};
use sentrywear_backend::models::user::Role;
use uuid::Uuid;

use crate::helpers::{access_token_for, refresh_token_for, test_auth_settings};

#[test]
fn access_token_round_trips_claims() {
    let user_id = Uuid::new_v4();
    let token = access_token_for(user_id, "worker@example.com", Role::Employee);

    let claims = validate_token(&token, &test_auth_settings().access_token_secret, TokenType::Access).unwrap();

    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.email, "worker@example.com");
    assert_eq!(claims.role, Role::Employee);
}

#[test]
fn refresh_token_rejected_as_access_token() {
    let user_id = Uuid::new_v4();
    let token = refresh_token_for(user_id, "worker@example.com", Role::Employee);

    let result = validate_token(&token, &test_auth_settings().refresh_token_secret, TokenType::Access);
    assert!(result.is_err());
}

#[test]
fn token_signed_with_wrong_secret_is_rejected() {
    let user_id = Uuid::new_v4();
    let token = access_token_for(user_id, "worker@example.com", Role::Employee);

    let result = validate_token(&token, "not-the-real-secret", TokenType::Access);
    assert!(result.is_err());
}

#[test]
fn supervisor_role_survives_the_round_trip() {
    let user_id = Uuid::new_v4();
    let token = access_token_for(user_id, "lead@example.com", Role::Supervisor);

    let claims = validate_token(&token, &test_auth_settings().access_token_secret, TokenType::Access).unwrap();
    assert_eq!(claims.role, Role::Supervisor);
}
