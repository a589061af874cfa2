pub mod fixtures;
pub mod integration;
pub mod unit;

/// Test utilities shared across the suite: mainly token generation, since
/// most controller/service tests need an `AuthContext`-shaped JWT without
/// going through a live login flow.
pub mod helpers {
    use sentrywear_backend::config::AuthSettings;
    use sentrywear_backend::middleware::{generate_access_token, generate_refresh_token};
    use sentrywear_backend::models::user::Role;
    use uuid::Uuid;

    pub fn test_auth_settings() -> AuthSettings {
        AuthSettings {
            access_token_ttl_seconds: 3600,
            refresh_token_ttl_seconds: 86400,
            access_token_secret: "test-access-secret".to_string(),
            refresh_token_secret: "test-refresh-secret".to_string(),
        }
    }

    pub fn access_token_for(user_id: Uuid, email: &str, role: Role) -> String {
        generate_access_token(user_id, email, role, &test_auth_settings()).expect("token generation")
    }

    pub fn refresh_token_for(user_id: Uuid, email: &str, role: Role) -> String {
        generate_refresh_token(user_id, email, role, &test_auth_settings()).expect("token generation")
    }
}
