use axum::{extract::Request, http::header, middleware::Next, response::Response};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state;
use crate::config::AuthSettings;
use crate::errors::AppError;
use crate::models::user::Role;

/// Claims carried by both the short-lived access token and the long-lived
/// refresh token. `token_type` discriminates the two so a refresh token
/// cannot be replayed as an access token, per spec section 4.B.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub token_type: TokenType,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// `{user_id, role}` attached to the request context by the identity
/// middleware. Both the HTTP facade and the socket facade build one of
/// these and hand it to the same authorisation predicate.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

pub fn generate_access_token(user_id: Uuid, email: &str, role: Role, settings: &AuthSettings) -> Result<String, AppError> {
    generate_token(
        user_id,
        email,
        role,
        TokenType::Access,
        settings.access_token_ttl_seconds,
        &settings.access_token_secret,
    )
}

pub fn generate_refresh_token(user_id: Uuid, email: &str, role: Role, settings: &AuthSettings) -> Result<String, AppError> {
    generate_token(
        user_id,
        email,
        role,
        TokenType::Refresh,
        settings.refresh_token_ttl_seconds,
        &settings.refresh_token_secret,
    )
}

fn generate_token(
    user_id: Uuid,
    email: &str,
    role: Role,
    token_type: TokenType,
    ttl_seconds: u64,
    secret: &str,
) -> Result<String, AppError> {
    let now = chrono::Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role,
        token_type,
        exp: now + ttl_seconds as usize,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref())).map_err(AppError::from)
}

/// Validate a bearer token against the given secret and require it carry
/// `expected_type`. Shared by the HTTP middleware and the socket
/// handshake so both surfaces reject tokens identically.
pub fn validate_token(token: &str, secret: &str, expected_type: TokenType) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)?;

    if data.claims.token_type != expected_type {
        return Err(AppError::Unauthenticated("wrong token type".to_string()));
    }

    Ok(data.claims)
}

pub fn extract_bearer(request: &Request) -> Option<String> {
    let header_value = request.headers().get(header::AUTHORIZATION)?;
    let as_str = header_value.to_str().ok()?;
    as_str.strip_prefix("Bearer ").map(str::to_string)
}

/// Identity middleware: validates the access token and attaches
/// `AuthContext` to request extensions before any handler runs. Reads
/// `AuthSettings` from the process-wide `app_state` singleton (see
/// `app_state.rs`) rather than axum `State`, so it can be layered onto
/// loco's `AppContext`-typed router with a plain `from_fn`.
pub async fn jwt_auth_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let token = extract_bearer(&request).ok_or_else(|| AppError::Unauthenticated("missing bearer token".to_string()))?;

    let settings = &app_state::app_settings().auth;
    let claims = validate_token(&token, &settings.access_token_secret, TokenType::Access)?;
    request.extensions_mut().insert(AuthContext::from(claims));

    Ok(next.run(request).await)
}
