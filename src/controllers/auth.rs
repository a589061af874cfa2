use axum::extract::Extension;
use axum::Json;
use loco_rs::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::app_state;
use crate::errors::{AppError, AppResult};
use crate::middleware::{self, protect, AuthContext, TokenType};
use crate::models::user::{CreateUserRequest, Role, User};

pub fn routes() -> Routes {
    Routes::new()
        .prefix("auth")
        .add("/register", post(register))
        .add("/login", post(login))
        .add("/refresh", post(refresh))
        .add("/change-password", protect(post(change_password)))
        .add("/me", protect(get(me)))
        .add("/validate-token", protect(get(validate_token_route)))
        .add("/logout", protect(post(logout)))
}

#[derive(Debug, Deserialize, Validate)]
struct RegisterRequest {
    #[validate(email)]
    email: String,
    #[validate(length(min = 8))]
    password: String,
    role: Role,
    department: Option<String>,
}

/// At least one lower, one upper, one digit, one symbol (spec section
/// 4.B). Checked by hand rather than a regex: look-around isn't
/// supported by the `regex` crate's finite-automaton engine.
fn password_meets_complexity(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace())
}

#[derive(Debug, Serialize)]
struct TokenPair {
    access_token: String,
    refresh_token: String,
}

async fn register(State(ctx): State<AppContext>, Json(req): Json<RegisterRequest>) -> AppResult<Json<serde_json::Value>> {
    req.validate()?;
    if !password_meets_complexity(&req.password) {
        return Err(AppError::validation(
            "password must contain an uppercase letter, a lowercase letter, a digit, and a symbol",
        ));
    }

    let user = User::create(
        &ctx.db,
        CreateUserRequest {
            email: req.email,
            password: req.password,
            role: req.role,
            department: req.department,
        },
    )
    .await?;

    Ok(Json(json!({ "data": user })))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

/// Login returns `Unauthenticated` uniformly whether the account existed
/// or the password was wrong (spec section 4.B).
async fn login(State(ctx): State<AppContext>, Json(req): Json<LoginRequest>) -> AppResult<Json<serde_json::Value>> {
    let raw = User::find_raw_by_email(&ctx.db, &req.email)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("invalid credentials".to_string()))?;

    let valid = User::verify_password(&req.password, &raw.password_digest)?;
    if !valid || !raw.is_active {
        return Err(AppError::Unauthenticated("invalid credentials".to_string()));
    }

    let role: Role = raw.role.parse()?;
    let settings = &app_state::app_settings().auth;
    let access_token = middleware::generate_access_token(raw.id, &raw.email, role, settings)?;
    let refresh_token = middleware::generate_refresh_token(raw.id, &raw.email, role, settings)?;

    Ok(Json(json!({ "data": TokenPair { access_token, refresh_token } })))
}

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

async fn refresh(State(ctx): State<AppContext>, Json(req): Json<RefreshRequest>) -> AppResult<Json<serde_json::Value>> {
    let settings = &app_state::app_settings().auth;
    let claims = middleware::validate_token(&req.refresh_token, &settings.refresh_token_secret, TokenType::Refresh)?;

    let user = User::find_by_id(&ctx.db, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("unknown user".to_string()))?;

    let access_token = middleware::generate_access_token(user.id, &user.email, user.role, settings)?;
    Ok(Json(json!({ "data": { "access_token": access_token } })))
}

#[derive(Debug, Deserialize)]
struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

async fn change_password(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let raw = User::find_raw_by_id(&ctx.db, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    if !User::verify_password(&req.current_password, &raw.password_digest)? {
        return Err(AppError::Unauthenticated("current password is incorrect".to_string()));
    }

    User::set_password(&ctx.db, auth.user_id, &req.new_password).await?;
    Ok(Json(json!({ "data": { "changed": true } })))
}

async fn me(State(ctx): State<AppContext>, Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    let user = User::find_by_id(&ctx.db, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    let devices = crate::models::device::Device::list_for_user(&ctx.db, auth.user_id).await?;

    Ok(Json(json!({ "data": { "user": user, "devices": devices } })))
}

async fn validate_token_route(Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    Ok(Json(json!({ "data": { "user_id": auth.user_id, "role": auth.role, "valid": true } })))
}

/// Client-side clear; the server holds no session to invalidate.
async fn logout() -> AppResult<Json<serde_json::Value>> {
    Ok(Json(json!({ "data": { "logged_out": true } })))
}
