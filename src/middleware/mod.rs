pub mod auth;
pub mod cors;

pub use auth::{
    generate_access_token, generate_refresh_token, jwt_auth_middleware, validate_token, AuthContext, Claims, TokenType,
};
pub use cors::cors_middleware;

use axum::routing::MethodRouter;
use loco_rs::app::AppContext;

/// Wraps a route so it requires a valid access token, attaching
/// `AuthContext` to request extensions before the handler runs. Applied
/// per-route in each controller's `routes()` rather than globally, so
/// the few public surfaces (device ingestion, login, the health probe)
/// can opt out.
pub fn protect(method_router: MethodRouter<AppContext>) -> MethodRouter<AppContext> {
    method_router.layer(axum::middleware::from_fn(jwt_auth_middleware))
}
