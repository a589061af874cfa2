pub mod handler;
pub mod messages;

use axum::routing::get;
use axum::Router;
use loco_rs::app::AppContext;

/// Raw axum sub-router for the `/ws` upgrade, merged directly onto the
/// loco router in `app.rs` — loco's `Routes` DSL has no websocket-upgrade
/// primitive (spec section 4.H/4.I ambient note).
pub fn router() -> Router<AppContext> {
    Router::new().route("/ws", get(handler::upgrade))
}
