use axum::extract::Extension;
use loco_rs::prelude::*;
use serde_json::json;

use crate::app_state;
use crate::errors::AppResult;
use crate::middleware::{protect, AuthContext};
use crate::models::device::Device;
use crate::models::user::User;
use crate::services::ingestion_service::{self, IngestPayload};

pub fn routes() -> Routes {
    Routes::new()
        .prefix("data")
        .add("/", post(ingest))
        .add("/devices", protect(get(devices)))
        .add("/employees", protect(get(employees)))
}

/// `POST /data` — public device endpoint, no bearer token (spec section
/// 6): a device authenticates implicitly by presenting a known serial.
async fn ingest(State(ctx): State<AppContext>, Json(payload): Json<IngestPayload>) -> AppResult<Json<serde_json::Value>> {
    let settings = app_state::app_settings();
    let bus = app_state::event_bus();

    let outcome = ingestion_service::ingest(&ctx.db, bus, settings, payload).await?;

    Ok(Json(json!({
        "data": {
            "vital": outcome.vital,
            "alerts": outcome.alerts,
            "attendance": outcome.attendance,
        }
    })))
}

async fn devices(State(ctx): State<AppContext>, Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    let devices = if auth.role.is_supervisor() {
        Device::list_all(&ctx.db).await?
    } else {
        Device::list_for_user(&ctx.db, auth.user_id).await?
    };
    Ok(Json(json!({ "data": devices })))
}

async fn employees(State(ctx): State<AppContext>, Extension(_auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    let employees = User::list_employees(&ctx.db).await?;
    Ok(Json(json!({ "data": employees })))
}
