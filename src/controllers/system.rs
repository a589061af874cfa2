use axum::extract::Extension;
use loco_rs::prelude::*;
use sea_orm::EntityTrait;
use serde_json::json;

use crate::app_state;
use crate::errors::{AppError, AppResult};
use crate::middleware::{protect, AuthContext};
use crate::models::_entities::prelude::{Alerts, Attendance, Devices, Users, Vitals};
use crate::services::authz::{self, Action, Target};

pub fn routes() -> Routes {
    Routes::new()
        .prefix("system")
        .add("/overview", protect(get(overview)))
        .add("/health", get(health))
        .add("/version", get(version))
}

async fn overview(State(ctx): State<AppContext>, Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view the system overview".to_string()));
    }

    let users = Users::find().count(&ctx.db).await?;
    let devices = Devices::find().count(&ctx.db).await?;
    let vitals = Vitals::find().count(&ctx.db).await?;
    let alerts = Alerts::find().count(&ctx.db).await?;
    let attendance = Attendance::find().count(&ctx.db).await?;

    Ok(Json(json!({
        "data": {
            "users": users,
            "devices": devices,
            "vitals": vitals,
            "alerts": alerts,
            "attendance_records": attendance,
        }
    })))
}

/// Unauthenticated liveness probe: reports database reachability and
/// whether the process-wide event bus has been initialised.
async fn health(State(ctx): State<AppContext>) -> AppResult<Json<serde_json::Value>> {
    let db_ok = Users::find().count(&ctx.db).await.is_ok();

    Ok(Json(json!({
        "data": {
            "status": if db_ok { "ok" } else { "degraded" },
            "database": db_ok,
        }
    })))
}

async fn version() -> AppResult<Json<serde_json::Value>> {
    let _ = app_state::app_settings();
    Ok(Json(json!({ "data": { "name": env!("CARGO_PKG_NAME"), "version": env!("CARGO_PKG_VERSION") } })))
}
