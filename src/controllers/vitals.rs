use axum::extract::{Extension, Path, Query};
use loco_rs::prelude::*;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::middleware::{protect, AuthContext};
use crate::models::device::Device;
use crate::models::vital::Vital;
use crate::services::authz::{self, Action, Target};

pub fn routes() -> Routes {
    Routes::new()
        .prefix("vitals")
        .add("/latest", protect(get(latest)))
        .add("/history", protect(get(history)))
        .add("/device/:id", protect(get(for_device)))
        .add("/abnormal", protect(get(abnormal)))
        .add("/locations", protect(get(locations)))
        .add("/summary", protect(get(summary)))
        .add("/cleanup", protect(delete(cleanup)))
        .add("/clear-all", protect(delete(clear_all)))
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<u64>,
}

fn default_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(50).clamp(1, 500)
}

async fn latest(State(ctx): State<AppContext>, Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    let devices = Device::list_for_user(&ctx.db, auth.user_id).await?;
    let Some(device) = devices.into_iter().find(|d| d.is_active) else {
        return Ok(Json(json!({ "data": null })));
    };
    let vital = Vital::latest_for_device(&ctx.db, device.id).await?;
    Ok(Json(json!({ "data": vital })))
}

async fn history(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Query(q): Query<LimitQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let devices = Device::list_for_user(&ctx.db, auth.user_id).await?;
    let Some(device) = devices.into_iter().find(|d| d.is_active) else {
        return Ok(Json(json!({ "data": [] })));
    };
    let history = Vital::history_for_device(&ctx.db, device.id, default_limit(q.limit)).await?;
    Ok(Json(json!({ "data": history })))
}

async fn for_device(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(device_id): Path<Uuid>,
    Query(q): Query<LimitQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let device = Device::find_by_id(&ctx.db, device_id)
        .await?
        .ok_or_else(|| AppError::NotFound("device not found".to_string()))?;

    if !authz::allow(Action::Read, &auth, Target::owned_by(device.user_id)) {
        return Err(AppError::Forbidden("not permitted to view this device's vitals".to_string()));
    }

    let history = Vital::history_for_device(&ctx.db, device_id, default_limit(q.limit)).await?;
    Ok(Json(json!({ "data": history })))
}

async fn abnormal(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Query(q): Query<LimitQuery>,
) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view abnormal readings across all employees".to_string()));
    }
    let readings = Vital::abnormal(&ctx.db, default_limit(q.limit)).await?;
    Ok(Json(json!({ "data": readings })))
}

async fn locations(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view the location roster".to_string()));
    }

    let devices = Device::list_all(&ctx.db).await?;
    let mut rows = Vec::new();
    for device in devices {
        if let Some(vital) = Vital::latest_for_device(&ctx.db, device.id).await? {
            if vital.latitude.is_some() {
                rows.push(json!({ "device_id": device.id, "user_id": device.user_id, "vital": vital }));
            }
        }
    }
    Ok(Json(json!({ "data": rows })))
}

async fn summary(State(ctx): State<AppContext>, Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view the fleet summary".to_string()));
    }

    let devices = Device::list_all(&ctx.db).await?;
    let mut active = 0;
    let mut reporting = 0;
    for device in &devices {
        if device.is_active {
            active += 1;
        }
        if Vital::latest_for_device(&ctx.db, device.id).await?.is_some() {
            reporting += 1;
        }
    }

    Ok(Json(json!({ "data": { "total_devices": devices.len(), "active_devices": active, "reporting_devices": reporting } })))
}

#[derive(Debug, Deserialize)]
struct CleanupQuery {
    days: Option<i64>,
}

async fn cleanup(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Query(q): Query<CleanupQuery>,
) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::BulkCleanup, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may clean up vitals".to_string()));
    }
    let days = q.days.unwrap_or(90);
    let cutoff = chrono::Utc::now().naive_utc() - chrono::Duration::days(days);
    let removed = Vital::delete_older_than(&ctx.db, cutoff).await?;
    Ok(Json(json!({ "data": { "removed": removed } })))
}

async fn clear_all(State(ctx): State<AppContext>, Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::BulkCleanup, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may clear vitals".to_string()));
    }
    let removed = Vital::delete_all(&ctx.db).await?;
    Ok(Json(json!({ "data": { "removed": removed } })))
}
