use axum::extract::{Extension, Path, Query};
use loco_rs::prelude::*;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::app_state;
use crate::errors::{AppError, AppResult};
use crate::middleware::{protect, AuthContext};
use crate::models::alert::{Alert, AlertFilter, AlertType, Severity};
use crate::services::alert_service;
use crate::services::authz::{self, Action, Target};

// `/alerts/trends` is not routed: day-over-day movement is historical
// analytics, which the non-goals exclude. `/stats` and `/hourly/:date`
// stay in scope as single-snapshot aggregates.
pub fn routes() -> Routes {
    Routes::new()
        .prefix("alerts")
        .add("/", protect(get(list)))
        .add("/unacknowledged", protect(get(unacknowledged)))
        .add("/critical", protect(get(critical)))
        .add("/stats", protect(get(stats)))
        .add("/hourly/:date", protect(get(hourly)))
        .add("/user/:id", protect(get(for_user)))
        .add("/:id", protect(get(show)))
        .add("/acknowledge", protect(post(bulk_acknowledge)))
        .add("/:id/acknowledge", protect(put(acknowledge)))
        .add("/:id/resolve", protect(put(resolve)))
        .add("/cleanup", protect(delete(cleanup)))
        .add("/clear-all", protect(delete(clear_all)))
}

#[derive(Debug, Deserialize, Default)]
struct ListQuery {
    severity: Option<String>,
    #[serde(rename = "type")]
    alert_type: Option<String>,
    acknowledged: Option<bool>,
    resolved: Option<bool>,
    device_id: Option<Uuid>,
    page: Option<u64>,
    per_page: Option<u64>,
}

impl ListQuery {
    fn into_filter(self) -> AppResult<AlertFilter> {
        Ok(AlertFilter {
            severity: self.severity.map(|s| s.parse::<Severity>()).transpose()?,
            alert_type: self.alert_type.map(|s| s.parse::<AlertType>()).transpose()?,
            acknowledged: self.acknowledged,
            resolved: self.resolved,
            user_id: None,
            device_id: self.device_id,
            since: None,
            until: None,
            page: self.page.unwrap_or(1),
            per_page: self.per_page.unwrap_or(25),
        })
    }
}

async fn list(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let filter = q.into_filter()?;
    let (alerts, total_pages) = alert_service::list(&ctx.db, &filter, &auth).await?;
    Ok(Json(json!({ "data": alerts, "meta": { "page": filter.page, "total_pages": total_pages } })))
}

async fn unacknowledged(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
) -> AppResult<Json<serde_json::Value>> {
    let filter = AlertFilter {
        acknowledged: Some(false),
        user_id: if auth.role.is_supervisor() { None } else { Some(auth.user_id) },
        per_page: 100,
        ..Default::default()
    };
    let (alerts, _) = Alert::list(&ctx.db, &filter).await?;
    Ok(Json(json!({ "data": alerts })))
}

async fn critical(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view critical alerts across employees".to_string()));
    }
    let alerts = Alert::critical_unresolved(&ctx.db, 100).await?;
    Ok(Json(json!({ "data": alerts })))
}

async fn stats(State(ctx): State<AppContext>, Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    let stats = alert_service::stats(&ctx.db, &auth).await?;
    Ok(Json(json!({ "data": stats })))
}

async fn hourly(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(date): Path<chrono::NaiveDate>,
) -> AppResult<Json<serde_json::Value>> {
    let buckets = alert_service::hourly(&ctx.db, date, &auth).await?;
    Ok(Json(json!({ "data": { "date": date, "hourly": buckets } })))
}

async fn for_user(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::owned_by(user_id)) {
        return Err(AppError::Forbidden("not permitted to view this user's alerts".to_string()));
    }
    let alerts = Alert::for_user(&ctx.db, user_id, 100).await?;
    Ok(Json(json!({ "data": alerts })))
}

async fn show(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let model = Alert::find_by_id(&ctx.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("alert not found".to_string()))?;

    if !authz::allow(Action::Read, &auth, Target::owned_by(model.user_id)) {
        return Err(AppError::Forbidden("not permitted to view this alert".to_string()));
    }

    let alert = Alert::try_from(model)?;
    Ok(Json(json!({ "data": alert })))
}

#[derive(Debug, Deserialize)]
struct BulkAcknowledgeRequest {
    alert_ids: Vec<Uuid>,
}

async fn bulk_acknowledge(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<BulkAcknowledgeRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let acknowledged = alert_service::bulk_acknowledge(&ctx.db, &req.alert_ids, &auth).await?;
    for alert in &acknowledged {
        app_state::event_bus().publish_alert_acknowledged(alert, None).await;
    }
    Ok(Json(json!({ "data": acknowledged })))
}

async fn acknowledge(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let alert = alert_service::acknowledge(&ctx.db, id, &auth).await?;
    app_state::event_bus().publish_alert_acknowledged(&alert, None).await;
    Ok(Json(json!({ "data": alert })))
}

async fn resolve(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let alert = alert_service::resolve(&ctx.db, id, &auth).await?;
    app_state::event_bus().publish_alert_resolved(&alert).await;
    Ok(Json(json!({ "data": alert })))
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
    let days = q.days.unwrap_or(90);
    let cutoff = chrono::Utc::now().naive_utc() - chrono::Duration::days(days);
    let removed = alert_service::cleanup_older_than(&ctx.db, cutoff, &auth).await?;
    Ok(Json(json!({ "data": { "removed": removed } })))
}

async fn clear_all(State(ctx): State<AppContext>, Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    let removed = alert_service::clear_all(&ctx.db, &auth).await?;
    Ok(Json(json!({ "data": { "removed": removed } })))
}
