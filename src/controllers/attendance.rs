use axum::extract::{Extension, Path, Query};
use loco_rs::prelude::*;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::app_state;
use crate::errors::{AppError, AppResult};
use crate::middleware::{protect, AuthContext};
use crate::models::attendance::{AttendanceDay, AttendanceStatus};
use crate::services::attendance_service;
use crate::services::authz::{self, Action, Target};

// `/attendance/trends` is not routed: it's a historical-analytics view
// (day-over-day/week-over-week movement), which the non-goals exclude
// ("historical analytics beyond simple aggregates"). `/stats` and the
// exception reads below stay in scope as single-snapshot aggregates.
pub fn routes() -> Routes {
    Routes::new()
        .prefix("attendance")
        .add("/today", protect(get(today)))
        .add("/history", protect(get(history)))
        .add("/date/:date", protect(get(for_date)))
        .add("/summary", protect(get(summary)))
        .add("/stats", protect(get(stats)))
        .add("/late-arrivals/:date", protect(get(late_arrivals)))
        .add("/early-departures/:date", protect(get(early_departures)))
        .add("/overtime/:date", protect(get(overtime)))
        .add("/user/:id/calendar", protect(get(calendar)))
        .add("/export", protect(get(export)))
        .add("/:id/:date/status", protect(put(override_status)))
        .add("/mark-absent/:date", protect(post(mark_absent)))
}

async fn today(State(ctx): State<AppContext>, Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    let date = chrono::Utc::now().naive_utc().date();
    let record = attendance_service::for_user(&ctx.db, auth.user_id, date, &auth).await?;
    Ok(Json(json!({ "data": record })))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    user_id: Option<Uuid>,
    limit: Option<u64>,
}

async fn history(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Query(q): Query<HistoryQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let user_id = q.user_id.unwrap_or(auth.user_id);
    let limit = q.limit.unwrap_or(30).clamp(1, 365);
    let records = attendance_service::history(&ctx.db, user_id, limit, &auth).await?;
    Ok(Json(json!({ "data": records })))
}

async fn for_date(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(date): Path<chrono::NaiveDate>,
) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view the roster for a date".to_string()));
    }
    let records = AttendanceDay::for_all_on(&ctx.db, date).await?;
    Ok(Json(json!({ "data": records })))
}

async fn summary(State(ctx): State<AppContext>, Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view the attendance summary".to_string()));
    }

    let date = chrono::Utc::now().naive_utc().date();
    let records = AttendanceDay::for_all_on(&ctx.db, date).await?;
    let present = records.iter().filter(|r| r.status == AttendanceStatus::Present).count();
    let absent = records.iter().filter(|r| r.status == AttendanceStatus::Absent).count();
    let partial = records.iter().filter(|r| r.status == AttendanceStatus::Partial).count();

    Ok(Json(json!({ "data": { "date": date, "present": present, "absent": absent, "partial": partial } })))
}

#[derive(Debug, Deserialize)]
struct DateQuery {
    date: Option<chrono::NaiveDate>,
}

async fn stats(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Query(q): Query<DateQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let date = q.date.unwrap_or_else(|| chrono::Utc::now().naive_utc().date());
    let stats = attendance_service::stats(&ctx.db, date, &auth).await?;
    Ok(Json(json!({ "data": stats })))
}

async fn late_arrivals(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(date): Path<chrono::NaiveDate>,
) -> AppResult<Json<serde_json::Value>> {
    let records = attendance_service::late_arrivals(&ctx.db, date, &auth).await?;
    Ok(Json(json!({ "data": records })))
}

async fn early_departures(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(date): Path<chrono::NaiveDate>,
) -> AppResult<Json<serde_json::Value>> {
    let records = attendance_service::early_departures(&ctx.db, date, &auth).await?;
    Ok(Json(json!({ "data": records })))
}

async fn overtime(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(date): Path<chrono::NaiveDate>,
) -> AppResult<Json<serde_json::Value>> {
    let records = attendance_service::overtime(&ctx.db, date, &auth).await?;
    Ok(Json(json!({ "data": records })))
}

#[derive(Debug, Deserialize)]
struct CalendarQuery {
    year: Option<i32>,
    month: Option<u32>,
}

async fn calendar(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
    Query(q): Query<CalendarQuery>,
) -> AppResult<Json<serde_json::Value>> {
    use chrono::Datelike;
    let today = chrono::Utc::now().naive_utc().date();
    let year = q.year.unwrap_or_else(|| today.year());
    let month = q.month.unwrap_or_else(|| today.month());
    let records = attendance_service::calendar(&ctx.db, user_id, year, month, &auth).await?;
    Ok(Json(json!({ "data": records })))
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    user_id: Option<Uuid>,
    from: Option<chrono::NaiveDate>,
    to: Option<chrono::NaiveDate>,
}

async fn export(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Query(q): Query<ExportQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let user_id = q.user_id.unwrap_or(auth.user_id);
    let to = q.to.unwrap_or_else(|| chrono::Utc::now().naive_utc().date());
    let from = q.from.unwrap_or_else(|| to - chrono::Duration::days(30));
    let records = attendance_service::export(&ctx.db, user_id, from, to, &auth).await?;
    Ok(Json(json!({ "data": records })))
}

#[derive(Debug, Deserialize)]
struct OverrideStatusRequest {
    status: String,
}

async fn override_status(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path((user_id, date)): Path<(Uuid, chrono::NaiveDate)>,
    Json(req): Json<OverrideStatusRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let status: AttendanceStatus = req.status.parse()?;
    let record = attendance_service::override_status(&ctx.db, user_id, date, status, &auth).await?;
    app_state::event_bus().publish_attendance_update(&record).await;
    Ok(Json(json!({ "data": record })))
}

async fn mark_absent(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(date): Path<chrono::NaiveDate>,
) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::OverrideAttendance, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may run the absence sweep".to_string()));
    }
    let inserted = attendance_service::run_daily_sweep(&ctx.db, date).await?;
    Ok(Json(json!({ "data": { "inserted": inserted } })))
}
