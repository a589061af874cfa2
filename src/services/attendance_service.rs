use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app_state;
use crate::config::AttendanceSettings;
use crate::errors::{AppError, AppResult};
use crate::middleware::AuthContext;
use crate::models::attendance::{AttendanceDay, AttendanceStatus};
use crate::models::user::User;
use crate::services::authz::{self, Action, Target};

pub async fn for_user(db: &DatabaseConnection, user_id: Uuid, date: chrono::NaiveDate, actor: &AuthContext) -> AppResult<Option<AttendanceDay>> {
    if !authz::allow(Action::Read, actor, Target::owned_by(user_id)) {
        return Err(AppError::Forbidden("not permitted to view this attendance record".to_string()));
    }
    AttendanceDay::for_user_on(db, user_id, date).await
}

pub async fn history(db: &DatabaseConnection, user_id: Uuid, limit: u64, actor: &AuthContext) -> AppResult<Vec<AttendanceDay>> {
    if !authz::allow(Action::Read, actor, Target::owned_by(user_id)) {
        return Err(AppError::Forbidden("not permitted to view this attendance history".to_string()));
    }
    AttendanceDay::history_for_user(db, user_id, limit).await
}

/// Supervisor-triggered or operator-scheduled sweep (spec section 4.E).
pub async fn run_daily_sweep(db: &DatabaseConnection, date: chrono::NaiveDate) -> AppResult<u64> {
    AttendanceDay::mark_absent_sweep(db, date).await
}

/// Manual override to `partial`, or any other status — only this path
/// may set `partial` (spec section 4.E).
pub async fn override_status(
    db: &DatabaseConnection,
    user_id: Uuid,
    date: chrono::NaiveDate,
    status: AttendanceStatus,
    actor: &AuthContext,
) -> AppResult<AttendanceDay> {
    if !authz::allow(Action::OverrideAttendance, actor, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may override attendance status".to_string()));
    }
    AttendanceDay::set_status(db, user_id, date, status).await
}

/// Forces a checkout for any row still open past the configured idle
/// window, used by the attendance sweep worker.
pub async fn force_idle_checkouts(
    db: &DatabaseConnection,
    now: chrono::NaiveDateTime,
    settings: &AttendanceSettings,
) -> AppResult<usize> {
    let cutoff = now - chrono::Duration::minutes(settings.idle_checkout_minutes);
    let open_rows = AttendanceDay::open_past_idle_cutoff(db, cutoff).await?;

    let mut forced = 0usize;
    for row in &open_rows {
        AttendanceDay::force_checkout(db, row.id, now).await?;
        forced += 1;
    }

    Ok(forced)
}

fn parse_standard_time(raw: &str) -> AppResult<chrono::NaiveTime> {
    chrono::NaiveTime::parse_from_str(raw, "%H:%M:%S").map_err(|e| AppError::Internal(format!("invalid standard time '{raw}': {e}")))
}

/// Simple day-level aggregate: headcount by status plus the average
/// hours worked among rows that have clocked out (spec section 6).
/// Supervisor-only, same as `/attendance/summary`.
pub async fn stats(db: &DatabaseConnection, date: chrono::NaiveDate, actor: &AuthContext) -> AppResult<Value> {
    if !authz::allow(Action::Read, actor, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view attendance stats".to_string()));
    }

    let employees = User::list_employees(db).await?;
    let records = AttendanceDay::for_all_on(db, date).await?;

    let present = records.iter().filter(|r| r.status == AttendanceStatus::Present).count();
    let absent = records.iter().filter(|r| r.status == AttendanceStatus::Absent).count();
    let partial = records.iter().filter(|r| r.status == AttendanceStatus::Partial).count();

    let completed_hours: Vec<f64> = records.iter().filter_map(|r| r.total_hours_f64()).collect();
    let average_hours = if completed_hours.is_empty() {
        None
    } else {
        Some(completed_hours.iter().sum::<f64>() / completed_hours.len() as f64)
    };

    Ok(json!({
        "date": date,
        "total_employees": employees.len(),
        "present": present,
        "absent": absent,
        "partial": partial,
        "not_yet_recorded": employees.len().saturating_sub(records.len()),
        "average_hours": average_hours,
    }))
}

/// Rows whose `check_in_time` is later than the configured standard
/// start for `date` (spec section 6). Supervisor-only.
pub async fn late_arrivals(
    db: &DatabaseConnection,
    date: chrono::NaiveDate,
    actor: &AuthContext,
) -> AppResult<Vec<AttendanceDay>> {
    if !authz::allow(Action::Read, actor, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view late arrivals".to_string()));
    }

    let standard_start = parse_standard_time(&app_state::app_settings().attendance.standard_start)?;
    let records = AttendanceDay::for_all_on(db, date).await?;
    Ok(records
        .into_iter()
        .filter(|r| r.check_in_time.map(|t| t.time() > standard_start).unwrap_or(false))
        .collect())
}

/// Rows whose `check_out_time` is earlier than the configured standard
/// end for `date` (spec section 6). Supervisor-only.
pub async fn early_departures(
    db: &DatabaseConnection,
    date: chrono::NaiveDate,
    actor: &AuthContext,
) -> AppResult<Vec<AttendanceDay>> {
    if !authz::allow(Action::Read, actor, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view early departures".to_string()));
    }

    let standard_end = parse_standard_time(&app_state::app_settings().attendance.standard_end)?;
    let records = AttendanceDay::for_all_on(db, date).await?;
    Ok(records
        .into_iter()
        .filter(|r| r.check_out_time.map(|t| t.time() < standard_end).unwrap_or(false))
        .collect())
}

/// Rows whose recorded `total_hours` exceeds the configured standard
/// shift length for `date` (spec section 6). Supervisor-only.
pub async fn overtime(db: &DatabaseConnection, date: chrono::NaiveDate, actor: &AuthContext) -> AppResult<Vec<AttendanceDay>> {
    if !authz::allow(Action::Read, actor, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view overtime".to_string()));
    }

    let standard_hours = app_state::app_settings().attendance.standard_hours;
    let records = AttendanceDay::for_all_on(db, date).await?;
    Ok(records
        .into_iter()
        .filter(|r| r.total_hours_f64().map(|h| h > standard_hours).unwrap_or(false))
        .collect())
}

/// Month-bounded read for a single employee's calendar view (spec
/// section 6). Self or supervisor, mirroring `history`.
pub async fn calendar(
    db: &DatabaseConnection,
    user_id: Uuid,
    year: i32,
    month: u32,
    actor: &AuthContext,
) -> AppResult<Vec<AttendanceDay>> {
    if !authz::allow(Action::Read, actor, Target::owned_by(user_id)) {
        return Err(AppError::Forbidden("not permitted to view this user's attendance calendar".to_string()));
    }

    let from = chrono::NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| AppError::validation("invalid year/month"))?;
    let to = if month == 12 {
        chrono::NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        chrono::NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::validation("invalid year/month"))?
    .pred_opt()
    .ok_or_else(|| AppError::Internal("date underflow computing calendar range".to_string()))?;

    AttendanceDay::for_user_between(db, user_id, from, to).await
}

/// Flat record export over an inclusive date range (spec section 6);
/// returned as JSON rather than a file download, matching this backend's
/// other read endpoints.
pub async fn export(
    db: &DatabaseConnection,
    user_id: Uuid,
    from: chrono::NaiveDate,
    to: chrono::NaiveDate,
    actor: &AuthContext,
) -> AppResult<Vec<AttendanceDay>> {
    if !authz::allow(Action::Read, actor, Target::owned_by(user_id)) {
        return Err(AppError::Forbidden("not permitted to export this user's attendance records".to_string()));
    }

    AttendanceDay::for_user_between(db, user_id, from, to).await
}
