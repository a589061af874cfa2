use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::middleware::AuthContext;
use crate::models::_entities::prelude::Alerts;
use crate::models::alert::{Alert, AlertFilter, AlertStats};
use crate::services::authz::{self, Action, Target};

/// Single acknowledge, enforcing ownership per spec section 4.D: an
/// employee may only acknowledge their own alert; a supervisor may
/// acknowledge any. Already-acknowledged alerts are a no-op, not an error.
pub async fn acknowledge(db: &DatabaseConnection, alert_id: Uuid, actor: &AuthContext) -> AppResult<Alert> {
    let existing = Alert::find_by_id(db, alert_id)
        .await?
        .ok_or_else(|| AppError::NotFound("alert not found".to_string()))?;

    if !authz::allow(Action::AcknowledgeAlert, actor, Target::owned_by(existing.user_id)) {
        return Err(AppError::Forbidden("not permitted to acknowledge this alert".to_string()));
    }

    Alert::acknowledge(db, alert_id, actor.user_id).await
}

/// Resolve is supervisor-only and reachable from either `new` or
/// `acknowledged` (spec section 4.D).
pub async fn resolve(db: &DatabaseConnection, alert_id: Uuid, actor: &AuthContext) -> AppResult<Alert> {
    if !authz::allow(Action::ResolveAlert, actor, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may resolve alerts".to_string()));
    }

    Alert::resolve(db, alert_id).await
}

/// Bulk acknowledge: ownership is re-checked per id before applying, and
/// the whole batch is atomic — any forbidden id rolls back the entire
/// operation (spec section 4.D failure semantics).
pub async fn bulk_acknowledge(db: &DatabaseConnection, alert_ids: &[Uuid], actor: &AuthContext) -> AppResult<Vec<Alert>> {
    let txn = db.begin().await?;

    let mut acknowledged = Vec::with_capacity(alert_ids.len());

    for &id in alert_ids {
        let existing = Alerts::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("alert {id} not found")))?;

        if !authz::allow(Action::AcknowledgeAlert, actor, Target::owned_by(existing.user_id)) {
            return Err(AppError::Forbidden(format!("not permitted to acknowledge alert {id}")));
        }

        let alert = Alert::acknowledge_in_txn(&txn, id, actor.user_id).await?;
        acknowledged.push(alert);
    }

    txn.commit().await?;
    Ok(acknowledged)
}

pub async fn list(db: &DatabaseConnection, filter: &AlertFilter, actor: &AuthContext) -> AppResult<(Vec<Alert>, u64)> {
    let mut filter = filter.clone();
    if !actor.role.is_supervisor() {
        filter.user_id = Some(actor.user_id);
    }
    Alert::list(db, &filter).await
}

pub async fn stats(db: &DatabaseConnection, actor: &AuthContext) -> AppResult<AlertStats> {
    if !authz::allow(Action::Read, actor, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view aggregate stats".to_string()));
    }
    Alert::stats(db).await
}

/// Count of alerts raised per hour-of-day on `date` (spec section 6), a
/// single-day snapshot rather than a trend line across days.
pub async fn hourly(db: &DatabaseConnection, date: chrono::NaiveDate, actor: &AuthContext) -> AppResult<[u64; 24]> {
    if !authz::allow(Action::Read, actor, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view the hourly alert breakdown".to_string()));
    }

    let alerts = Alert::for_date(db, date).await?;
    let mut buckets = [0u64; 24];
    for alert in &alerts {
        use chrono::Timelike;
        buckets[alert.timestamp.hour() as usize] += 1;
    }
    Ok(buckets)
}

/// Destructive cleanups are supervisor-only (spec section 4.B).
pub async fn cleanup_older_than(
    db: &DatabaseConnection,
    cutoff: chrono::NaiveDateTime,
    actor: &AuthContext,
) -> AppResult<u64> {
    if !authz::allow(Action::BulkCleanup, actor, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may clean up alerts".to_string()));
    }
    Alert::delete_older_than(db, cutoff).await
}

pub async fn clear_all(db: &DatabaseConnection, actor: &AuthContext) -> AppResult<u64> {
    if !authz::allow(Action::BulkCleanup, actor, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may clear alerts".to_string()));
    }
    Alert::delete_all(db).await
}
