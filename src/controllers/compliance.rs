use axum::extract::{Extension, Path, Query};
use loco_rs::prelude::*;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::middleware::{protect, AuthContext};
use crate::models::compliance::{ComplianceFilter, ComplianceRecord, NewComplianceRecord, RiskLevel};
use crate::services::authz::{self, Action, Target};

pub fn routes() -> Routes {
    Routes::new()
        .prefix("compliance")
        .add("/", protect(get(list)))
        .add("/", protect(post(create)))
        .add("/unreviewed", protect(get(unreviewed)))
        .add("/high-risk", protect(get(high_risk)))
        .add("/stats", protect(get(stats)))
        .add("/:id", protect(get(show)))
        .add("/:id/review", protect(put(review)))
        .add("/:id/assign", protect(put(assign)))
}

#[derive(Debug, Deserialize, Default)]
struct ListQuery {
    reviewed: Option<bool>,
    risk_level: Option<String>,
    user_id: Option<Uuid>,
    page: Option<u64>,
    per_page: Option<u64>,
}

async fn list(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let user_id = if auth.role.is_supervisor() { q.user_id } else { Some(auth.user_id) };
    if !authz::allow(Action::Read, &auth, user_id.map(Target::owned_by).unwrap_or_else(Target::unowned)) {
        return Err(AppError::Forbidden("not permitted to view these compliance records".to_string()));
    }

    let filter = ComplianceFilter {
        reviewed: q.reviewed,
        risk_level: q.risk_level.map(|s| s.parse::<RiskLevel>()).transpose()?,
        user_id,
        page: q.page.unwrap_or(1),
        per_page: q.per_page.unwrap_or(25),
    };

    let (records, total_pages) = ComplianceRecord::list(&ctx.db, &filter).await?;
    Ok(Json(json!({ "data": records, "meta": { "page": filter.page, "total_pages": total_pages } })))
}

#[derive(Debug, Deserialize)]
struct CreateComplianceRequest {
    user_id: Uuid,
    category: String,
    narrative: String,
    risk_level: String,
    assigned_to: Option<Uuid>,
}

async fn create(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateComplianceRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::AssignCompliance, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may open a compliance record".to_string()));
    }

    let record = ComplianceRecord::create(
        &ctx.db,
        NewComplianceRecord {
            user_id: req.user_id,
            category: req.category,
            narrative: req.narrative,
            risk_level: req.risk_level.parse()?,
            assigned_to: req.assigned_to,
        },
    )
    .await?;

    Ok(Json(json!({ "data": record })))
}

async fn unreviewed(State(ctx): State<AppContext>, Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view unreviewed compliance records".to_string()));
    }
    let filter = ComplianceFilter {
        reviewed: Some(false),
        per_page: 100,
        ..Default::default()
    };
    let (records, _) = ComplianceRecord::list(&ctx.db, &filter).await?;
    Ok(Json(json!({ "data": records })))
}

async fn high_risk(State(ctx): State<AppContext>, Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view high-risk compliance records".to_string()));
    }
    let records = ComplianceRecord::high_risk(&ctx.db, 100).await?;
    Ok(Json(json!({ "data": records })))
}

async fn stats(State(ctx): State<AppContext>, Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view compliance stats".to_string()));
    }
    let stats = ComplianceRecord::stats(&ctx.db).await?;
    Ok(Json(json!({ "data": stats })))
}

async fn show(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let record = ComplianceRecord::find_by_id(&ctx.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("compliance record not found".to_string()))?;

    if !authz::allow(Action::Read, &auth, Target::owned_by(record.user_id)) {
        return Err(AppError::Forbidden("not permitted to view this compliance record".to_string()));
    }

    Ok(Json(json!({ "data": record })))
}

async fn review(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::ReviewCompliance, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may review compliance records".to_string()));
    }
    let record = ComplianceRecord::review(&ctx.db, id, auth.user_id).await?;
    Ok(Json(json!({ "data": record })))
}

#[derive(Debug, Deserialize)]
struct AssignRequest {
    assignee_id: Uuid,
}

async fn assign(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::AssignCompliance, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may assign compliance records".to_string()));
    }
    let record = ComplianceRecord::assign(&ctx.db, id, req.assignee_id).await?;
    Ok(Json(json!({ "data": record })))
}
