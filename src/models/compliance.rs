use sea_orm::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::_entities::{compliance_records, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "low" => RiskLevel::Low,
            "medium" => RiskLevel::Medium,
            "high" => RiskLevel::High,
            other => return Err(AppError::Internal(format!("unknown risk level: {other}"))),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub narrative: String,
    pub risk_level: RiskLevel,
    pub reviewed: bool,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<chrono::NaiveDateTime>,
    pub assigned_to: Option<Uuid>,
}

impl TryFrom<compliance_records::Model> for ComplianceRecord {
    type Error = AppError;

    fn try_from(model: compliance_records::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            category: model.category,
            narrative: model.narrative,
            risk_level: model.risk_level.parse()?,
            reviewed: model.reviewed,
            reviewed_by: model.reviewed_by,
            reviewed_at: model.reviewed_at,
            assigned_to: model.assigned_to,
        })
    }
}

pub struct NewComplianceRecord {
    pub user_id: Uuid,
    pub category: String,
    pub narrative: String,
    pub risk_level: RiskLevel,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Default, Clone)]
pub struct ComplianceFilter {
    pub reviewed: Option<bool>,
    pub risk_level: Option<RiskLevel>,
    pub user_id: Option<Uuid>,
    pub page: u64,
    pub per_page: u64,
}

impl ComplianceRecord {
    pub async fn create(db: &DatabaseConnection, new: NewComplianceRecord) -> AppResult<ComplianceRecord> {
        let now = chrono::Utc::now().naive_utc();
        let model = compliance_records::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new.user_id),
            category: Set(new.category),
            narrative: Set(new.narrative),
            risk_level: Set(new.risk_level.to_string()),
            reviewed: Set(false),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            assigned_to: Set(new.assigned_to),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = model.insert(db).await?;
        ComplianceRecord::try_from(inserted)
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<Option<ComplianceRecord>> {
        let model = ComplianceRecords::find_by_id(id).one(db).await?;
        model.map(ComplianceRecord::try_from).transpose()
    }

    pub async fn list(db: &DatabaseConnection, filter: &ComplianceFilter) -> AppResult<(Vec<ComplianceRecord>, u64)> {
        let mut query = ComplianceRecords::find();

        if let Some(reviewed) = filter.reviewed {
            query = query.filter(compliance_records::Column::Reviewed.eq(reviewed));
        }
        if let Some(risk_level) = filter.risk_level {
            query = query.filter(compliance_records::Column::RiskLevel.eq(risk_level.to_string()));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(compliance_records::Column::UserId.eq(user_id));
        }

        let per_page = filter.per_page.clamp(1, 200);
        let paginator = query
            .order_by_desc(compliance_records::Column::CreatedAt)
            .paginate(db, per_page);

        let total_pages = paginator.num_pages().await?;
        let page = filter.page.max(1) - 1;
        let models = paginator.fetch_page(page).await?;

        let records = models.into_iter().map(ComplianceRecord::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok((records, total_pages))
    }

    pub async fn high_risk(db: &DatabaseConnection, limit: u64) -> AppResult<Vec<ComplianceRecord>> {
        let models = ComplianceRecords::find()
            .filter(compliance_records::Column::RiskLevel.eq(RiskLevel::High.to_string()))
            .order_by_desc(compliance_records::Column::CreatedAt)
            .limit(limit)
            .all(db)
            .await?;
        models.into_iter().map(ComplianceRecord::try_from).collect()
    }

    pub async fn review(db: &DatabaseConnection, id: Uuid, reviewer_id: Uuid) -> AppResult<ComplianceRecord> {
        let model = ComplianceRecords::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("compliance record not found".to_string()))?;

        let mut active: compliance_records::ActiveModel = model.into();
        active.reviewed = Set(true);
        active.reviewed_by = Set(Some(reviewer_id));
        active.reviewed_at = Set(Some(chrono::Utc::now().naive_utc()));
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        let updated = active.update(db).await?;
        ComplianceRecord::try_from(updated)
    }

    pub async fn assign(db: &DatabaseConnection, id: Uuid, assignee_id: Uuid) -> AppResult<ComplianceRecord> {
        let model = ComplianceRecords::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("compliance record not found".to_string()))?;

        let mut active: compliance_records::ActiveModel = model.into();
        active.assigned_to = Set(Some(assignee_id));
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        let updated = active.update(db).await?;
        ComplianceRecord::try_from(updated)
    }

    pub async fn stats(db: &DatabaseConnection) -> AppResult<ComplianceStats> {
        let total = ComplianceRecords::find().count(db).await?;
        let unreviewed = ComplianceRecords::find()
            .filter(compliance_records::Column::Reviewed.eq(false))
            .count(db)
            .await?;
        let high_risk = ComplianceRecords::find()
            .filter(compliance_records::Column::RiskLevel.eq(RiskLevel::High.to_string()))
            .count(db)
            .await?;

        Ok(ComplianceStats {
            total,
            unreviewed,
            high_risk,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceStats {
    pub total: u64,
    pub unreviewed: u64,
    pub high_risk: u64,
}
