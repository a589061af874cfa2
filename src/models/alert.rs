use rust_decimal::Decimal;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::_entities::{alerts, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Fall,
    HeartRate,
    Spo2,
    Temperature,
    Co,
    H2s,
    Ch4,
    Offline,
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AlertType::Fall => "fall",
            AlertType::HeartRate => "heart_rate",
            AlertType::Spo2 => "spo2",
            AlertType::Temperature => "temperature",
            AlertType::Co => "co",
            AlertType::H2s => "h2s",
            AlertType::Ch4 => "ch4",
            AlertType::Offline => "offline",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AlertType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "fall" => AlertType::Fall,
            "heart_rate" => AlertType::HeartRate,
            "spo2" => AlertType::Spo2,
            "temperature" => AlertType::Temperature,
            "co" => AlertType::Co,
            "h2s" => AlertType::H2s,
            "ch4" => AlertType::Ch4,
            "offline" => AlertType::Offline,
            other => return Err(AppError::Internal(format!("unknown alert type: {other}"))),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Severity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            other => return Err(AppError::Internal(format!("unknown severity: {other}"))),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub device_id: Uuid,
    pub user_id: Uuid,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub value: Option<Decimal>,
    pub threshold: Option<Decimal>,
    pub acknowledged: bool,
    pub acknowledged_by: Option<Uuid>,
    pub acknowledged_at: Option<chrono::NaiveDateTime>,
    pub resolved: bool,
    pub resolved_at: Option<chrono::NaiveDateTime>,
    pub timestamp: chrono::NaiveDateTime,
}

impl TryFrom<alerts::Model> for Alert {
    type Error = AppError;

    fn try_from(model: alerts::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            device_id: model.device_id,
            user_id: model.user_id,
            alert_type: model.alert_type.parse()?,
            severity: model.severity.parse()?,
            message: model.message,
            value: model.value,
            threshold: model.threshold,
            acknowledged: model.acknowledged,
            acknowledged_by: model.acknowledged_by,
            acknowledged_at: model.acknowledged_at,
            resolved: model.resolved,
            resolved_at: model.resolved_at,
            timestamp: model.timestamp,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewAlert {
    pub device_id: Uuid,
    pub user_id: Uuid,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub value: Option<Decimal>,
    pub threshold: Option<Decimal>,
    pub timestamp: chrono::NaiveDateTime,
}

#[derive(Debug, Default, Clone)]
pub struct AlertFilter {
    pub severity: Option<Severity>,
    pub alert_type: Option<AlertType>,
    pub acknowledged: Option<bool>,
    pub resolved: Option<bool>,
    pub user_id: Option<Uuid>,
    pub device_id: Option<Uuid>,
    pub since: Option<chrono::NaiveDateTime>,
    pub until: Option<chrono::NaiveDateTime>,
    pub page: u64,
    pub per_page: u64,
}

impl Alert {
    pub async fn insert<C: ConnectionTrait>(db: &C, new: NewAlert) -> AppResult<Alert> {
        let model = alerts::ActiveModel {
            id: Set(Uuid::new_v4()),
            device_id: Set(new.device_id),
            user_id: Set(new.user_id),
            alert_type: Set(new.alert_type.to_string()),
            severity: Set(new.severity.to_string()),
            message: Set(new.message),
            value: Set(new.value),
            threshold: Set(new.threshold),
            acknowledged: Set(false),
            acknowledged_by: Set(None),
            acknowledged_at: Set(None),
            resolved: Set(false),
            resolved_at: Set(None),
            timestamp: Set(new.timestamp),
            created_at: Set(chrono::Utc::now().naive_utc()),
        };

        let inserted = model.insert(db).await?;
        Alert::try_from(inserted)
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<Option<alerts::Model>> {
        Ok(Alerts::find_by_id(id).one(db).await?)
    }

    pub async fn list(db: &DatabaseConnection, filter: &AlertFilter) -> AppResult<(Vec<Alert>, u64)> {
        let mut query = Alerts::find();

        if let Some(severity) = filter.severity {
            query = query.filter(alerts::Column::Severity.eq(severity.to_string()));
        }
        if let Some(alert_type) = filter.alert_type {
            query = query.filter(alerts::Column::AlertType.eq(alert_type.to_string()));
        }
        if let Some(acknowledged) = filter.acknowledged {
            query = query.filter(alerts::Column::Acknowledged.eq(acknowledged));
        }
        if let Some(resolved) = filter.resolved {
            query = query.filter(alerts::Column::Resolved.eq(resolved));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(alerts::Column::UserId.eq(user_id));
        }
        if let Some(device_id) = filter.device_id {
            query = query.filter(alerts::Column::DeviceId.eq(device_id));
        }
        if let Some(since) = filter.since {
            query = query.filter(alerts::Column::Timestamp.gte(since));
        }
        if let Some(until) = filter.until {
            query = query.filter(alerts::Column::Timestamp.lte(until));
        }

        let per_page = filter.per_page.clamp(1, 200);
        let paginator = query.order_by_desc(alerts::Column::Timestamp).paginate(db, per_page);

        let total_pages = paginator.num_pages().await?;
        let page = filter.page.max(1) - 1;
        let models = paginator.fetch_page(page).await?;

        let alerts = models.into_iter().map(Alert::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok((alerts, total_pages))
    }

    pub async fn critical_unresolved(db: &DatabaseConnection, limit: u64) -> AppResult<Vec<Alert>> {
        let models = Alerts::find()
            .filter(alerts::Column::Severity.eq(Severity::Critical.to_string()))
            .filter(alerts::Column::Resolved.eq(false))
            .order_by_desc(alerts::Column::Timestamp)
            .limit(limit)
            .all(db)
            .await?;
        models.into_iter().map(Alert::try_from).collect()
    }

    pub async fn for_user(db: &DatabaseConnection, user_id: Uuid, limit: u64) -> AppResult<Vec<Alert>> {
        let models = Alerts::find()
            .filter(alerts::Column::UserId.eq(user_id))
            .order_by_desc(alerts::Column::Timestamp)
            .limit(limit)
            .all(db)
            .await?;
        models.into_iter().map(Alert::try_from).collect()
    }

    /// Every alert raised on `date` (system time zone), for the hourly
    /// breakdown read. Unpaginated: a day's worth of alerts is the bound.
    pub async fn for_date(db: &DatabaseConnection, date: chrono::NaiveDate) -> AppResult<Vec<Alert>> {
        let start = date.and_hms_opt(0, 0, 0).expect("midnight is a valid time");
        let end = start + chrono::Duration::days(1);
        let models = Alerts::find()
            .filter(alerts::Column::Timestamp.gte(start))
            .filter(alerts::Column::Timestamp.lt(end))
            .order_by_asc(alerts::Column::Timestamp)
            .all(db)
            .await?;
        models.into_iter().map(Alert::try_from).collect()
    }

    /// Acknowledging an already-acknowledged alert is a no-op (spec
    /// invariant 3 / testable property 3): the acknowledger and time are
    /// left untouched.
    pub async fn acknowledge(db: &DatabaseConnection, id: Uuid, actor_id: Uuid) -> AppResult<Alert> {
        let model = Alerts::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("alert not found".to_string()))?;

        if model.acknowledged {
            return Alert::try_from(model);
        }

        let mut active: alerts::ActiveModel = model.into();
        active.acknowledged = Set(true);
        active.acknowledged_by = Set(Some(actor_id));
        active.acknowledged_at = Set(Some(chrono::Utc::now().naive_utc()));
        let updated = active.update(db).await?;
        Alert::try_from(updated)
    }

    /// Bulk acknowledge inside a caller-supplied transaction: ownership is
    /// re-checked per id by the lifecycle manager before this is called,
    /// so this step only performs the write.
    pub async fn acknowledge_in_txn(txn: &DatabaseTransaction, id: Uuid, actor_id: Uuid) -> AppResult<Alert> {
        let model = Alerts::find_by_id(id)
            .one(txn)
            .await?
            .ok_or_else(|| AppError::NotFound("alert not found".to_string()))?;

        if model.acknowledged {
            return Alert::try_from(model);
        }

        let mut active: alerts::ActiveModel = model.into();
        active.acknowledged = Set(true);
        active.acknowledged_by = Set(Some(actor_id));
        active.acknowledged_at = Set(Some(chrono::Utc::now().naive_utc()));
        let updated = active.update(txn).await?;
        Alert::try_from(updated)
    }

    pub async fn resolve(db: &DatabaseConnection, id: Uuid) -> AppResult<Alert> {
        let model = Alerts::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("alert not found".to_string()))?;

        let mut active: alerts::ActiveModel = model.into();
        active.resolved = Set(true);
        active.resolved_at = Set(Some(chrono::Utc::now().naive_utc()));
        let updated = active.update(db).await?;
        Alert::try_from(updated)
    }

    pub async fn stats(db: &DatabaseConnection) -> AppResult<AlertStats> {
        let total = Alerts::find().count(db).await?;
        let unacknowledged = Alerts::find().filter(alerts::Column::Acknowledged.eq(false)).count(db).await?;
        let critical = Alerts::find()
            .filter(alerts::Column::Severity.eq(Severity::Critical.to_string()))
            .count(db)
            .await?;
        let unresolved = Alerts::find().filter(alerts::Column::Resolved.eq(false)).count(db).await?;

        Ok(AlertStats {
            total,
            unacknowledged,
            critical,
            unresolved,
        })
    }

    pub async fn delete_older_than(db: &DatabaseConnection, cutoff: chrono::NaiveDateTime) -> AppResult<u64> {
        let result = Alerts::delete_many()
            .filter(alerts::Column::Timestamp.lt(cutoff))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn delete_all(db: &DatabaseConnection) -> AppResult<u64> {
        let result = Alerts::delete_many().exec(db).await?;
        Ok(result.rows_affected)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertStats {
    pub total: u64,
    pub unacknowledged: u64,
    pub critical: u64,
    pub unresolved: u64,
}
