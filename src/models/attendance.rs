use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::_entities::{attendance, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Partial,
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Partial => "partial",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = crate::errors::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "present" => AttendanceStatus::Present,
            "absent" => AttendanceStatus::Absent,
            "partial" => AttendanceStatus::Partial,
            other => {
                return Err(crate::errors::AppError::Internal(format!(
                    "unknown attendance status: {other}"
                )))
            }
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceDay {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: chrono::NaiveDate,
    pub check_in_time: Option<chrono::NaiveDateTime>,
    pub check_out_time: Option<chrono::NaiveDateTime>,
    pub total_hours: Option<Decimal>,
    pub status: AttendanceStatus,
}

impl TryFrom<attendance::Model> for AttendanceDay {
    type Error = crate::errors::AppError;

    fn try_from(model: attendance::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            date: model.date,
            check_in_time: model.check_in_time,
            check_out_time: model.check_out_time,
            total_hours: model.total_hours,
            status: model.status.parse()?,
        })
    }
}

/// Rounds a duration in hours to one decimal place, matching the state
/// machine's `recompute total_hours` step (spec section 4.E).
fn hours_between(check_in: chrono::NaiveDateTime, check_out: chrono::NaiveDateTime) -> Decimal {
    let seconds = (check_out - check_in).num_seconds().max(0);
    let hours = Decimal::from(seconds) / Decimal::from(3600);
    hours.round_dp(1)
}

impl AttendanceDay {
    /// Read-then-write transition for a single inbound reading's timestamp,
    /// applied within the ingestion pipeline's transaction (spec section
    /// 4.E). Returns `Ok(Some(_))` when the row changed, `Ok(None)` if the
    /// row was untouched (never happens on this path, kept for symmetry
    /// with the sweep's idempotency semantics).
    pub async fn apply_reading(
        txn: &DatabaseTransaction,
        user_id: Uuid,
        timestamp: chrono::NaiveDateTime,
    ) -> AppResult<AttendanceDay> {
        let date = timestamp.date();

        let existing = Attendance::find()
            .filter(attendance::Column::UserId.eq(user_id))
            .filter(attendance::Column::Date.eq(date))
            .one(txn)
            .await?;

        let now = chrono::Utc::now().naive_utc();

        let saved = match existing {
            None => {
                let model = attendance::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    date: Set(date),
                    check_in_time: Set(Some(timestamp)),
                    check_out_time: Set(None),
                    total_hours: Set(None),
                    status: Set(AttendanceStatus::Present.to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                model.insert(txn).await?
            }
            Some(row) if row.check_in_time.is_some() && row.check_out_time.is_none() => {
                let check_in = row.check_in_time.expect("checked above");
                let total_hours = hours_between(check_in, timestamp);
                let mut active: attendance::ActiveModel = row.into();
                active.check_out_time = Set(Some(timestamp));
                active.total_hours = Set(Some(total_hours));
                active.updated_at = Set(now);
                active.update(txn).await?
            }
            Some(row) => {
                let check_in = row.check_in_time.unwrap_or(timestamp);
                let existing_check_out = row.check_out_time.unwrap_or(timestamp);
                let new_check_out = existing_check_out.max(timestamp);
                let total_hours = hours_between(check_in, new_check_out);
                let mut active: attendance::ActiveModel = row.into();
                active.check_out_time = Set(Some(new_check_out));
                active.total_hours = Set(Some(total_hours));
                active.updated_at = Set(now);
                active.update(txn).await?
            }
        };

        AttendanceDay::try_from(saved)
    }

    /// Daily absent sweep: inserts `absent` for every employee with no row
    /// for `date`. Idempotent under the `(user_id, date)` unique index —
    /// concurrent/repeated runs for the same date are safe no-ops for users
    /// that already have a row.
    pub async fn mark_absent_sweep(db: &DatabaseConnection, date: chrono::NaiveDate) -> AppResult<u64> {
        let employees = Users::find().filter(users_role_employee()).all(db).await?;

        let existing_user_ids: std::collections::HashSet<Uuid> = Attendance::find()
            .filter(attendance::Column::Date.eq(date))
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.user_id)
            .collect();

        let now = chrono::Utc::now().naive_utc();
        let mut inserted = 0u64;

        for employee in employees {
            if existing_user_ids.contains(&employee.id) {
                continue;
            }

            let model = attendance::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(employee.id),
                date: Set(date),
                check_in_time: Set(None),
                check_out_time: Set(None),
                total_hours: Set(None),
                status: Set(AttendanceStatus::Absent.to_string()),
                created_at: Set(now),
                updated_at: Set(now),
            };

            // Races with a concurrent sweep or a late-arriving reading are
            // resolved by the unique index; either loses this insert and
            // that's fine, the row already exists.
            if model.insert(db).await.is_ok() {
                inserted += 1;
            }
        }

        Ok(inserted)
    }

    /// Supervisor manual override. Status is never set to `partial` by
    /// anything but this path (spec section 4.E).
    pub async fn set_status(
        db: &DatabaseConnection,
        user_id: Uuid,
        date: chrono::NaiveDate,
        status: AttendanceStatus,
    ) -> AppResult<AttendanceDay> {
        let existing = Attendance::find()
            .filter(attendance::Column::UserId.eq(user_id))
            .filter(attendance::Column::Date.eq(date))
            .one(db)
            .await?;

        let now = chrono::Utc::now().naive_utc();

        let saved = match existing {
            Some(row) => {
                let mut active: attendance::ActiveModel = row.into();
                active.status = Set(status.to_string());
                active.updated_at = Set(now);
                active.update(db).await?
            }
            None => {
                let model = attendance::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    date: Set(date),
                    check_in_time: Set(None),
                    check_out_time: Set(None),
                    total_hours: Set(None),
                    status: Set(status.to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                model.insert(db).await?
            }
        };

        AttendanceDay::try_from(saved)
    }

    pub async fn for_user_on(
        db: &DatabaseConnection,
        user_id: Uuid,
        date: chrono::NaiveDate,
    ) -> AppResult<Option<AttendanceDay>> {
        let model = Attendance::find()
            .filter(attendance::Column::UserId.eq(user_id))
            .filter(attendance::Column::Date.eq(date))
            .one(db)
            .await?;
        model.map(AttendanceDay::try_from).transpose()
    }

    pub async fn history_for_user(
        db: &DatabaseConnection,
        user_id: Uuid,
        limit: u64,
    ) -> AppResult<Vec<AttendanceDay>> {
        let models = Attendance::find()
            .filter(attendance::Column::UserId.eq(user_id))
            .order_by_desc(attendance::Column::Date)
            .limit(limit)
            .all(db)
            .await?;
        models.into_iter().map(AttendanceDay::try_from).collect()
    }

    pub async fn for_all_on(db: &DatabaseConnection, date: chrono::NaiveDate) -> AppResult<Vec<AttendanceDay>> {
        let models = Attendance::find()
            .filter(attendance::Column::Date.eq(date))
            .all(db)
            .await?;
        models.into_iter().map(AttendanceDay::try_from).collect()
    }

    /// Inclusive date range, used by the calendar and export reads.
    pub async fn for_user_between(
        db: &DatabaseConnection,
        user_id: Uuid,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> AppResult<Vec<AttendanceDay>> {
        let models = Attendance::find()
            .filter(attendance::Column::UserId.eq(user_id))
            .filter(attendance::Column::Date.gte(from))
            .filter(attendance::Column::Date.lte(to))
            .order_by_asc(attendance::Column::Date)
            .all(db)
            .await?;
        models.into_iter().map(AttendanceDay::try_from).collect()
    }

    /// Rows still open past `idle_checkout_minutes` relative to `now`,
    /// used by the attendance sweep worker to force a checkout.
    pub async fn open_past_idle_cutoff(
        db: &DatabaseConnection,
        cutoff: chrono::NaiveDateTime,
    ) -> AppResult<Vec<AttendanceDay>> {
        let models = Attendance::find()
            .filter(attendance::Column::CheckInTime.is_not_null())
            .filter(attendance::Column::CheckOutTime.is_null())
            .filter(attendance::Column::CheckInTime.lt(cutoff))
            .all(db)
            .await?;
        models.into_iter().map(AttendanceDay::try_from).collect()
    }

    pub async fn force_checkout(db: &DatabaseConnection, id: Uuid, at: chrono::NaiveDateTime) -> AppResult<AttendanceDay> {
        let row = Attendance::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| crate::errors::AppError::NotFound("attendance row not found".to_string()))?;

        let check_in = row.check_in_time.unwrap_or(at);
        let total_hours = hours_between(check_in, at);

        let mut active: attendance::ActiveModel = row.into();
        active.check_out_time = Set(Some(at));
        active.total_hours = Set(Some(total_hours));
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        let updated = active.update(db).await?;
        AttendanceDay::try_from(updated)
    }

    pub fn total_hours_f64(&self) -> Option<f64> {
        self.total_hours.and_then(|d| d.to_f64())
    }
}

fn users_role_employee() -> sea_orm::Condition {
    Condition::all().add(crate::models::_entities::users::Column::Role.eq("employee"))
}
