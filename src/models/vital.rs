use rust_decimal::Decimal;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::_entities::{prelude::*, vitals};

/// A single device sample. Immutable once inserted (spec section 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vital {
    pub id: Uuid,
    pub device_id: Uuid,
    pub timestamp: chrono::NaiveDateTime,
    pub heart_rate: Option<i32>,
    pub spo2: Option<i32>,
    pub temperature: Option<Decimal>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub gps_accuracy: Option<Decimal>,
    pub fall_detected: bool,
    pub co: Option<Decimal>,
    pub h2s: Option<Decimal>,
    pub ch4: Option<Decimal>,
}

impl From<vitals::Model> for Vital {
    fn from(model: vitals::Model) -> Self {
        Self {
            id: model.id,
            device_id: model.device_id,
            timestamp: model.timestamp,
            heart_rate: model.heart_rate,
            spo2: model.spo2,
            temperature: model.temperature,
            latitude: model.latitude,
            longitude: model.longitude,
            gps_accuracy: model.gps_accuracy,
            fall_detected: model.fall_detected,
            co: model.co,
            h2s: model.h2s,
            ch4: model.ch4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewVital {
    pub device_id: Uuid,
    pub timestamp: chrono::NaiveDateTime,
    pub heart_rate: Option<i32>,
    pub spo2: Option<i32>,
    pub temperature: Option<Decimal>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub gps_accuracy: Option<Decimal>,
    pub fall_detected: bool,
    pub co: Option<Decimal>,
    pub h2s: Option<Decimal>,
    pub ch4: Option<Decimal>,
}

impl Vital {
    /// Insert a reading within an existing transaction. The caller (the
    /// ingestion pipeline) owns the transaction boundary so the reading,
    /// its derived alerts, and the attendance transition commit together.
    pub async fn insert<C: ConnectionTrait>(db: &C, new: NewVital) -> AppResult<Vital> {
        let model = vitals::ActiveModel {
            id: Set(Uuid::new_v4()),
            device_id: Set(new.device_id),
            timestamp: Set(new.timestamp),
            heart_rate: Set(new.heart_rate),
            spo2: Set(new.spo2),
            temperature: Set(new.temperature),
            latitude: Set(new.latitude),
            longitude: Set(new.longitude),
            gps_accuracy: Set(new.gps_accuracy),
            fall_detected: Set(new.fall_detected),
            co: Set(new.co),
            h2s: Set(new.h2s),
            ch4: Set(new.ch4),
            created_at: Set(chrono::Utc::now().naive_utc()),
        };

        let inserted = model.insert(db).await?;
        Ok(Vital::from(inserted))
    }

    pub async fn latest_for_device(db: &DatabaseConnection, device_id: Uuid) -> AppResult<Option<Vital>> {
        let model = Vitals::find()
            .filter(vitals::Column::DeviceId.eq(device_id))
            .order_by_desc(vitals::Column::Timestamp)
            .one(db)
            .await?;
        Ok(model.map(Vital::from))
    }

    pub async fn history_for_device(
        db: &DatabaseConnection,
        device_id: Uuid,
        limit: u64,
    ) -> AppResult<Vec<Vital>> {
        let models = Vitals::find()
            .filter(vitals::Column::DeviceId.eq(device_id))
            .order_by_desc(vitals::Column::Timestamp)
            .limit(limit)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Vital::from).collect())
    }

    /// Readings carrying at least one abnormal field per the default
    /// threshold policy; used by `/vitals/abnormal`.
    pub async fn abnormal(db: &DatabaseConnection, limit: u64) -> AppResult<Vec<Vital>> {
        let models = Vitals::find()
            .filter(
                Condition::any()
                    .add(vitals::Column::FallDetected.eq(true))
                    .add(vitals::Column::HeartRate.lt(60))
                    .add(vitals::Column::HeartRate.gt(100))
                    .add(vitals::Column::Spo2.lt(95)),
            )
            .order_by_desc(vitals::Column::Timestamp)
            .limit(limit)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Vital::from).collect())
    }

    pub async fn delete_older_than(db: &DatabaseConnection, cutoff: chrono::NaiveDateTime) -> AppResult<u64> {
        let result = Vitals::delete_many()
            .filter(vitals::Column::Timestamp.lt(cutoff))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn delete_all(db: &DatabaseConnection) -> AppResult<u64> {
        let result = Vitals::delete_many().exec(db).await?;
        Ok(result.rows_affected)
    }
}
