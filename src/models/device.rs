use sea_orm::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::_entities::{devices, prelude::*};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub device_serial: String,
    pub user_id: Uuid,
    pub battery_level: Option<i32>,
    pub last_seen: Option<chrono::NaiveDateTime>,
    pub is_active: bool,
}

impl From<devices::Model> for Device {
    fn from(model: devices::Model) -> Self {
        Self {
            id: model.id,
            device_serial: model.device_serial,
            user_id: model.user_id,
            battery_level: model.battery_level,
            last_seen: model.last_seen,
            is_active: model.is_active,
        }
    }
}

impl Device {
    /// Invariant 1 (spec section 3): a reading must reference an existing,
    /// active device. Used by the ingestion pipeline on every sample.
    pub async fn find_active_by_serial(db: &DatabaseConnection, serial: &str) -> AppResult<Option<devices::Model>> {
        Ok(Devices::find()
            .filter(devices::Column::DeviceSerial.eq(serial))
            .filter(devices::Column::IsActive.eq(true))
            .one(db)
            .await?)
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<Option<Device>> {
        let model = Devices::find_by_id(id).one(db).await?;
        Ok(model.map(Device::from))
    }

    pub async fn list_for_user(db: &DatabaseConnection, user_id: Uuid) -> AppResult<Vec<Device>> {
        let models = Devices::find().filter(devices::Column::UserId.eq(user_id)).all(db).await?;
        Ok(models.into_iter().map(Device::from).collect())
    }

    pub async fn list_all(db: &DatabaseConnection) -> AppResult<Vec<Device>> {
        let models = Devices::find().all(db).await?;
        Ok(models.into_iter().map(Device::from).collect())
    }

    pub async fn touch_last_seen(
        db: &DatabaseConnection,
        id: Uuid,
        battery_level: Option<i32>,
        seen_at: chrono::NaiveDateTime,
    ) -> AppResult<()> {
        let model = Devices::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("device not found".to_string()))?;

        let mut active: devices::ActiveModel = model.into();
        active.last_seen = Set(Some(seen_at));
        if let Some(battery) = battery_level {
            active.battery_level = Set(Some(battery));
        }
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        active.update(db).await?;

        Ok(())
    }
}
