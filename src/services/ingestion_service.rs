use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::config::AppSettings;
use crate::errors::{AppError, AppResult};
use crate::models::alert::{Alert, NewAlert};
use crate::models::attendance::AttendanceDay;
use crate::models::device::Device;
use crate::models::vital::{NewVital, Vital};
use crate::services::event_bus::EventBus;
use crate::services::threshold_service;

/// Device payload schema (spec section 6): `device_serial` is required;
/// every reading field is optional, and unknown fields are rejected by
/// `#[serde(deny_unknown_fields)]`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct IngestPayload {
    pub device_serial: String,
    #[validate(range(min = 30, max = 200))]
    pub heart_rate: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub spo2: Option<i32>,
    pub temperature: Option<Decimal>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub gps_accuracy: Option<Decimal>,
    pub fall_detected: Option<bool>,
    pub co: Option<Decimal>,
    pub h2s: Option<Decimal>,
    pub ch4: Option<Decimal>,
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

pub struct IngestOutcome {
    pub vital: Vital,
    pub alerts: Vec<Alert>,
    pub attendance: AttendanceDay,
}

/// Single critical path per inbound sample (spec section 4.F): validate,
/// look up the device, then persist the reading, its derived alerts, and
/// the attendance transition atomically. Fan-out happens strictly after
/// commit and never rolls back the write.
pub async fn ingest(
    db: &DatabaseConnection,
    bus: &EventBus,
    settings: &AppSettings,
    payload: IngestPayload,
) -> AppResult<IngestOutcome> {
    payload.validate()?;
    validate_ranges(&payload)?;

    let device = Device::find_active_by_serial(db, &payload.device_serial)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no active device for serial {}", payload.device_serial)))?;

    let timestamp = payload
        .timestamp
        .map(|dt| dt.naive_utc())
        .unwrap_or_else(|| chrono::Utc::now().naive_utc());

    let txn = db.begin().await?;

    let vital = Vital::insert(
        &txn,
        NewVital {
            device_id: device.id,
            timestamp,
            heart_rate: payload.heart_rate,
            spo2: payload.spo2,
            temperature: payload.temperature,
            latitude: payload.latitude,
            longitude: payload.longitude,
            gps_accuracy: payload.gps_accuracy,
            fall_detected: payload.fall_detected.unwrap_or(false),
            co: payload.co,
            h2s: payload.h2s,
            ch4: payload.ch4,
        },
    )
    .await?;

    let hits = threshold_service::evaluate(&vital, &settings.thresholds);
    let mut alerts = Vec::with_capacity(hits.len());
    for hit in &hits {
        let alert = Alert::insert(
            &txn,
            NewAlert {
                device_id: device.id,
                user_id: device.user_id,
                alert_type: hit.alert_type,
                severity: hit.severity,
                message: hit.message.clone(),
                value: Decimal::try_from(hit.value).ok(),
                threshold: Decimal::try_from(hit.threshold).ok(),
                timestamp,
            },
        )
        .await?;
        alerts.push(alert);
    }

    let attendance = AttendanceDay::apply_reading(&txn, device.user_id, timestamp).await?;

    txn.commit().await?;

    if let Err(err) = Device::touch_last_seen(db, device.id, None, timestamp).await {
        tracing::warn!(device_id = %device.id, error = %err, "failed to update device last_seen");
    }

    tracing::info!(
        device_serial = %payload.device_serial,
        alert_count = alerts.len(),
        "ingestion committed"
    );

    bus.publish_vital_update(device.user_id, &vital).await;
    bus.publish_location_update(device.user_id, &vital).await;
    for alert in &alerts {
        bus.publish_alert_created(alert).await;
    }
    bus.publish_attendance_update(&attendance).await;

    Ok(IngestOutcome {
        vital,
        alerts,
        attendance,
    })
}

/// Range checks beyond what `validator` expresses declaratively
/// (decimal-typed fields, spec section 6).
fn validate_ranges(payload: &IngestPayload) -> AppResult<()> {
    if let Some(temp) = payload.temperature {
        if temp < Decimal::from(30) || temp > Decimal::from(45) {
            return Err(AppError::validation("temperature out of range 30..45"));
        }
    }
    if let Some(lat) = payload.latitude {
        if lat < Decimal::from(-90) || lat > Decimal::from(90) {
            return Err(AppError::validation("latitude out of range -90..90"));
        }
    }
    if let Some(lon) = payload.longitude {
        if lon < Decimal::from(-180) || lon > Decimal::from(180) {
            return Err(AppError::validation("longitude out of range -180..180"));
        }
    }
    for (name, value) in [
        ("gps_accuracy", payload.gps_accuracy),
        ("co", payload.co),
        ("h2s", payload.h2s),
        ("ch4", payload.ch4),
    ] {
        if let Some(v) = value {
            if v < Decimal::ZERO {
                return Err(AppError::validation(format!("{name} must be non-negative")));
            }
        }
    }
    Ok(())
}
