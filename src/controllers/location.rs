use axum::extract::{Extension, Path, Query};
use loco_rs::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::middleware::{protect, AuthContext};
use crate::models::device::Device;
use crate::models::vital::Vital;
use crate::services::authz::{self, Action, Target};

pub fn routes() -> Routes {
    Routes::new()
        .prefix("location")
        .add("/current", protect(get(current)))
        .add("/history/:id", protect(get(history)))
        .add("/track/:id", protect(get(track)))
        .add("/zone/:id", protect(get(zone)))
        .add("/summary", protect(get(summary)))
        .add("/heatmap", protect(get(heatmap)))
        .add("/geofence", protect(post(geofence)))
}

async fn current(State(ctx): State<AppContext>, Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view the live location roster".to_string()));
    }

    let devices = Device::list_all(&ctx.db).await?;
    let mut rows = Vec::new();
    for device in devices {
        if let Some(vital) = Vital::latest_for_device(&ctx.db, device.id).await? {
            if vital.latitude.is_some() && vital.longitude.is_some() {
                rows.push(json!({
                    "user_id": device.user_id,
                    "device_id": device.id,
                    "latitude": vital.latitude,
                    "longitude": vital.longitude,
                    "gps_accuracy": vital.gps_accuracy,
                    "timestamp": vital.timestamp,
                }));
            }
        }
    }
    Ok(Json(json!({ "data": rows })))
}

async fn history(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::owned_by(user_id)) {
        return Err(AppError::Forbidden("not permitted to view this user's location history".to_string()));
    }

    let devices = Device::list_for_user(&ctx.db, user_id).await?;
    let mut rows = Vec::new();
    for device in devices {
        let readings = Vital::history_for_device(&ctx.db, device.id, 200).await?;
        rows.extend(readings.into_iter().filter(|v| v.latitude.is_some()));
    }
    rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(Json(json!({ "data": rows })))
}

/// A single employee's latest known fix, for the live-tracking view
/// (spec section 6). Supervisor-only regardless of the path parameter.
async fn track(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may track employees".to_string()));
    }

    let devices = Device::list_for_user(&ctx.db, user_id).await?;
    let Some(device) = devices.into_iter().find(|d| d.is_active) else {
        return Ok(Json(json!({ "data": null })));
    };
    let vital = Vital::latest_for_device(&ctx.db, device.id).await?;
    Ok(Json(json!({ "data": vital })))
}

#[derive(Debug, Deserialize)]
struct ZoneQuery {
    radius_meters: Option<f64>,
}

/// No persisted geofences exist (spec section non-goals), so `:id`
/// names a reference employee rather than a stored zone: this returns
/// everyone else currently within `radius_meters` of that employee's
/// last known fix, the "who's near worker X" read a safety dashboard
/// needs during an incident. Supervisor-only, like the rest of the
/// fleet-wide spatial reads.
async fn zone(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
    Query(q): Query<ZoneQuery>,
) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may query zone membership".to_string()));
    }

    let radius_meters = q.radius_meters.unwrap_or(200.0);

    let devices = Device::list_for_user(&ctx.db, user_id).await?;
    let Some(reference_device) = devices.into_iter().find(|d| d.is_active) else {
        return Ok(Json(json!({ "data": [] })));
    };
    let Some(reference_vital) = Vital::latest_for_device(&ctx.db, reference_device.id).await? else {
        return Ok(Json(json!({ "data": [] })));
    };
    let (Some(center_lat), Some(center_lon)) = (
        reference_vital.latitude.and_then(|d| d.to_f64()),
        reference_vital.longitude.and_then(|d| d.to_f64()),
    ) else {
        return Ok(Json(json!({ "data": [] })));
    };

    let all_devices = Device::list_all(&ctx.db).await?;
    let mut nearby = Vec::new();
    for device in all_devices {
        if device.user_id == user_id {
            continue;
        }
        if let Some(vital) = Vital::latest_for_device(&ctx.db, device.id).await? {
            if let (Some(lat), Some(lon)) = (vital.latitude.and_then(|d| d.to_f64()), vital.longitude.and_then(|d| d.to_f64())) {
                let distance_meters = haversine_meters(center_lat, center_lon, lat, lon);
                if distance_meters <= radius_meters {
                    nearby.push(json!({ "user_id": device.user_id, "device_id": device.id, "distance_meters": distance_meters }));
                }
            }
        }
    }

    Ok(Json(json!({ "data": nearby })))
}

async fn summary(State(ctx): State<AppContext>, Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view the location summary".to_string()));
    }

    let devices = Device::list_all(&ctx.db).await?;
    let mut reporting_location = 0;
    for device in &devices {
        if let Some(vital) = Vital::latest_for_device(&ctx.db, device.id).await? {
            if vital.latitude.is_some() {
                reporting_location += 1;
            }
        }
    }

    Ok(Json(json!({ "data": { "total_devices": devices.len(), "reporting_location": reporting_location } })))
}

async fn heatmap(State(ctx): State<AppContext>, Extension(auth): Extension<AuthContext>) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may view the location heatmap".to_string()));
    }

    let devices = Device::list_all(&ctx.db).await?;
    let mut points = Vec::new();
    for device in devices {
        let readings = Vital::history_for_device(&ctx.db, device.id, 500).await?;
        for reading in readings {
            if let (Some(lat), Some(lon)) = (reading.latitude.and_then(|d| d.to_f64()), reading.longitude.and_then(|d| d.to_f64())) {
                points.push(json!({ "lat": lat, "lon": lon }));
            }
        }
    }
    Ok(Json(json!({ "data": points })))
}

#[derive(Debug, Deserialize)]
struct GeofenceRequest {
    center_lat: f64,
    center_lon: f64,
    radius_meters: f64,
}

/// Ad-hoc check against the current roster; no geofence is persisted
/// (spec section non-goals — geofencing is out of scope beyond this
/// on-demand query).
async fn geofence(
    State(ctx): State<AppContext>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<GeofenceRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if !authz::allow(Action::Read, &auth, Target::unowned()) {
        return Err(AppError::Forbidden("only supervisors may run geofence checks".to_string()));
    }

    let devices = Device::list_all(&ctx.db).await?;
    let mut inside = Vec::new();
    for device in devices {
        if let Some(vital) = Vital::latest_for_device(&ctx.db, device.id).await? {
            if let (Some(lat), Some(lon)) = (vital.latitude.and_then(|d| d.to_f64()), vital.longitude.and_then(|d| d.to_f64())) {
                if haversine_meters(req.center_lat, req.center_lon, lat, lon) <= req.radius_meters {
                    inside.push(json!({ "user_id": device.user_id, "device_id": device.id }));
                }
            }
        }
    }

    Ok(Json(json!({ "data": inside })))
}

fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
    let (lat1, lon1, lat2, lon2) = (lat1.to_radians(), lon1.to_radians(), lat2.to_radians(), lon2.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_METERS * c
}
