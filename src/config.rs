use loco_rs::config::Config;
use loco_rs::{Error, Result};
use serde::{Deserialize, Serialize};

/// Application-specific settings loaded from the `app_settings` block of
/// the active `config/<environment>.yaml`. Generalises the teacher's
/// `JwtConfig` env-var-only trait into a single config-file-first struct
/// covering every knob enumerated in the specification's configuration
/// section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub auth: AuthSettings,
    pub thresholds: ThresholdSettings,
    pub attendance: AttendanceSettings,
    pub retention: RetentionSettings,
    pub socket: SocketSettings,
    pub cors: CorsSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdSettings {
    pub heart_rate_low: i32,
    pub heart_rate_high: i32,
    pub spo2_low: i32,
    pub temperature_low: f64,
    pub temperature_high: f64,
    pub co_high: f64,
    pub co_critical: f64,
    pub h2s_high: f64,
    pub h2s_critical: f64,
    pub ch4_high: f64,
    pub ch4_critical: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSettings {
    pub standard_start: String,
    pub standard_end: String,
    pub standard_hours: f64,
    pub idle_checkout_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionSettings {
    pub vitals_days: i64,
    pub alerts_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketSettings {
    pub ping_interval_seconds: u64,
    pub idle_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsSettings {
    pub allowed_origin: String,
}

impl AppSettings {
    /// Parse the `app_settings` section of the loco config. Every
    /// environment config file must carry one; a missing block is an
    /// operator configuration error, not something to default around.
    pub fn from_config(config: &Config) -> Result<Self> {
        let raw = config
            .settings
            .clone()
            .ok_or_else(|| Error::string("config is missing the `settings` (app_settings) block"))?;

        serde_json::from_value(raw)
            .map_err(|e| Error::string(&format!("failed to parse app_settings: {e}")))
    }
}
