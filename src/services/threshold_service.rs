use rust_decimal::prelude::ToPrimitive;

use crate::config::ThresholdSettings;
use crate::models::alert::{AlertType, Severity};
use crate::models::vital::Vital;

/// One threshold crossing detected on a reading. Carries no persistence
/// concerns — the ingestion pipeline turns these into `Alert` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdHit {
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub value: f64,
    pub threshold: f64,
}

/// Pure, deterministic evaluation over a single reading (spec section
/// 4.C). Missing fields simply skip their rule; no rule fires on `None`.
pub fn evaluate(vital: &Vital, settings: &ThresholdSettings) -> Vec<ThresholdHit> {
    let mut hits = Vec::new();

    if vital.fall_detected {
        hits.push(ThresholdHit {
            alert_type: AlertType::Fall,
            severity: Severity::Critical,
            message: "fall detected".to_string(),
            value: 1.0,
            threshold: 1.0,
        });
    }

    if let Some(hr) = vital.heart_rate {
        if hr < settings.heart_rate_low {
            hits.push(ThresholdHit {
                alert_type: AlertType::HeartRate,
                severity: Severity::Medium,
                message: format!("heart rate {hr} below {}", settings.heart_rate_low),
                value: hr as f64,
                threshold: settings.heart_rate_low as f64,
            });
        } else if hr > settings.heart_rate_high {
            hits.push(ThresholdHit {
                alert_type: AlertType::HeartRate,
                severity: Severity::High,
                message: format!("heart rate {hr} above {}", settings.heart_rate_high),
                value: hr as f64,
                threshold: settings.heart_rate_high as f64,
            });
        }
    }

    if let Some(spo2) = vital.spo2 {
        if spo2 < settings.spo2_low {
            hits.push(ThresholdHit {
                alert_type: AlertType::Spo2,
                severity: Severity::High,
                message: format!("spo2 {spo2} below {}", settings.spo2_low),
                value: spo2 as f64,
                threshold: settings.spo2_low as f64,
            });
        }
    }

    if let Some(temp) = vital.temperature.and_then(|d| d.to_f64()) {
        if temp < settings.temperature_low {
            hits.push(ThresholdHit {
                alert_type: AlertType::Temperature,
                severity: Severity::Medium,
                message: format!("temperature {temp:.1} below {:.1}", settings.temperature_low),
                value: temp,
                threshold: settings.temperature_low,
            });
        } else if temp > settings.temperature_high {
            hits.push(ThresholdHit {
                alert_type: AlertType::Temperature,
                severity: Severity::Medium,
                message: format!("temperature {temp:.1} above {:.1}", settings.temperature_high),
                value: temp,
                threshold: settings.temperature_high,
            });
        }
    }

    if let Some(co) = vital.co.and_then(|d| d.to_f64()) {
        if co > settings.co_critical {
            hits.push(ThresholdHit {
                alert_type: AlertType::Co,
                severity: Severity::Critical,
                message: format!("CO {co:.1}ppm above critical {:.1}", settings.co_critical),
                value: co,
                threshold: settings.co_critical,
            });
        } else if co > settings.co_high {
            hits.push(ThresholdHit {
                alert_type: AlertType::Co,
                severity: Severity::High,
                message: format!("CO {co:.1}ppm above {:.1}", settings.co_high),
                value: co,
                threshold: settings.co_high,
            });
        }
    }

    if let Some(h2s) = vital.h2s.and_then(|d| d.to_f64()) {
        if h2s > settings.h2s_critical {
            hits.push(ThresholdHit {
                alert_type: AlertType::H2s,
                severity: Severity::Critical,
                message: format!("H2S {h2s:.1}ppm above critical {:.1}", settings.h2s_critical),
                value: h2s,
                threshold: settings.h2s_critical,
            });
        } else if h2s > settings.h2s_high {
            hits.push(ThresholdHit {
                alert_type: AlertType::H2s,
                severity: Severity::High,
                message: format!("H2S {h2s:.1}ppm above {:.1}", settings.h2s_high),
                value: h2s,
                threshold: settings.h2s_high,
            });
        }
    }

    if let Some(ch4) = vital.ch4.and_then(|d| d.to_f64()) {
        if ch4 > settings.ch4_critical {
            hits.push(ThresholdHit {
                alert_type: AlertType::Ch4,
                severity: Severity::Critical,
                message: format!("CH4 {ch4:.1}%LEL above critical {:.1}", settings.ch4_critical),
                value: ch4,
                threshold: settings.ch4_critical,
            });
        } else if ch4 > settings.ch4_high {
            hits.push(ThresholdHit {
                alert_type: AlertType::Ch4,
                severity: Severity::High,
                message: format!("CH4 {ch4:.1}%LEL above {:.1}", settings.ch4_high),
                value: ch4,
                threshold: settings.ch4_high,
            });
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn settings() -> ThresholdSettings {
        ThresholdSettings {
            heart_rate_low: 60,
            heart_rate_high: 100,
            spo2_low: 95,
            temperature_low: 36.0,
            temperature_high: 37.5,
            co_high: 35.0,
            co_critical: 200.0,
            h2s_high: 10.0,
            h2s_critical: 50.0,
            ch4_high: 10.0,
            ch4_critical: 25.0,
        }
    }

    fn base_vital() -> Vital {
        Vital {
            id: Uuid::new_v4(),
            device_id: Uuid::new_v4(),
            timestamp: Utc::now().naive_utc(),
            heart_rate: None,
            spo2: None,
            temperature: None,
            latitude: None,
            longitude: None,
            gps_accuracy: None,
            fall_detected: false,
            co: None,
            h2s: None,
            ch4: None,
        }
    }

    #[test]
    fn no_rule_fires_on_all_missing_fields() {
        assert!(evaluate(&base_vital(), &settings()).is_empty());
    }

    #[test]
    fn fall_is_always_critical() {
        let mut vital = base_vital();
        vital.fall_detected = true;
        let hits = evaluate(&vital, &settings());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].alert_type, AlertType::Fall);
        assert_eq!(hits[0].severity, Severity::Critical);
    }

    #[test]
    fn co_crosses_critical_before_high() {
        let mut vital = base_vital();
        vital.co = Some(Decimal::new(2500, 1)); // 250.0
        let hits = evaluate(&vital, &settings());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].severity, Severity::Critical);
    }

    #[test]
    fn heart_rate_low_and_high_are_distinct() {
        let settings = settings();

        let mut low = base_vital();
        low.heart_rate = Some(45);
        let hits = evaluate(&low, &settings);
        assert_eq!(hits[0].severity, Severity::Medium);

        let mut high = base_vital();
        high.heart_rate = Some(140);
        let hits = evaluate(&high, &settings);
        assert_eq!(hits[0].severity, Severity::High);
    }

    #[test]
    fn heart_rate_within_range_does_not_fire() {
        let mut vital = base_vital();
        vital.heart_rate = Some(72);
        assert!(evaluate(&vital, &settings()).is_empty());
    }
}
