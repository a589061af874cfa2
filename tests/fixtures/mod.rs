use rust_decimal::Decimal;
use sentrywear_backend::models::alert::{Alert, AlertType, Severity};
use sentrywear_backend::models::attendance::{AttendanceDay, AttendanceStatus};
use sentrywear_backend::models::compliance::{ComplianceRecord, RiskLevel};
use sentrywear_backend::models::device::Device;
use sentrywear_backend::models::user::{Role, User};
use sentrywear_backend::models::vital::Vital;
use uuid::Uuid;

pub struct UserFixture;

impl UserFixture {
    pub fn employee() -> User {
        User {
            id: Uuid::new_v4(),
            email: "employee@example.com".to_string(),
            role: Role::Employee,
            department: Some("Drilling".to_string()),
            is_active: true,
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn supervisor() -> User {
        User {
            id: Uuid::new_v4(),
            email: "supervisor@example.com".to_string(),
            role: Role::Supervisor,
            department: Some("Operations".to_string()),
            is_active: true,
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

pub struct DeviceFixture;

impl DeviceFixture {
    pub fn for_user(user_id: Uuid) -> Device {
        Device {
            id: Uuid::new_v4(),
            device_serial: format!("SW-{}", &user_id.to_string()[..8]),
            user_id,
            battery_level: Some(85),
            last_seen: Some(chrono::Utc::now().naive_utc()),
            is_active: true,
        }
    }
}

pub struct VitalFixture;

impl VitalFixture {
    pub fn normal(device_id: Uuid) -> Vital {
        Vital {
            id: Uuid::new_v4(),
            device_id,
            timestamp: chrono::Utc::now().naive_utc(),
            heart_rate: Some(72),
            spo2: Some(98),
            temperature: Some(Decimal::new(368, 1)),
            latitude: Some(Decimal::new(297627, 4)),
            longitude: Some(Decimal::new(-953425, 4)),
            gps_accuracy: Some(Decimal::new(5, 0)),
            fall_detected: false,
            co: Some(Decimal::new(2, 0)),
            h2s: Some(Decimal::new(0, 0)),
            ch4: Some(Decimal::new(1, 0)),
        }
    }

    pub fn critical_gas(device_id: Uuid) -> Vital {
        let mut vital = Self::normal(device_id);
        vital.co = Some(Decimal::new(250, 0));
        vital.h2s = Some(Decimal::new(60, 0));
        vital
    }

    pub fn fall(device_id: Uuid) -> Vital {
        let mut vital = Self::normal(device_id);
        vital.fall_detected = true;
        vital
    }
}

pub struct AlertFixture;

impl AlertFixture {
    pub fn new(device_id: Uuid, user_id: Uuid, severity: Severity) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            device_id,
            user_id,
            alert_type: AlertType::Co,
            severity,
            message: "carbon monoxide above critical threshold".to_string(),
            value: Some(Decimal::new(250, 0)),
            threshold: Some(Decimal::new(200, 0)),
            acknowledged: false,
            acknowledged_by: None,
            acknowledged_at: None,
            resolved: false,
            resolved_at: None,
            timestamp: chrono::Utc::now().naive_utc(),
        }
    }
}

pub struct AttendanceFixture;

impl AttendanceFixture {
    pub fn checked_in(user_id: Uuid) -> AttendanceDay {
        AttendanceDay {
            id: Uuid::new_v4(),
            user_id,
            date: chrono::Utc::now().date_naive(),
            check_in_time: Some(chrono::Utc::now().naive_utc()),
            check_out_time: None,
            total_hours: None,
            status: AttendanceStatus::Present,
        }
    }
}

pub struct ComplianceFixture;

impl ComplianceFixture {
    pub fn unreviewed(user_id: Uuid) -> ComplianceRecord {
        ComplianceRecord {
            id: Uuid::new_v4(),
            user_id,
            category: "ppe".to_string(),
            narrative: "hard hat not worn on site for over an hour".to_string(),
            risk_level: RiskLevel::Medium,
            reviewed: false,
            reviewed_by: None,
            reviewed_at: None,
            assigned_to: None,
        }
    }
}
