use bcrypt::{hash, DEFAULT_COST};
use loco_rs::prelude::*;
use sea_orm::*;
use uuid::Uuid;

use crate::models::_entities::{alerts, attendance, compliance_records, devices, users, vitals};

pub struct DatabaseSeeder;

impl DatabaseSeeder {
    /// Seed the database with a small, internally-consistent development
    /// dataset: a supervisor, a handful of employees each with one
    /// device, a day of vitals, and the alerts/attendance rows those
    /// vitals would have produced through the ingestion pipeline.
    pub async fn seed_development(db: &DatabaseConnection) -> Result<()> {
        tracing::info!("Starting development database seeding...");

        let supervisor = Self::create_supervisor(db).await?;
        tracing::info!("Created supervisor: {}", supervisor.email);

        let employees = Self::create_employees(db).await?;
        tracing::info!("Created {} employees", employees.len());

        let devices = Self::create_devices(db, &employees).await?;
        tracing::info!("Created {} devices", devices.len());

        Self::create_sample_vitals_and_alerts(db, &devices).await?;
        tracing::info!("Created sample vitals and alerts");

        Self::create_sample_attendance(db, &employees).await?;
        tracing::info!("Created sample attendance rows");

        tracing::info!("Development database seeding completed successfully");
        Ok(())
    }

    async fn create_supervisor(db: &DatabaseConnection) -> Result<users::Model> {
        let digest = hash("supervisor123", DEFAULT_COST).map_err(|e| Error::string(&format!("hash failed: {e}")))?;

        let model = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set("supervisor@sentrywear.dev".to_string()),
            password_digest: Set(digest),
            role: Set("supervisor".to_string()),
            department: Set(Some("Safety Operations".to_string())),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now().naive_utc()),
            updated_at: Set(chrono::Utc::now().naive_utc()),
        };

        Ok(model.insert(db).await?)
    }

    async fn create_employees(db: &DatabaseConnection) -> Result<Vec<users::Model>> {
        let digest = hash("password123", DEFAULT_COST).map_err(|e| Error::string(&format!("hash failed: {e}")))?;

        let roster = [
            ("alice@sentrywear.dev", "Field Operations"),
            ("bob@sentrywear.dev", "Field Operations"),
            ("carol@sentrywear.dev", "Warehouse"),
        ];

        let mut created = Vec::new();
        for (email, department) in roster {
            let model = users::ActiveModel {
                id: Set(Uuid::new_v4()),
                email: Set(email.to_string()),
                password_digest: Set(digest.clone()),
                role: Set("employee".to_string()),
                department: Set(Some(department.to_string())),
                is_active: Set(true),
                created_at: Set(chrono::Utc::now().naive_utc()),
                updated_at: Set(chrono::Utc::now().naive_utc()),
            };
            created.push(model.insert(db).await?);
        }

        Ok(created)
    }

    async fn create_devices(db: &DatabaseConnection, employees: &[users::Model]) -> Result<Vec<devices::Model>> {
        let mut created = Vec::new();
        for (i, employee) in employees.iter().enumerate() {
            let model = devices::ActiveModel {
                id: Set(Uuid::new_v4()),
                device_serial: Set(format!("WX-{:02}", i + 1)),
                user_id: Set(employee.id),
                battery_level: Set(Some(95)),
                last_seen: Set(Some(chrono::Utc::now().naive_utc())),
                is_active: Set(true),
                created_at: Set(chrono::Utc::now().naive_utc()),
                updated_at: Set(chrono::Utc::now().naive_utc()),
            };
            created.push(model.insert(db).await?);
        }
        Ok(created)
    }

    async fn create_sample_vitals_and_alerts(db: &DatabaseConnection, devices: &[devices::Model]) -> Result<()> {
        use rust_decimal::Decimal;

        let now = chrono::Utc::now().naive_utc();

        for (i, device) in devices.iter().enumerate() {
            let vital = vitals::ActiveModel {
                id: Set(Uuid::new_v4()),
                device_id: Set(device.id),
                timestamp: Set(now),
                heart_rate: Set(Some(72 + i as i32)),
                spo2: Set(Some(98)),
                temperature: Set(Some(Decimal::new(368, 1))),
                latitude: Set(None),
                longitude: Set(None),
                gps_accuracy: Set(None),
                fall_detected: Set(false),
                co: Set(None),
                h2s: Set(None),
                ch4: Set(None),
                created_at: Set(now),
            }
            .insert(db)
            .await?;

            // The first device also gets one historical critical-fall
            // alert, so the seeded dataset exercises the alert surfaces.
            if i == 0 {
                let alert = alerts::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    device_id: Set(device.id),
                    user_id: Set(device.user_id),
                    alert_type: Set("fall".to_string()),
                    severity: Set("critical".to_string()),
                    message: Set("fall detected".to_string()),
                    value: Set(Some(Decimal::ONE)),
                    threshold: Set(Some(Decimal::ONE)),
                    acknowledged: Set(false),
                    acknowledged_by: Set(None),
                    acknowledged_at: Set(None),
                    resolved: Set(false),
                    resolved_at: Set(None),
                    timestamp: Set(vital.timestamp),
                    created_at: Set(now),
                };
                alert.insert(db).await?;
            }
        }

        Ok(())
    }

    async fn create_sample_attendance(db: &DatabaseConnection, employees: &[users::Model]) -> Result<()> {
        let today = chrono::Utc::now().date_naive();
        let now = chrono::Utc::now().naive_utc();

        for employee in employees {
            let model = attendance::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(employee.id),
                date: Set(today),
                check_in_time: Set(Some(now)),
                check_out_time: Set(None),
                total_hours: Set(None),
                status: Set("present".to_string()),
                created_at: Set(now),
                updated_at: Set(now),
            };
            model.insert(db).await?;
        }

        Ok(())
    }

    pub async fn is_seeded(db: &DatabaseConnection) -> Result<bool> {
        let user_count = users::Entity::find().count(db).await?;
        Ok(user_count > 0)
    }

    pub async fn clear_all(db: &DatabaseConnection) -> Result<()> {
        tracing::warn!("Clearing all database data...");

        compliance_records::Entity::delete_many().exec(db).await?;
        alerts::Entity::delete_many().exec(db).await?;
        attendance::Entity::delete_many().exec(db).await?;
        vitals::Entity::delete_many().exec(db).await?;
        devices::Entity::delete_many().exec(db).await?;
        users::Entity::delete_many().exec(db).await?;

        tracing::info!("All database data cleared");
        Ok(())
    }
}
