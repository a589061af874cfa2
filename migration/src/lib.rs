pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users;
mod m20240101_000002_create_devices;
mod m20240101_000003_create_vitals;
mod m20240101_000004_create_alerts;
mod m20240101_000005_create_attendance;
mod m20240101_000006_create_compliance_records;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users::Migration),
            Box::new(m20240101_000002_create_devices::Migration),
            Box::new(m20240101_000003_create_vitals::Migration),
            Box::new(m20240101_000004_create_alerts::Migration),
            Box::new(m20240101_000005_create_attendance::Migration),
            Box::new(m20240101_000006_create_compliance_records::Migration),
        ]
    }
}
