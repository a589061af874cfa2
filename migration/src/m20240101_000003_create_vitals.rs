use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_devices::Devices;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vitals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vitals::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(ColumnDef::new(Vitals::DeviceId).uuid().not_null())
                    .col(ColumnDef::new(Vitals::Timestamp).timestamp().not_null())
                    .col(ColumnDef::new(Vitals::HeartRate).integer())
                    .col(ColumnDef::new(Vitals::Spo2).integer())
                    .col(ColumnDef::new(Vitals::Temperature).decimal_len(5, 2))
                    .col(ColumnDef::new(Vitals::Latitude).decimal_len(9, 6))
                    .col(ColumnDef::new(Vitals::Longitude).decimal_len(9, 6))
                    .col(ColumnDef::new(Vitals::GpsAccuracy).decimal_len(7, 2))
                    .col(ColumnDef::new(Vitals::FallDetected).boolean().not_null().default(false))
                    .col(ColumnDef::new(Vitals::Co).decimal_len(7, 2))
                    .col(ColumnDef::new(Vitals::H2s).decimal_len(7, 2))
                    .col(ColumnDef::new(Vitals::Ch4).decimal_len(7, 2))
                    .col(ColumnDef::new(Vitals::CreatedAt).timestamp().not_null().extra("DEFAULT CURRENT_TIMESTAMP".to_string()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vitals_device_id")
                            .from(Vitals::Table, Vitals::DeviceId)
                            .to(Devices::Table, Devices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vitals_device_timestamp")
                    .table(Vitals::Table)
                    .col(Vitals::DeviceId)
                    .col((Vitals::Timestamp, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vitals::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Vitals {
    Table,
    Id,
    DeviceId,
    Timestamp,
    HeartRate,
    Spo2,
    Temperature,
    Latitude,
    Longitude,
    GpsAccuracy,
    FallDetected,
    Co,
    H2s,
    Ch4,
    CreatedAt,
}
