use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users::Users;
use super::m20240101_000002_create_devices::Devices;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alerts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alerts::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(ColumnDef::new(Alerts::DeviceId).uuid().not_null())
                    .col(ColumnDef::new(Alerts::UserId).uuid().not_null())
                    .col(ColumnDef::new(Alerts::AlertType).string().not_null())
                    .col(ColumnDef::new(Alerts::Severity).string().not_null())
                    .col(ColumnDef::new(Alerts::Message).text().not_null())
                    .col(ColumnDef::new(Alerts::Value).decimal_len(10, 2))
                    .col(ColumnDef::new(Alerts::Threshold).decimal_len(10, 2))
                    .col(ColumnDef::new(Alerts::Acknowledged).boolean().not_null().default(false))
                    .col(ColumnDef::new(Alerts::AcknowledgedBy).uuid())
                    .col(ColumnDef::new(Alerts::AcknowledgedAt).timestamp())
                    .col(ColumnDef::new(Alerts::Resolved).boolean().not_null().default(false))
                    .col(ColumnDef::new(Alerts::ResolvedAt).timestamp())
                    .col(ColumnDef::new(Alerts::Timestamp).timestamp().not_null())
                    .col(ColumnDef::new(Alerts::CreatedAt).timestamp().not_null().extra("DEFAULT CURRENT_TIMESTAMP".to_string()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alerts_device_id")
                            .from(Alerts::Table, Alerts::DeviceId)
                            .to(Devices::Table, Devices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alerts_user_id")
                            .from(Alerts::Table, Alerts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alerts_acknowledged_by")
                            .from(Alerts::Table, Alerts::AcknowledgedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_alerts_acknowledged_timestamp")
                    .table(Alerts::Table)
                    .col(Alerts::Acknowledged)
                    .col((Alerts::Timestamp, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alerts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Alerts {
    Table,
    Id,
    DeviceId,
    UserId,
    AlertType,
    Severity,
    Message,
    Value,
    Threshold,
    Acknowledged,
    AcknowledgedBy,
    AcknowledgedAt,
    Resolved,
    ResolvedAt,
    Timestamp,
    CreatedAt,
}
