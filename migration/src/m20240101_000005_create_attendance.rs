use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Attendance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attendance::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(ColumnDef::new(Attendance::UserId).uuid().not_null())
                    .col(ColumnDef::new(Attendance::Date).date().not_null())
                    .col(ColumnDef::new(Attendance::CheckInTime).timestamp())
                    .col(ColumnDef::new(Attendance::CheckOutTime).timestamp())
                    .col(ColumnDef::new(Attendance::TotalHours).decimal_len(4, 1))
                    .col(ColumnDef::new(Attendance::Status).string().not_null().default("present"))
                    .col(ColumnDef::new(Attendance::CreatedAt).timestamp().not_null().extra("DEFAULT CURRENT_TIMESTAMP".to_string()))
                    .col(ColumnDef::new(Attendance::UpdatedAt).timestamp().not_null().extra("DEFAULT CURRENT_TIMESTAMP".to_string()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_user_id")
                            .from(Attendance::Table, Attendance::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one row per (user_id, date)
        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_user_date_unique")
                    .table(Attendance::Table)
                    .col(Attendance::UserId)
                    .col(Attendance::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_user_date_desc")
                    .table(Attendance::Table)
                    .col(Attendance::UserId)
                    .col((Attendance::Date, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Attendance::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Attendance {
    Table,
    Id,
    UserId,
    Date,
    CheckInTime,
    CheckOutTime,
    TotalHours,
    Status,
    CreatedAt,
    UpdatedAt,
}
