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
                    .table(ComplianceRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComplianceRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(ColumnDef::new(ComplianceRecords::UserId).uuid().not_null())
                    .col(ColumnDef::new(ComplianceRecords::Category).string().not_null())
                    .col(ColumnDef::new(ComplianceRecords::Narrative).text().not_null())
                    .col(ColumnDef::new(ComplianceRecords::RiskLevel).string().not_null().default("low"))
                    .col(ColumnDef::new(ComplianceRecords::Reviewed).boolean().not_null().default(false))
                    .col(ColumnDef::new(ComplianceRecords::ReviewedBy).uuid())
                    .col(ColumnDef::new(ComplianceRecords::ReviewedAt).timestamp())
                    .col(ColumnDef::new(ComplianceRecords::AssignedTo).uuid())
                    .col(ColumnDef::new(ComplianceRecords::CreatedAt).timestamp().not_null().extra("DEFAULT CURRENT_TIMESTAMP".to_string()))
                    .col(ColumnDef::new(ComplianceRecords::UpdatedAt).timestamp().not_null().extra("DEFAULT CURRENT_TIMESTAMP".to_string()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_compliance_user_id")
                            .from(ComplianceRecords::Table, ComplianceRecords::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_compliance_reviewed_by")
                            .from(ComplianceRecords::Table, ComplianceRecords::ReviewedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_compliance_assigned_to")
                            .from(ComplianceRecords::Table, ComplianceRecords::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ComplianceRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ComplianceRecords {
    Table,
    Id,
    UserId,
    Category,
    Narrative,
    RiskLevel,
    Reviewed,
    ReviewedBy,
    ReviewedAt,
    AssignedTo,
    CreatedAt,
    UpdatedAt,
}
