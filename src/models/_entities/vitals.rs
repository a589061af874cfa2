use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vitals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub device_id: Uuid,
    pub timestamp: DateTime,
    pub heart_rate: Option<i32>,
    pub spo2: Option<i32>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub temperature: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((9, 6)))", nullable)]
    pub latitude: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((9, 6)))", nullable)]
    pub longitude: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((7, 2)))", nullable)]
    pub gps_accuracy: Option<Decimal>,
    pub fall_detected: bool,
    #[sea_orm(column_type = "Decimal(Some((7, 2)))", nullable)]
    pub co: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((7, 2)))", nullable)]
    pub h2s: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((7, 2)))", nullable)]
    pub ch4: Option<Decimal>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::devices::Entity",
        from = "Column::DeviceId",
        to = "super::devices::Column::Id"
    )]
    Device,
}

impl Related<super::devices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Device.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
