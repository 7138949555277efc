//! `SeaORM` Entity for cash collected by agents.

use super::sea_orm_active_enums::CollectionStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "agent_collections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub order_id: Uuid,
    pub agent_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub status: CollectionStatus,
    pub collection_date: DateTimeWithTimeZone,
    pub verified_at: Option<DateTimeWithTimeZone>,
    pub reconciled_at: Option<DateTimeWithTimeZone>,
    pub deposit_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::agent_deposits::Entity",
        from = "Column::DepositId",
        to = "super::agent_deposits::Column::Id"
    )]
    AgentDeposits,
}

impl Related<super::agent_deposits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AgentDeposits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
