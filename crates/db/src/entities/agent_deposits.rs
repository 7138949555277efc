//! `SeaORM` Entity for agent cash deposits.

use super::sea_orm_active_enums::DepositStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "agent_deposits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub agent_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub deposit_method: String,
    #[sea_orm(unique)]
    pub reference_number: String,
    pub status: DepositStatus,
    pub deposit_date: DateTimeWithTimeZone,
    pub notes: Option<String>,
    pub reviewed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::agent_collections::Entity")]
    AgentCollections,
}

impl Related<super::agent_collections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AgentCollections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
