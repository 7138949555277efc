//! Postgres enum types and their mapping onto the domain enums.

use codledger_core::{collections, ledger};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Maps a storage enum onto its domain twin, both ways. Variant names match.
macro_rules! mirror {
    ($db:ident, $domain:path, [$($variant:ident),+ $(,)?]) => {
        impl From<$db> for $domain {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$domain> for $db {
            fn from(value: $domain) -> Self {
                use $domain as Domain;
                match value {
                    $(Domain::$variant => Self::$variant,)+
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "expense")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "normal_balance")]
#[serde(rename_all = "snake_case")]
pub enum NormalBalance {
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "credit")]
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_subtype")]
#[serde(rename_all = "snake_case")]
pub enum AccountSubtype {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "receivable")]
    Receivable,
    #[sea_orm(string_value = "inventory")]
    Inventory,
    #[sea_orm(string_value = "current_liability")]
    CurrentLiability,
    #[sea_orm(string_value = "capital")]
    Capital,
    #[sea_orm(string_value = "operating_revenue")]
    OperatingRevenue,
    #[sea_orm(string_value = "cost_of_goods_sold")]
    CostOfGoodsSold,
    #[sea_orm(string_value = "operating_expense")]
    OperatingExpense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "source_type")]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "order_settlement")]
    OrderSettlement,
    #[sea_orm(string_value = "expense")]
    Expense,
    #[sea_orm(string_value = "deposit")]
    Deposit,
    #[sea_orm(string_value = "agent_collection")]
    AgentCollection,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    #[sea_orm(string_value = "reversal")]
    Reversal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "collection_status")]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "verified")]
    Verified,
    #[sea_orm(string_value = "reconciled")]
    Reconciled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "deposit_status")]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "verified")]
    Verified,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

mirror!(AccountType, ledger::AccountType, [Asset, Liability, Equity, Revenue, Expense]);
mirror!(NormalBalance, ledger::NormalBalance, [Debit, Credit]);
mirror!(
    AccountSubtype,
    ledger::AccountSubtype,
    [
        Cash,
        Receivable,
        Inventory,
        CurrentLiability,
        Capital,
        OperatingRevenue,
        CostOfGoodsSold,
        OperatingExpense,
    ]
);
mirror!(
    SourceType,
    ledger::SourceType,
    [
        Manual,
        OrderSettlement,
        Expense,
        Deposit,
        AgentCollection,
        Adjustment,
        Reversal,
    ]
);
mirror!(CollectionStatus, collections::CollectionStatus, [Draft, Verified, Reconciled]);
mirror!(DepositStatus, collections::DepositStatus, [Pending, Verified, Rejected]);
