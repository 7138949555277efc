//! `SeaORM` entity definitions.
#![allow(missing_docs)]

pub mod prelude;

pub mod accounts;
pub mod agent_blocks;
pub mod agent_collections;
pub mod agent_deposits;
pub mod journal_entries;
pub mod journal_entry_counters;
pub mod ledger_transactions;
pub mod sea_orm_active_enums;
