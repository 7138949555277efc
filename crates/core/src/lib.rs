//! Core business logic for codledger.
//!
//! Pure domain rules with no web or database dependencies.
//!
//! # Modules
//!
//! - `ledger` - Double-entry validation, balance sign rules, running balances
//! - `reports` - Balance sheet and profit and loss
//! - `collections` - Agent collection and deposit lifecycles
//! - `aging` - Age buckets of cash held by agents
//! - `cashflow` - Cash position and forecast
//! - `export` - CSV rendering

pub mod aging;
pub mod cashflow;
pub mod collections;
pub mod export;
pub mod ledger;
pub mod reports;
