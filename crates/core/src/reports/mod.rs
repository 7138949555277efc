//! Financial statements: balance sheet and profit and loss.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use service::ReportService;
pub use types::{
    AccountActivity, BalanceSheet, EquitySection, ProfitAndLoss, StatementLine, StatementSection,
};
