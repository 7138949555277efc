//! Double-entry bookkeeping logic.
//!
//! - Account classification and the normal-balance sign rule
//! - Journal entry validation
//! - Running balance tracking
//! - Entry numbering

pub mod balance;
pub mod entry_number;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use balance::RunningBalance;
pub use entry_number::{format_entry_number, parse_entry_number};
pub use error::{LedgerError, LineDefect};
pub use service::{AMOUNT_LIMIT, AMOUNT_SCALE, LedgerService};
pub use types::{
    AccountInfo, AccountSubtype, AccountType, EntryTotals, JournalLineInput, NormalBalance,
    LedgerLineView, PostEntryInput, SourceType, ValidatedEntry, ValidatedLine,
};
