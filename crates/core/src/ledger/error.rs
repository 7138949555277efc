//! Ledger error types.
//!
//! Structural rejections name the offending line (0-based) and account so callers can
//! point at the exact input that failed.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use codledger_shared::types::{AccountId, JournalEntryId};

use super::types::{AccountType, NormalBalance};

/// What is wrong with a single journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDefect {
    /// Both debit and credit are non-zero.
    BothSides,
    /// Neither side carries an amount.
    NoAmount,
    /// A side is negative.
    NegativeAmount,
    /// More decimal places than the ledger stores.
    TooPrecise,
    /// Amount does not fit the ledger's money columns.
    OutOfRange,
}

impl std::fmt::Display for LineDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::BothSides => "must have either a debit or a credit, not both",
            Self::NoAmount => "must have a non-zero debit or credit",
            Self::NegativeAmount => "amounts cannot be negative",
            Self::TooPrecise => "amounts cannot have more than 4 decimal places",
            Self::OutOfRange => "amount exceeds the maximum of 999999999999999.9999",
        })
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Entry has fewer than two lines.
    #[error("Journal entry must have at least 2 lines, got {count}")]
    InsufficientLines {
        /// Number of lines submitted.
        count: usize,
    },

    /// A line is malformed.
    #[error("Line {line}: {defect}")]
    InvalidLine {
        /// Line index.
        line: usize,
        /// The defect found.
        defect: LineDefect,
    },

    /// A line references an account that does not exist.
    #[error("Line {line}: account {account_id} not found")]
    UnknownAccount {
        /// Line index.
        line: usize,
        /// The missing account.
        account_id: AccountId,
    },

    /// A line references a deactivated account.
    #[error("Line {line}: account {code} ({account_id}) is inactive")]
    AccountInactive {
        /// Line index.
        line: usize,
        /// The inactive account.
        account_id: AccountId,
        /// Its code.
        code: String,
    },

    /// Debits and credits differ.
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit.
        debit: Decimal,
        /// Total credit.
        credit: Decimal,
    },

    /// Entry moves no money.
    #[error("Journal entry total must be greater than zero")]
    ZeroTotal,

    /// Entry date precedes activity already posted on an account.
    #[error(
        "Line {line}: entry date {entry_date} precedes the last posting on account {account_id} ({last_entry_date})"
    )]
    BackdatedEntry {
        /// Line index.
        line: usize,
        /// The account.
        account_id: AccountId,
        /// Requested entry date.
        entry_date: NaiveDate,
        /// Latest date already on the account.
        last_entry_date: NaiveDate,
    },

    /// Account code is not a 4-digit code in its type's range.
    #[error("Invalid account code '{code}' for {account_type} account: {reason}")]
    InvalidAccountCode {
        /// The submitted code.
        code: String,
        /// The account type.
        account_type: AccountType,
        /// What is wrong.
        reason: String,
    },

    /// Normal balance side disagrees with the account type.
    #[error("{account_type} accounts must have a {expected} normal balance, got {actual}")]
    NormalBalanceMismatch {
        /// The account type.
        account_type: AccountType,
        /// Side implied by the type.
        expected: NormalBalance,
        /// Side submitted.
        actual: NormalBalance,
    },

    /// Account code already used.
    #[error("Account code '{0}' already exists")]
    DuplicateAccountCode(String),

    /// Account lookup failed.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account code lookup failed.
    #[error("Account with code '{0}' not found")]
    AccountCodeNotFound(String),

    /// Journal entry lookup failed.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines { .. } => "INSUFFICIENT_LINES",
            Self::InvalidLine { .. } => "INVALID_LINE",
            Self::UnknownAccount { .. } | Self::AccountNotFound(_) | Self::AccountCodeNotFound(_) => {
                "ACCOUNT_NOT_FOUND"
            }
            Self::AccountInactive { .. } => "ACCOUNT_INACTIVE",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::ZeroTotal => "ZERO_TOTAL",
            Self::BackdatedEntry { .. } => "BACKDATED_ENTRY",
            Self::InvalidAccountCode { .. } => "INVALID_ACCOUNT_CODE",
            Self::NormalBalanceMismatch { .. } => "NORMAL_BALANCE_MISMATCH",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InsufficientLines { .. }
            | Self::InvalidLine { .. }
            | Self::AccountInactive { .. }
            | Self::Unbalanced { .. }
            | Self::ZeroTotal
            | Self::BackdatedEntry { .. }
            | Self::InvalidAccountCode { .. }
            | Self::NormalBalanceMismatch { .. } => 400,

            Self::UnknownAccount { .. }
            | Self::AccountNotFound(_)
            | Self::AccountCodeNotFound(_)
            | Self::EntryNotFound(_) => 404,

            Self::DuplicateAccountCode(_) => 409,

            Self::Database(_) => 500,
        }
    }

    /// Structural rejection of a posting attempt (nothing was written).
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InsufficientLines { .. }
                | Self::InvalidLine { .. }
                | Self::UnknownAccount { .. }
                | Self::AccountInactive { .. }
                | Self::Unbalanced { .. }
                | Self::ZeroTotal
                | Self::BackdatedEntry { .. }
        )
    }

    /// Index of the offending line, when the error concerns one.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidLine { line, .. }
            | Self::UnknownAccount { line, .. }
            | Self::AccountInactive { line, .. }
            | Self::BackdatedEntry { line, .. } => Some(*line),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn codes_and_statuses() {
        let unbalanced = LedgerError::Unbalanced {
            debit: dec!(40),
            credit: dec!(60),
        };
        assert_eq!(unbalanced.error_code(), "UNBALANCED_ENTRY");
        assert_eq!(unbalanced.http_status_code(), 400);
        assert!(unbalanced.is_structural());

        let missing = LedgerError::AccountNotFound(AccountId::new());
        assert_eq!(missing.http_status_code(), 404);
        assert!(!missing.is_structural());

        assert_eq!(
            LedgerError::DuplicateAccountCode("1010".into()).http_status_code(),
            409
        );
        assert_eq!(LedgerError::Database("boom".into()).http_status_code(), 500);
    }

    #[test]
    fn messages_name_the_line() {
        let err = LedgerError::InvalidLine {
            line: 2,
            defect: LineDefect::BothSides,
        };
        assert_eq!(
            err.to_string(),
            "Line 2: must have either a debit or a credit, not both"
        );
        assert_eq!(err.line(), Some(2));

        let err = LedgerError::Unbalanced {
            debit: dec!(40.00),
            credit: dec!(60.00),
        };
        assert_eq!(
            err.to_string(),
            "Journal entry is not balanced. Debit: 40.00, Credit: 60.00"
        );
        assert_eq!(err.line(), None);
    }
}
