//! Domain types for the chart of accounts and journal entries.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use codledger_shared::types::{AccountId, JournalEntryId, LedgerLineId};

/// Top-level classification of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Resources owned (cash, receivables, inventory).
    Asset,
    /// Obligations owed.
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred, including cost of goods sold.
    Expense,
}

impl AccountType {
    /// All account types in chart-of-accounts order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// The side on which balances of this type normally accumulate.
    #[must_use]
    pub const fn natural_side(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Inclusive range of 4-digit codes reserved for this type.
    #[must_use]
    pub const fn code_range(self) -> (u16, u16) {
        match self {
            Self::Asset => (1000, 1999),
            Self::Liability => (2000, 2999),
            Self::Equity => (3000, 3999),
            Self::Revenue => (4000, 4999),
            Self::Expense => (5000, 5999),
        }
    }

    /// Wire and storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown account type '{s}'"))
    }
}

/// Side on which an account's balance increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalBalance {
    /// Debits increase the balance.
    Debit,
    /// Credits increase the balance.
    Credit,
}

impl NormalBalance {
    /// Signed change a line makes to an account with this normal side.
    ///
    /// Debit-normal: `debit - credit`. Credit-normal: `credit - debit`.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }

    /// Storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl fmt::Display for NormalBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finer classification used by statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountSubtype {
    /// Cash on hand or at the bank.
    Cash,
    /// Money owed to the business.
    Receivable,
    /// Goods held for sale.
    Inventory,
    /// Short-term obligations.
    CurrentLiability,
    /// Owner capital contributions.
    Capital,
    /// Sales of goods.
    OperatingRevenue,
    /// Direct cost of goods sold.
    CostOfGoodsSold,
    /// Running costs of the business.
    OperatingExpense,
}

/// What produced a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Entered by hand.
    #[default]
    Manual,
    /// Settlement of a delivered order.
    OrderSettlement,
    /// An expense payment.
    Expense,
    /// An agent deposit being verified.
    Deposit,
    /// An agent collection being verified.
    AgentCollection,
    /// A correcting adjustment.
    Adjustment,
    /// Mirror image of an earlier entry.
    Reversal,
}

/// One requested line of a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalLineInput {
    /// Account to post against.
    pub account_id: AccountId,
    /// Debit side amount.
    #[serde(default)]
    pub debit_amount: Decimal,
    /// Credit side amount.
    #[serde(default)]
    pub credit_amount: Decimal,
    /// Optional line memo.
    #[serde(default)]
    pub description: Option<String>,
}

impl JournalLineInput {
    /// A debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit_amount: amount,
            credit_amount: Decimal::ZERO,
            description: None,
        }
    }

    /// A credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit_amount: Decimal::ZERO,
            credit_amount: amount,
            description: None,
        }
    }

    /// Attaches a memo.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A journal entry awaiting validation and posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostEntryInput {
    /// Accounting date of the entry.
    pub entry_date: NaiveDate,
    /// Free-text description.
    pub description: String,
    /// What produced the entry.
    #[serde(default)]
    pub source_type: SourceType,
    /// Identifier in the producing subsystem.
    #[serde(default)]
    pub source_id: Option<uuid::Uuid>,
    /// Debit and credit lines.
    pub lines: Vec<JournalLineInput>,
}

/// Account facts the validator needs.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// The account ID.
    pub id: AccountId,
    /// Account code, for messages.
    pub code: String,
    /// Normal balance side.
    pub normal_balance: NormalBalance,
    /// Whether the account accepts postings.
    pub is_active: bool,
    /// Latest entry date already posted against the account.
    pub last_entry_date: Option<NaiveDate>,
}

/// A line that passed validation, with its signed balance effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLine {
    /// Position in the submitted entry (0-based).
    pub line: usize,
    /// Account to post against.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Signed change to the account's balance.
    pub balance_change: Decimal,
    /// Line memo.
    pub description: Option<String>,
}

/// Debit and credit totals of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryTotals {
    /// Sum of debit amounts.
    pub total_debit: Decimal,
    /// Sum of credit amounts.
    pub total_credit: Decimal,
}

impl EntryTotals {
    /// Sums the sides of the given lines.
    pub fn of<'a>(lines: impl IntoIterator<Item = &'a JournalLineInput>) -> Self {
        lines.into_iter().fold(
            Self {
                total_debit: Decimal::ZERO,
                total_credit: Decimal::ZERO,
            },
            |acc, line| Self {
                total_debit: acc.total_debit + line.debit_amount,
                total_credit: acc.total_credit + line.credit_amount,
            },
        )
    }

    /// Debits equal credits exactly.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}

/// A fully validated entry, ready to persist.
#[derive(Debug, Clone)]
pub struct ValidatedEntry {
    /// Validated lines in submission order.
    pub lines: Vec<ValidatedLine>,
    /// Entry totals.
    pub totals: EntryTotals,
}

impl ValidatedEntry {
    /// Distinct accounts touched, ascending. This is the lock order for posting.
    #[must_use]
    pub fn account_ids(&self) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = self.lines.iter().map(|l| l.account_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// A posted line as seen in an account's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerLineView {
    /// Line ID.
    pub id: LedgerLineId,
    /// Owning journal entry.
    pub journal_entry_id: JournalEntryId,
    /// Entry display number.
    pub entry_number: String,
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// Line memo.
    pub memo: Option<String>,
    /// Debit amount.
    pub debit_amount: Decimal,
    /// Credit amount.
    pub credit_amount: Decimal,
    /// Account balance after this line.
    pub running_balance: Decimal,
    /// Account version after this line.
    pub account_version: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn natural_side_by_type() {
        assert_eq!(AccountType::Asset.natural_side(), NormalBalance::Debit);
        assert_eq!(AccountType::Expense.natural_side(), NormalBalance::Debit);
        assert_eq!(AccountType::Liability.natural_side(), NormalBalance::Credit);
        assert_eq!(AccountType::Equity.natural_side(), NormalBalance::Credit);
        assert_eq!(AccountType::Revenue.natural_side(), NormalBalance::Credit);
    }

    #[test]
    fn balance_change_follows_side() {
        assert_eq!(NormalBalance::Debit.balance_change(dec!(100), dec!(0)), dec!(100));
        assert_eq!(NormalBalance::Debit.balance_change(dec!(0), dec!(40)), dec!(-40));
        assert_eq!(NormalBalance::Credit.balance_change(dec!(0), dec!(100)), dec!(100));
        assert_eq!(NormalBalance::Credit.balance_change(dec!(25), dec!(0)), dec!(-25));
    }

    #[test]
    fn account_type_parses_case_insensitively() {
        assert_eq!("Revenue".parse::<AccountType>().unwrap(), AccountType::Revenue);
        assert!("income".parse::<AccountType>().is_err());
    }

    #[test]
    fn totals_and_balance() {
        let a = AccountId::new();
        let b = AccountId::new();
        let lines = [
            JournalLineInput::debit(a, dec!(40)),
            JournalLineInput::credit(b, dec!(60)),
        ];
        let totals = EntryTotals::of(&lines);
        assert_eq!(totals.total_debit, dec!(40));
        assert_eq!(totals.total_credit, dec!(60));
        assert!(!totals.is_balanced());
    }

    #[test]
    fn line_input_deserializes_missing_side_as_zero() {
        let id = AccountId::new();
        let json = format!(r#"{{"accountId":"{id}","debitAmount":"12.50"}}"#);
        let line: JournalLineInput = serde_json::from_str(&json).unwrap();
        assert_eq!(line.debit_amount, dec!(12.50));
        assert_eq!(line.credit_amount, Decimal::ZERO);
    }
}
