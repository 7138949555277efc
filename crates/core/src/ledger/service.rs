//! Ledger service: pure validation of journal entries and accounts.
//!
//! Nothing here touches storage. Callers supply account facts through a lookup closure,
//! which lets the database layer run the same rules inside its posting transaction.

use rust_decimal::Decimal;
use codledger_shared::types::AccountId;

use super::error::{LedgerError, LineDefect};
use super::types::{
    AccountInfo, AccountType, EntryTotals, JournalLineInput, NormalBalance, PostEntryInput,
    ValidatedEntry, ValidatedLine,
};

/// Decimal places stored for every money column.
pub const AMOUNT_SCALE: u32 = 4;

/// Exclusive upper bound of a storable amount (`NUMERIC(19, 4)`).
pub const AMOUNT_LIMIT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Ledger service for entry and account validation.
pub struct LedgerService;

impl LedgerService {
    /// Validates a journal entry before it is persisted.
    ///
    /// Checks run in this order and the first failure wins:
    /// 1. at least 2 lines
    /// 2. every line has exactly one positive side
    /// 3. every account exists and is active
    /// 4. total debit equals total credit
    /// 5. the total is greater than zero
    /// 6. the entry date is not earlier than the last posting on any touched account
    ///
    /// # Errors
    ///
    /// Returns the first structural `LedgerError` found.
    pub fn validate_entry<A>(
        input: &PostEntryInput,
        account_lookup: A,
    ) -> Result<ValidatedEntry, LedgerError>
    where
        A: Fn(AccountId) -> Option<AccountInfo>,
    {
        if input.lines.len() < 2 {
            return Err(LedgerError::InsufficientLines {
                count: input.lines.len(),
            });
        }

        for (line, entry) in input.lines.iter().enumerate() {
            Self::check_line(entry).map_err(|defect| LedgerError::InvalidLine { line, defect })?;
        }

        let mut accounts = Vec::with_capacity(input.lines.len());
        for (line, entry) in input.lines.iter().enumerate() {
            let info = account_lookup(entry.account_id).ok_or(LedgerError::UnknownAccount {
                line,
                account_id: entry.account_id,
            })?;
            if !info.is_active {
                return Err(LedgerError::AccountInactive {
                    line,
                    account_id: info.id,
                    code: info.code,
                });
            }
            accounts.push(info);
        }

        let totals = EntryTotals::of(&input.lines);
        if !totals.is_balanced() {
            return Err(LedgerError::Unbalanced {
                debit: totals.total_debit,
                credit: totals.total_credit,
            });
        }
        if totals.total_debit <= Decimal::ZERO {
            return Err(LedgerError::ZeroTotal);
        }

        for (line, info) in accounts.iter().enumerate() {
            if let Some(last) = info.last_entry_date
                && input.entry_date < last
            {
                return Err(LedgerError::BackdatedEntry {
                    line,
                    account_id: info.id,
                    entry_date: input.entry_date,
                    last_entry_date: last,
                });
            }
        }

        let lines = input
            .lines
            .iter()
            .zip(&accounts)
            .enumerate()
            .map(|(line, (entry, info))| ValidatedLine {
                line,
                account_id: entry.account_id,
                debit: entry.debit_amount,
                credit: entry.credit_amount,
                balance_change: info
                    .normal_balance
                    .balance_change(entry.debit_amount, entry.credit_amount),
                description: entry.description.clone(),
            })
            .collect();

        Ok(ValidatedEntry { lines, totals })
    }

    fn check_line(entry: &JournalLineInput) -> Result<(), LineDefect> {
        let (debit, credit) = (entry.debit_amount, entry.credit_amount);
        if debit < Decimal::ZERO || credit < Decimal::ZERO {
            return Err(LineDefect::NegativeAmount);
        }
        let amount = match (debit.is_zero(), credit.is_zero()) {
            (false, false) => return Err(LineDefect::BothSides),
            (true, true) => return Err(LineDefect::NoAmount),
            (false, true) => debit,
            (true, false) => credit,
        };
        if amount.round_dp(AMOUNT_SCALE) != amount {
            return Err(LineDefect::TooPrecise);
        }
        if amount >= AMOUNT_LIMIT {
            return Err(LineDefect::OutOfRange);
        }
        Ok(())
    }

    /// Validates a new account's code and normal balance against its type.
    ///
    /// Codes are exactly four ASCII digits inside the type's reserved range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAccountCode` or `NormalBalanceMismatch`.
    pub fn validate_new_account(
        code: &str,
        account_type: AccountType,
        normal_balance: NormalBalance,
    ) -> Result<(), LedgerError> {
        let invalid = |reason: &str| LedgerError::InvalidAccountCode {
            code: code.to_string(),
            account_type,
            reason: reason.to_string(),
        };

        if code.len() != 4 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("must be exactly 4 digits"));
        }
        let value: u16 = code.parse().map_err(|_| invalid("must be numeric"))?;
        let (low, high) = account_type.code_range();
        if !(low..=high).contains(&value) {
            return Err(invalid(&format!("must be between {low} and {high}")));
        }

        let expected = account_type.natural_side();
        if normal_balance != expected {
            return Err(LedgerError::NormalBalanceMismatch {
                account_type,
                expected,
                actual: normal_balance,
            });
        }
        Ok(())
    }

    /// Lines of the entry that undoes `lines`: every side swapped.
    #[must_use]
    pub fn reversal_lines(lines: &[JournalLineInput]) -> Vec<JournalLineInput> {
        lines
            .iter()
            .map(|line| JournalLineInput {
                account_id: line.account_id,
                debit_amount: line.credit_amount,
                credit_amount: line.debit_amount,
                description: line.description.clone(),
            })
            .collect()
    }
}
