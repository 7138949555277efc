//! Statement generation from summed account activity.
//!
//! Balances are derived from summed line amounts, never from stored account balances,
//! so a damaged line shows up as an unbalanced sheet instead of being masked.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::ReportError;
use super::types::{
    AccountActivity, BalanceSheet, EquitySection, ProfitAndLoss, StatementSection,
};
use crate::ledger::AccountType;

const PERCENT_DP: u32 = 2;

/// Service for generating financial statements.
pub struct ReportService;

impl ReportService {
    /// Rejects a period whose start is after its end.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange`.
    pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), ReportError> {
        if start > end {
            return Err(ReportError::InvalidDateRange { start, end });
        }
        Ok(())
    }

    /// Builds the balance sheet from cumulative activity up to `as_of_date`.
    ///
    /// `is_balanced` reports whether assets equal liabilities plus equity; an
    /// imbalance is surfaced as-is.
    #[must_use]
    pub fn balance_sheet(as_of_date: NaiveDate, activity: &[AccountActivity]) -> BalanceSheet {
        let mut assets = StatementSection::default();
        let mut liabilities = StatementSection::default();
        let mut equity_accounts = StatementSection::default();
        let mut income = IncomeTotals::default();

        for account in Self::sorted(activity) {
            match account.account_type {
                AccountType::Asset => assets.push(account),
                AccountType::Liability => liabilities.push(account),
                AccountType::Equity => equity_accounts.push(account),
                AccountType::Revenue | AccountType::Expense => income.add(account),
            }
        }

        let retained_earnings = income.net_income();
        let equity = EquitySection {
            total: equity_accounts.total + retained_earnings,
            accounts: equity_accounts.accounts,
            retained_earnings,
        };
        let total_liabilities_and_equity = liabilities.total + equity.total;

        BalanceSheet {
            as_of_date,
            is_balanced: assets.total == total_liabilities_and_equity,
            assets,
            liabilities,
            equity,
            total_liabilities_and_equity,
        }
    }

    /// Builds the profit and loss statement from activity within `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` when `start > end`.
    pub fn profit_and_loss(
        start_date: NaiveDate,
        end_date: NaiveDate,
        activity: &[AccountActivity],
    ) -> Result<ProfitAndLoss, ReportError> {
        Self::validate_range(start_date, end_date)?;

        let mut revenue = StatementSection::default();
        let mut cogs = StatementSection::default();
        let mut expenses = StatementSection::default();

        for account in Self::sorted(activity) {
            match account.account_type {
                AccountType::Revenue => revenue.push(account),
                AccountType::Expense if account.is_cogs() => cogs.push(account),
                AccountType::Expense => expenses.push(account),
                _ => {}
            }
        }

        let gross_profit = revenue.total - cogs.total;
        let net_income = gross_profit - expenses.total;

        Ok(ProfitAndLoss {
            start_date,
            end_date,
            gross_margin_percentage: Self::margin(gross_profit, revenue.total),
            net_margin_percentage: Self::margin(net_income, revenue.total),
            revenue,
            cogs,
            gross_profit,
            expenses,
            net_income,
        })
    }

    /// `part / revenue * 100` rounded to 2 dp; zero when revenue is zero.
    #[must_use]
    pub fn margin(part: Decimal, revenue: Decimal) -> Decimal {
        if revenue.is_zero() {
            return Decimal::ZERO;
        }
        (part / revenue * Decimal::ONE_HUNDRED).round_dp(PERCENT_DP)
    }

    fn sorted(activity: &[AccountActivity]) -> Vec<&AccountActivity> {
        let mut accounts: Vec<&AccountActivity> = activity.iter().collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        accounts
    }
}

#[derive(Default)]
struct IncomeTotals {
    revenue: Decimal,
    cogs: Decimal,
    expenses: Decimal,
}

impl IncomeTotals {
    fn add(&mut self, account: &AccountActivity) {
        let balance = account.balance();
        match account.account_type {
            AccountType::Revenue => self.revenue += balance,
            AccountType::Expense if account.is_cogs() => self.cogs += balance,
            AccountType::Expense => self.expenses += balance,
            _ => {}
        }
    }

    fn net_income(&self) -> Decimal {
        self.revenue - self.cogs - self.expenses
    }
}
