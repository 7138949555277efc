//! Statement data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use codledger_shared::types::AccountId;

use crate::ledger::{AccountSubtype, AccountType, NormalBalance};

/// Summed line activity for one account over a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountActivity {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Account subtype.
    pub subtype: Option<AccountSubtype>,
    /// Normal balance side.
    pub normal_balance: NormalBalance,
    /// Sum of debit amounts in the window.
    pub total_debit: Decimal,
    /// Sum of credit amounts in the window.
    pub total_credit: Decimal,
}

impl AccountActivity {
    /// Net balance on the account's normal side.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.normal_balance
            .balance_change(self.total_debit, self.total_credit)
    }

    /// Counts toward cost of goods sold rather than operating expenses.
    #[must_use]
    pub fn is_cogs(&self) -> bool {
        self.account_type == AccountType::Expense
            && self.subtype == Some(AccountSubtype::CostOfGoodsSold)
    }
}

/// One account's line in a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementLine {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Balance shown on the statement.
    pub balance: Decimal,
}

/// A group of statement lines with their total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementSection {
    /// Accounts in this section, by code.
    pub accounts: Vec<StatementLine>,
    /// Section total.
    pub total: Decimal,
}

impl StatementSection {
    pub(crate) fn push(&mut self, activity: &AccountActivity) {
        let balance = activity.balance();
        self.total += balance;
        self.accounts.push(StatementLine {
            account_id: activity.account_id,
            code: activity.code.clone(),
            name: activity.name.clone(),
            balance,
        });
    }
}

/// Equity section, including earnings not yet closed to an equity account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquitySection {
    /// Equity accounts, by code.
    pub accounts: Vec<StatementLine>,
    /// Revenue less cost of goods sold and expenses, cumulative to the as-of date.
    pub retained_earnings: Decimal,
    /// Equity accounts plus retained earnings.
    pub total: Decimal,
}

/// Balance sheet at a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    /// Inclusive as-of date.
    pub as_of_date: NaiveDate,
    /// Assets.
    pub assets: StatementSection,
    /// Liabilities.
    pub liabilities: StatementSection,
    /// Equity.
    pub equity: EquitySection,
    /// Liabilities plus equity.
    pub total_liabilities_and_equity: Decimal,
    /// Assets equal liabilities plus equity.
    pub is_balanced: bool,
}

/// Profit and loss over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitAndLoss {
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Revenue.
    pub revenue: StatementSection,
    /// Cost of goods sold.
    pub cogs: StatementSection,
    /// Revenue less cost of goods sold.
    pub gross_profit: Decimal,
    /// Gross profit as a percentage of revenue, 2 dp.
    pub gross_margin_percentage: Decimal,
    /// Operating and other expenses.
    pub expenses: StatementSection,
    /// Gross profit less expenses.
    pub net_income: Decimal,
    /// Net income as a percentage of revenue, 2 dp.
    pub net_margin_percentage: Decimal,
}
