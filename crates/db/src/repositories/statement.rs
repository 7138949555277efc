//! Statement repository: balance sheet and profit and loss from summed ledger lines.
//!
//! Totals are summed from `ledger_transactions` rather than read from
//! `accounts.current_balance`, so a line that disagrees with its account surfaces as an
//! unbalanced sheet instead of being hidden.

use chrono::NaiveDate;
use codledger_core::ledger::AccountSubtype;
use codledger_core::reports::{AccountActivity, BalanceSheet, ProfitAndLoss, ReportService};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbBackend, FromQueryResult, Statement};
use uuid::Uuid;

use super::error::ReportStoreError;
use super::read_snapshot;
use crate::entities::sea_orm_active_enums;

#[derive(Debug, FromQueryResult)]
struct ActivityRow {
    id: Uuid,
    code: String,
    name: String,
    account_type: sea_orm_active_enums::AccountType,
    account_subtype: Option<sea_orm_active_enums::AccountSubtype>,
    normal_balance: sea_orm_active_enums::NormalBalance,
    total_debit: Decimal,
    total_credit: Decimal,
}

impl From<ActivityRow> for AccountActivity {
    fn from(row: ActivityRow) -> Self {
        Self {
            account_id: row.id.into(),
            code: row.code,
            name: row.name,
            account_type: row.account_type.into(),
            subtype: row.account_subtype.map(AccountSubtype::from),
            normal_balance: row.normal_balance.into(),
            total_debit: row.total_debit,
            total_credit: row.total_credit,
        }
    }
}

// Enum columns are cast to text so they decode into the string-backed active enums.
const ACTIVITY_SQL: &str = r"
SELECT a.id, a.code, a.name,
       a.account_type::text AS account_type,
       a.account_subtype::text AS account_subtype,
       a.normal_balance::text AS normal_balance,
       COALESCE(t.total_debit, 0) AS total_debit,
       COALESCE(t.total_credit, 0) AS total_credit
FROM accounts a
LEFT JOIN (
    SELECT lt.account_id,
           SUM(lt.debit_amount) AS total_debit,
           SUM(lt.credit_amount) AS total_credit
    FROM ledger_transactions lt
    JOIN journal_entries je ON je.id = lt.journal_entry_id
    WHERE je.entry_date <= $1
      AND ($2::date IS NULL OR je.entry_date >= $2)
    GROUP BY lt.account_id
) t ON t.account_id = a.id
WHERE a.is_active OR t.account_id IS NOT NULL
ORDER BY a.code
";

/// Statement repository.
#[derive(Debug, Clone)]
pub struct StatementRepository {
    db: DatabaseConnection,
}

impl StatementRepository {
    /// Creates a new statement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Balance sheet with cumulative activity up to and including `as_of`.
    ///
    /// An unbalanced result is returned as-is and logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn balance_sheet(&self, as_of: NaiveDate) -> Result<BalanceSheet, ReportStoreError> {
        let txn = read_snapshot(&self.db).await?;
        let activity = Self::activity(&txn, None, as_of).await?;
        txn.commit().await?;

        let sheet = ReportService::balance_sheet(as_of, &activity);
        if !sheet.is_balanced {
            tracing::warn!(
                as_of = %as_of,
                assets = %sheet.assets.total,
                liabilities_and_equity = %sheet.total_liabilities_and_equity,
                "Balance sheet does not balance"
            );
        }
        Ok(sheet)
    }

    /// Profit and loss over `[start, end]` inclusive.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` when `start` is after `end`.
    pub async fn profit_and_loss(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ProfitAndLoss, ReportStoreError> {
        ReportService::validate_range(start, end)?;

        let txn = read_snapshot(&self.db).await?;
        let activity = Self::activity(&txn, Some(start), end).await?;
        txn.commit().await?;

        Ok(ReportService::profit_and_loss(start, end, &activity)?)
    }

    async fn activity(
        txn: &DatabaseTransaction,
        from: Option<NaiveDate>,
        to: NaiveDate,
    ) -> Result<Vec<AccountActivity>, ReportStoreError> {
        let rows = ActivityRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            ACTIVITY_SQL,
            [to.into(), from.into()],
        ))
        .all(txn)
        .await?;

        Ok(rows.into_iter().map(AccountActivity::from).collect())
    }
}
