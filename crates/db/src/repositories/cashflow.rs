//! Cash flow inputs: system account balances, agent holdings and trailing activity.

use chrono::{DateTime, Duration, Utc};
use codledger_core::cashflow::{CashFlowForecaster, CashFlowKpis, CashFlowReport, ForecastInputs};
use codledger_shared::config::SystemAccounts;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement, Value};

use super::account::AccountRepository;
use super::aging::AgingRepository;
use super::error::LedgerStoreError;
use super::read_snapshot;

#[derive(Debug, FromQueryResult)]
struct SumRow {
    total: Decimal,
}

/// Cash flow repository.
#[derive(Debug, Clone)]
pub struct CashFlowRepository {
    db: DatabaseConnection,
    accounts: SystemAccounts,
}

impl CashFlowRepository {
    /// Creates a repository reading the given system accounts.
    #[must_use]
    pub const fn new(db: DatabaseConnection, accounts: SystemAccounts) -> Self {
        Self { db, accounts }
    }

    /// Builds the cash flow report from one consistent snapshot.
    ///
    /// # Errors
    ///
    /// Returns `AccountCodeNotFound` if a system account is missing from the chart.
    pub async fn report(
        &self,
        now: DateTime<Utc>,
        horizon_days: u32,
        lookback_days: u32,
    ) -> Result<CashFlowReport, LedgerStoreError> {
        let txn = read_snapshot(&self.db).await?;

        let cash_in_hand = AccountRepository::find_by_code_in(&txn, &self.accounts.cash_in_hand).await?;
        let cash_in_transit = AccountRepository::find_by_code_in(&txn, &self.accounts.cash_in_transit).await?;
        let ar_agents = AccountRepository::find_by_code_in(&txn, &self.accounts.ar_agents).await?;

        let aging = AgingRepository::snapshot_in(&txn, now, None).await?;
        let agent_holdings = aging.summary.total_outstanding_amount;

        let since = now - Duration::days(i64::from(lookback_days));
        let trailing_collections = Self::trailing_collections(&txn, since, now).await?;
        let trailing_expenses = Self::trailing_expenses(&txn, since, now).await?;

        txn.commit().await?;

        let inputs = ForecastInputs {
            cash_in_hand: cash_in_hand.current_balance,
            agent_holdings,
            trailing_collections,
            trailing_expenses,
            lookback_days,
        };
        let kpis = CashFlowKpis::new(
            cash_in_hand.current_balance,
            cash_in_transit.current_balance,
            ar_agents.current_balance,
            agent_holdings,
        );

        tracing::debug!(
            seed = %inputs.seed(),
            average_collection = %inputs.average_collection(),
            average_expense = %inputs.average_expense(),
            "Cash flow inputs"
        );

        Ok(CashFlowForecaster::report(now, horizon_days, kpis, &inputs, &aging))
    }

    async fn trailing_collections<C>(conn: &C, since: DateTime<Utc>, until: DateTime<Utc>) -> Result<Decimal, LedgerStoreError>
    where
        C: ConnectionTrait,
    {
        Self::sum(
            conn,
            r"
            SELECT COALESCE(SUM(amount), 0) AS total
            FROM agent_collections
            WHERE collection_date > $1 AND collection_date <= $2
            ",
            [since.into(), until.into()],
        )
        .await
    }

    async fn trailing_expenses<C>(conn: &C, since: DateTime<Utc>, until: DateTime<Utc>) -> Result<Decimal, LedgerStoreError>
    where
        C: ConnectionTrait,
    {
        Self::sum(
            conn,
            r"
            SELECT COALESCE(SUM(lt.debit_amount), 0) AS total
            FROM ledger_transactions lt
            JOIN journal_entries je ON je.id = lt.journal_entry_id
            JOIN accounts a ON a.id = lt.account_id
            WHERE a.account_type = 'expense'
              AND je.entry_date > $1 AND je.entry_date <= $2
            ",
            [since.date_naive().into(), until.date_naive().into()],
        )
        .await
    }

    async fn sum<C>(conn: &C, sql: &str, bounds: [Value; 2]) -> Result<Decimal, LedgerStoreError>
    where
        C: ConnectionTrait,
    {
        let row = SumRow::find_by_statement(Statement::from_sql_and_values(DbBackend::Postgres, sql, bounds))
            .one(conn)
            .await?;
        Ok(row.map_or(Decimal::ZERO, |row| row.total))
    }
}
