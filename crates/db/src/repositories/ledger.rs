//! Read side of the ledger: account history, point-in-time balances and CSV export.

use chrono::NaiveDate;
use codledger_core::export;
use codledger_core::ledger::LedgerLineView;
use codledger_shared::types::{AccountId, PageRequest, PageResponse};
use futures::stream::{self, Stream, StreamExt};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Statement,
    Value,
};
use uuid::Uuid;

use super::account::AccountRepository;
use super::error::LedgerStoreError;
use super::read_snapshot;
use crate::entities::{accounts, journal_entries, ledger_transactions};

/// Rows fetched per export chunk.
pub const EXPORT_CHUNK_SIZE: i64 = 500;

/// Optional inclusive bounds on entry date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// Earliest entry date.
    pub start: Option<NaiveDate>,
    /// Latest entry date.
    pub end: Option<NaiveDate>,
}

/// One page of an account's ledger, oldest first.
#[derive(Debug, Clone)]
pub struct AccountLedger {
    /// The account.
    pub account: accounts::Model,
    /// Lines on this page.
    pub transactions: PageResponse<LedgerLineView>,
}

#[derive(Debug, FromQueryResult)]
struct LedgerRow {
    id: Uuid,
    journal_entry_id: Uuid,
    entry_number: String,
    entry_date: NaiveDate,
    description: String,
    memo: Option<String>,
    debit_amount: Decimal,
    credit_amount: Decimal,
    running_balance: Decimal,
    account_version: i64,
}

impl From<LedgerRow> for LedgerLineView {
    fn from(row: LedgerRow) -> Self {
        Self {
            id: row.id.into(),
            journal_entry_id: row.journal_entry_id.into(),
            entry_number: row.entry_number,
            entry_date: row.entry_date,
            description: row.description,
            memo: row.memo,
            debit_amount: row.debit_amount,
            credit_amount: row.credit_amount,
            running_balance: row.running_balance,
            account_version: row.account_version,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

const LINES_FROM: &str = r"
FROM ledger_transactions lt
JOIN journal_entries je ON je.id = lt.journal_entry_id
WHERE lt.account_id = $1
  AND ($2::date IS NULL OR je.entry_date >= $2)
  AND ($3::date IS NULL OR je.entry_date <= $3)
";

const LINE_COLUMNS: &str = r"
SELECT lt.id, lt.journal_entry_id, je.entry_number, je.entry_date, je.description,
       lt.description AS memo, lt.debit_amount, lt.credit_amount, lt.running_balance,
       lt.account_version
";

fn base_values(account_id: AccountId, range: DateRange) -> Vec<Value> {
    vec![account_id.into_inner().into(), range.start.into(), range.end.into()]
}

/// Ledger query repository.
#[derive(Debug, Clone)]
pub struct LedgerQueryRepository {
    db: DatabaseConnection,
}

impl LedgerQueryRepository {
    /// Creates a new ledger query repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// One page of an account's lines ordered by entry date, then posting order.
    ///
    /// The count and the page come from the same snapshot.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no such account exists.
    pub async fn get_ledger(
        &self,
        account_id: AccountId,
        range: DateRange,
        page: PageRequest,
    ) -> Result<AccountLedger, LedgerStoreError> {
        let page = page.normalized();
        let txn = read_snapshot(&self.db).await?;

        let account = AccountRepository::get_in(&txn, account_id).await?;

        let count = CountRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!("SELECT COUNT(*) AS total {LINES_FROM}"),
            base_values(account_id, range),
        ))
        .one(&txn)
        .await?
        .map_or(0, |row| row.total);

        let mut values = base_values(account_id, range);
        values.push(i64::try_from(page.limit()).unwrap_or(i64::MAX).into());
        values.push(i64::try_from(page.offset()).unwrap_or(i64::MAX).into());
        let rows = LedgerRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!(
                "{LINE_COLUMNS} {LINES_FROM} ORDER BY je.entry_date, lt.account_version LIMIT $4 OFFSET $5"
            ),
            values,
        ))
        .all(&txn)
        .await?;

        txn.commit().await?;

        let lines = rows.into_iter().map(LedgerLineView::from).collect();
        Ok(AccountLedger {
            account,
            transactions: PageResponse::new(lines, page, u64::try_from(count).unwrap_or_default()),
        })
    }

    /// Running balance of the last line dated on or before `as_of`, zero if none.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no such account exists.
    pub async fn balance_as_of(&self, account_id: AccountId, as_of: NaiveDate) -> Result<Decimal, LedgerStoreError> {
        let txn = read_snapshot(&self.db).await?;
        AccountRepository::get_in(&txn, account_id).await?;

        let last = ledger_transactions::Entity::find()
            .join(JoinType::InnerJoin, ledger_transactions::Relation::JournalEntries.def())
            .filter(ledger_transactions::Column::AccountId.eq(account_id.into_inner()))
            .filter(journal_entries::Column::EntryDate.lte(as_of))
            .order_by_desc(ledger_transactions::Column::AccountVersion)
            .limit(1)
            .one(&txn)
            .await?;

        txn.commit().await?;
        Ok(last.map_or(Decimal::ZERO, |line| line.running_balance))
    }

    /// Streams the account's lines as CSV: the header, then chunks of rows.
    ///
    /// Only lines that existed when the export started are included, however long the
    /// consumer takes to drain the stream.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` before streaming starts. Later failures end the stream
    /// with an error item.
    pub async fn export_ledger(
        &self,
        account_id: AccountId,
        range: DateRange,
    ) -> Result<impl Stream<Item = Result<Vec<u8>, LedgerStoreError>> + Send + 'static, LedgerStoreError> {
        let account = AccountRepository::get_in(&self.db, account_id).await?;
        let ceiling = account.version;
        let db = self.db.clone();

        tracing::debug!(account_id = %account_id, ceiling, "Starting ledger export");

        let header = stream::once(async { export::ledger_header().map_err(LedgerStoreError::from) });
        let rows = stream::try_unfold(Some(0_i64), move |cursor| {
            let db = db.clone();
            async move {
                let Some(after) = cursor else {
                    return Ok(None);
                };
                let lines = Self::export_chunk(&db, account_id, range, after, ceiling).await?;
                if lines.is_empty() {
                    return Ok(None);
                }
                let next = if i64::try_from(lines.len()).unwrap_or(i64::MAX) < EXPORT_CHUNK_SIZE {
                    None
                } else {
                    lines.last().map(|line| line.account_version)
                };
                let bytes = export::ledger_rows(&lines)?;
                Ok::<_, LedgerStoreError>(Some((bytes, next)))
            }
        });

        Ok(header.chain(rows))
    }

    async fn export_chunk<C>(
        conn: &C,
        account_id: AccountId,
        range: DateRange,
        after_version: i64,
        ceiling: i64,
    ) -> Result<Vec<LedgerLineView>, LedgerStoreError>
    where
        C: ConnectionTrait,
    {
        let mut values = base_values(account_id, range);
        values.push(after_version.into());
        values.push(ceiling.into());
        values.push(EXPORT_CHUNK_SIZE.into());

        let rows = LedgerRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!(
                "{LINE_COLUMNS} {LINES_FROM} AND lt.account_version > $4 AND lt.account_version <= $5 \
                 ORDER BY lt.account_version LIMIT $6"
            ),
            values,
        ))
        .all(conn)
        .await?;

        Ok(rows.into_iter().map(LedgerLineView::from).collect())
    }
}
