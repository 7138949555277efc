//! Journal entry repository: the single write path for ledger balances.
//!
//! Posting an entry is one database transaction:
//! 1. lock every touched account row (`FOR UPDATE`, ascending id)
//! 2. validate against the locked rows
//! 3. take the next entry number for the entry date
//! 4. insert the header, apply each line to its account and insert the line
//!
//! Any failure rolls the whole thing back, including the entry number.

use chrono::{NaiveDate, Utc};
use codledger_core::ledger::{
    format_entry_number, JournalLineInput, LedgerError, LedgerService, PostEntryInput, SourceType,
};
use codledger_shared::types::{JournalEntryId, LedgerLineId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbBackend,
    EntityTrait, FromQueryResult, QueryFilter, QueryOrder, Set, Statement, TransactionTrait,
};

use super::account::AccountRepository;
use super::error::LedgerStoreError;
use crate::entities::{journal_entries, journal_entry_counters, ledger_transactions};

/// A posted entry with its lines in line order.
#[derive(Debug, Clone)]
pub struct PostedEntry {
    /// Entry header.
    pub entry: journal_entries::Model,
    /// Lines, each carrying the running balance it produced.
    pub lines: Vec<ledger_transactions::Model>,
}

#[derive(Debug, FromQueryResult)]
struct SequenceRow {
    last_sequence: i64,
}

/// Journal entry repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Validates and posts a journal entry atomically.
    ///
    /// # Errors
    ///
    /// Returns a structural `LedgerError` if the entry is rejected. Nothing is written in
    /// that case.
    pub async fn post_entry(&self, input: PostEntryInput) -> Result<PostedEntry, LedgerStoreError> {
        let txn = self.db.begin().await?;

        let posted = match Self::post_entry_in(&txn, &input).await {
            Ok(posted) => posted,
            Err(err) => {
                txn.rollback().await?;
                if let LedgerStoreError::Ledger(rule) = &err {
                    tracing::warn!(
                        error_code = rule.error_code(),
                        line = ?rule.line(),
                        "Journal entry rejected: {rule}"
                    );
                }
                return Err(err);
            }
        };

        txn.commit().await?;

        tracing::info!(
            entry_number = %posted.entry.entry_number,
            journal_entry_id = %posted.entry.id,
            total = %posted.entry.total_amount,
            lines = posted.lines.len(),
            "Journal entry posted"
        );
        Ok(posted)
    }

    /// Posts an entry inside a caller-owned transaction.
    ///
    /// Used when a posting must commit together with another change, such as a
    /// collection status update.
    ///
    /// # Errors
    ///
    /// Same as [`Self::post_entry`]; the caller must roll back on error.
    pub async fn post_entry_in(
        txn: &DatabaseTransaction,
        input: &PostEntryInput,
    ) -> Result<PostedEntry, LedgerStoreError> {
        let requested: Vec<_> = input.lines.iter().map(|line| line.account_id).collect();
        let locked = AccountRepository::lock_for_posting(txn, &requested).await?;

        let validated = LedgerService::validate_entry(input, |id| locked.get(&id).cloned())?;

        let sequence = Self::next_sequence(txn, input.entry_date).await?;
        let now = Utc::now().into();

        let entry = journal_entries::ActiveModel {
            id: Set(JournalEntryId::new().into_inner()),
            entry_number: Set(format_entry_number(input.entry_date, sequence)),
            entry_date: Set(input.entry_date),
            description: Set(input.description.clone()),
            source_type: Set(input.source_type.into()),
            source_id: Set(input.source_id),
            total_amount: Set(validated.totals.total_debit),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;

        let mut lines = Vec::with_capacity(validated.lines.len());
        for line in &validated.lines {
            let balance =
                AccountRepository::apply_line(txn, line.account_id, line.balance_change, input.entry_date)
                    .await?;

            let inserted = ledger_transactions::ActiveModel {
                id: Set(LedgerLineId::new().into_inner()),
                journal_entry_id: Set(entry.id),
                account_id: Set(line.account_id.into_inner()),
                line_number: Set(i32::try_from(line.line).unwrap_or(i32::MAX)),
                debit_amount: Set(line.debit),
                credit_amount: Set(line.credit),
                account_version: Set(balance.account_version),
                account_previous_balance: Set(balance.previous_balance),
                running_balance: Set(balance.current_balance),
                description: Set(line.description.clone()),
                created_at: Set(now),
            }
            .insert(txn)
            .await?;

            lines.push(inserted);
        }

        Ok(PostedEntry { entry, lines })
    }

    /// Increments the counter row for `date`, creating it on first use.
    ///
    /// The row stays locked until the transaction ends, so numbers are gap-free per date.
    async fn next_sequence(txn: &DatabaseTransaction, date: NaiveDate) -> Result<i64, LedgerStoreError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r"
            INSERT INTO journal_entry_counters (entry_date, last_sequence)
            VALUES ($1, 1)
            ON CONFLICT (entry_date)
            DO UPDATE SET last_sequence = journal_entry_counters.last_sequence + 1
            RETURNING last_sequence
            ",
            [date.into()],
        );

        let row = SequenceRow::find_by_statement(stmt)
            .one(txn)
            .await?
            .ok_or_else(|| sea_orm::DbErr::RecordNotInserted)?;
        Ok(row.last_sequence)
    }

    /// Last entry number handed out for `date`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn last_sequence(&self, date: NaiveDate) -> Result<Option<i64>, LedgerStoreError> {
        Ok(journal_entry_counters::Entity::find_by_id(date)
            .one(&self.db)
            .await?
            .map(|counter| counter.last_sequence))
    }

    /// Gets a posted entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if no such entry exists.
    pub async fn get_entry(&self, id: JournalEntryId) -> Result<PostedEntry, LedgerStoreError> {
        let entry = journal_entries::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))?;

        let lines = ledger_transactions::Entity::find()
            .filter(ledger_transactions::Column::JournalEntryId.eq(entry.id))
            .order_by_asc(ledger_transactions::Column::LineNumber)
            .all(&self.db)
            .await?;

        Ok(PostedEntry { entry, lines })
    }

    /// Posts the mirror image of an entry, dated `entry_date`.
    ///
    /// The original stays untouched; the reversal points back at it through `source_id`.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound`, or any rejection of the reversal itself (for example an
    /// account deactivated since the original was posted).
    pub async fn reverse_entry(
        &self,
        id: JournalEntryId,
        entry_date: NaiveDate,
        description: Option<String>,
    ) -> Result<PostedEntry, LedgerStoreError> {
        let original = self.get_entry(id).await?;

        let lines: Vec<JournalLineInput> = original
            .lines
            .iter()
            .map(|line| JournalLineInput {
                account_id: line.account_id.into(),
                debit_amount: line.debit_amount,
                credit_amount: line.credit_amount,
                description: line.description.clone(),
            })
            .collect();

        let input = PostEntryInput {
            entry_date,
            description: description
                .unwrap_or_else(|| format!("Reversal of {}", original.entry.entry_number)),
            source_type: SourceType::Reversal,
            source_id: Some(original.entry.id),
            lines: LedgerService::reversal_lines(&lines),
        };

        self.post_entry(input).await
    }
}
