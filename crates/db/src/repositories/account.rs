//! Account repository for chart of accounts database operations.
//!
//! Balances are only ever changed through [`AccountRepository::apply_line`], which takes
//! the posting transaction so it cannot run on its own.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use codledger_core::ledger::{
    AccountInfo, AccountSubtype, AccountType, LedgerError, LedgerService, NormalBalance,
    RunningBalance,
};
use codledger_shared::types::{AccountId, PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set, Statement,
};
use uuid::Uuid;

use super::error::{is_unique_violation, LedgerStoreError};
use crate::entities::{accounts, journal_entries, ledger_transactions, sea_orm_active_enums};

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Four digit code inside the type's range.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Account type.
    pub account_type: AccountType,
    /// Optional subtype.
    pub account_subtype: Option<AccountSubtype>,
    /// Must agree with the account type.
    pub normal_balance: NormalBalance,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountFilter {
    /// Only accounts of this type.
    pub account_type: Option<AccountType>,
    /// Only active or only inactive accounts.
    pub is_active: Option<bool>,
    /// Include debit and credit totals for entries dated inside this range.
    pub activity: Option<(NaiveDate, NaiveDate)>,
}

/// Debit and credit totals of an account over a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeriodActivity {
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
}

/// Account with its optional period activity.
#[derive(Debug, Clone)]
pub struct AccountWithActivity {
    /// The account record.
    pub account: accounts::Model,
    /// Present when the listing asked for an activity range.
    pub activity: Option<PeriodActivity>,
}

#[derive(Debug, FromQueryResult)]
struct ActivityRow {
    account_id: Uuid,
    total_debit: Decimal,
    total_credit: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct AppliedRow {
    version: i64,
    current_balance: Decimal,
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAccountCode`, `NormalBalanceMismatch` or `DuplicateAccountCode`.
    pub async fn create(&self, input: CreateAccountInput) -> Result<accounts::Model, LedgerStoreError> {
        LedgerService::validate_new_account(&input.code, input.account_type, input.normal_balance)?;

        let exists = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(&input.code))
            .count(&self.db)
            .await?;
        if exists > 0 {
            return Err(LedgerError::DuplicateAccountCode(input.code).into());
        }

        let now = Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            code: Set(input.code.clone()),
            name: Set(input.name),
            description: Set(input.description),
            account_type: Set(input.account_type.into()),
            account_subtype: Set(input.account_subtype.map(Into::into)),
            normal_balance: Set(input.normal_balance.into()),
            current_balance: Set(Decimal::ZERO),
            version: Set(0),
            last_entry_date: Set(None),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // A concurrent insert can still win between the check and the insert.
        match account.insert(&self.db).await {
            Ok(model) => {
                tracing::info!(account_id = %model.id, code = %model.code, "Account created");
                Ok(model)
            }
            Err(err) if is_unique_violation(&err) => {
                Err(LedgerError::DuplicateAccountCode(input.code).into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Gets an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no such account exists.
    pub async fn get(&self, id: AccountId) -> Result<accounts::Model, LedgerStoreError> {
        Self::get_in(&self.db, id).await
    }

    pub(crate) async fn get_in<C>(conn: &C, id: AccountId) -> Result<accounts::Model, LedgerStoreError>
    where
        C: ConnectionTrait,
    {
        accounts::Entity::find_by_id(id.into_inner())
            .one(conn)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(id).into())
    }

    /// Finds an account by its code.
    ///
    /// # Errors
    ///
    /// Returns `AccountCodeNotFound` if no account has this code.
    pub async fn find_by_code(&self, code: &str) -> Result<accounts::Model, LedgerStoreError> {
        Self::find_by_code_in(&self.db, code).await
    }

    pub(crate) async fn find_by_code_in<C>(conn: &C, code: &str) -> Result<accounts::Model, LedgerStoreError>
    where
        C: ConnectionTrait,
    {
        accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code))
            .one(conn)
            .await?
            .ok_or_else(|| LedgerError::AccountCodeNotFound(code.to_string()).into())
    }

    /// Lists accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: AccountFilter,
        page: PageRequest,
    ) -> Result<PageResponse<AccountWithActivity>, LedgerStoreError> {
        let page = page.normalized();

        let mut query = accounts::Entity::find();
        if let Some(account_type) = filter.account_type {
            query = query.filter(
                accounts::Column::AccountType.eq(sea_orm_active_enums::AccountType::from(account_type)),
            );
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(is_active));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_asc(accounts::Column::Code)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let activity = match filter.activity {
            Some((from, to)) => {
                let ids: Vec<Uuid> = rows.iter().map(|a| a.id).collect();
                Some(self.period_activity(&ids, from, to).await?)
            }
            None => None,
        };

        let data = rows
            .into_iter()
            .map(|account| {
                let period = activity
                    .as_ref()
                    .map(|totals| totals.get(&account.id).copied().unwrap_or_default());
                AccountWithActivity {
                    account,
                    activity: period,
                }
            })
            .collect();

        Ok(PageResponse::new(data, page, total))
    }

    async fn period_activity(
        &self,
        ids: &[Uuid],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashMap<Uuid, PeriodActivity>, LedgerStoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = ledger_transactions::Entity::find()
            .select_only()
            .column(ledger_transactions::Column::AccountId)
            .column_as(ledger_transactions::Column::DebitAmount.sum(), "total_debit")
            .column_as(ledger_transactions::Column::CreditAmount.sum(), "total_credit")
            .join(JoinType::InnerJoin, ledger_transactions::Relation::JournalEntries.def())
            .filter(ledger_transactions::Column::AccountId.is_in(ids.iter().copied()))
            .filter(journal_entries::Column::EntryDate.between(from, to))
            .group_by(ledger_transactions::Column::AccountId)
            .into_model::<ActivityRow>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.account_id,
                    PeriodActivity {
                        total_debit: row.total_debit,
                        total_credit: row.total_credit,
                    },
                )
            })
            .collect())
    }

    /// Activates or deactivates an account. Inactive accounts reject new postings.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no such account exists.
    pub async fn set_active(&self, id: AccountId, is_active: bool) -> Result<accounts::Model, LedgerStoreError> {
        let account = self.get(id).await?;
        if account.is_active == is_active {
            return Ok(account);
        }

        let mut active: accounts::ActiveModel = account.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&self.db).await?;

        tracing::info!(account_id = %id, is_active, "Account activation changed");
        Ok(updated)
    }

    /// Locks the given accounts for the rest of `txn`, in ascending id order.
    ///
    /// Accounts that do not exist are simply absent from the result.
    pub(crate) async fn lock_for_posting(
        txn: &DatabaseTransaction,
        ids: &[AccountId],
    ) -> Result<HashMap<AccountId, AccountInfo>, LedgerStoreError> {
        let mut sorted: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        sorted.sort_unstable();
        sorted.dedup();

        let rows = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(sorted))
            .order_by_asc(accounts::Column::Id)
            .lock_exclusive()
            .all(txn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|account| {
                let id = AccountId::from_uuid(account.id);
                (
                    id,
                    AccountInfo {
                        id,
                        code: account.code,
                        normal_balance: account.normal_balance.into(),
                        is_active: account.is_active,
                        last_entry_date: account.last_entry_date,
                    },
                )
            })
            .collect())
    }

    /// Atomically adds `change` to the account balance and bumps its version.
    ///
    /// `change` is already signed by the account's normal balance. Must run inside the
    /// posting transaction, after the account row was locked.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account vanished.
    pub async fn apply_line(
        txn: &DatabaseTransaction,
        account_id: AccountId,
        change: Decimal,
        entry_date: NaiveDate,
    ) -> Result<RunningBalance, LedgerStoreError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r"
            UPDATE accounts
            SET current_balance = current_balance + $1,
                version = version + 1,
                last_entry_date = GREATEST(COALESCE(last_entry_date, $2), $2),
                updated_at = now()
            WHERE id = $3
            RETURNING version, current_balance
            ",
            [change.into(), entry_date.into(), account_id.into_inner().into()],
        );

        let row = AppliedRow::find_by_statement(stmt)
            .one(txn)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        Ok(RunningBalance {
            account_version: row.version,
            previous_balance: row.current_balance - change,
            current_balance: row.current_balance,
        })
    }
}
