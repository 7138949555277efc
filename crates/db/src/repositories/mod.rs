//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod aging;
pub mod cashflow;
pub mod collection;
pub mod deposit;
pub mod error;
pub mod journal;
pub mod ledger;
pub mod statement;

pub use account::{
    AccountFilter, AccountRepository, AccountWithActivity, CreateAccountInput, PeriodActivity,
};
pub use aging::{AUTO_BLOCK_REASON, AgingRepository};
pub use cashflow::CashFlowRepository;
pub use collection::{CollectionFilter, CollectionRepository, RecordCollectionInput};
pub use deposit::{CreateDepositInput, DepositFilter, DepositReconciliation, DepositRepository};
pub use error::{CollectionStoreError, LedgerStoreError, ReportStoreError};
pub use journal::{JournalRepository, PostedEntry};
pub use ledger::{AccountLedger, DateRange, LedgerQueryRepository};
pub use statement::StatementRepository;

use sea_orm::{AccessMode, DatabaseConnection, DatabaseTransaction, DbErr, IsolationLevel, TransactionTrait};

/// Opens a `REPEATABLE READ, READ ONLY` transaction so multi-query reads see one snapshot.
pub(crate) async fn read_snapshot(db: &DatabaseConnection) -> Result<DatabaseTransaction, DbErr> {
    db.begin_with_config(Some(IsolationLevel::RepeatableRead), Some(AccessMode::ReadOnly))
        .await
}
