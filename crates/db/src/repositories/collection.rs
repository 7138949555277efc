//! Collection repository: agent collections and their status transitions.
//!
//! Every transition is a single conditional update (`WHERE id = ? AND status = ?`), so two
//! concurrent verifications of the same collection cannot both succeed. When GL postings
//! are enabled the entry is posted in the same transaction as the status change.

use chrono::{DateTime, Utc};
use codledger_core::collections::{
    BulkOutcome, Collection, CollectionAccounts, CollectionLifecycle, CollectionStatus,
    LifecycleError,
};
use codledger_shared::config::SystemAccounts;
use codledger_shared::types::{AgentId, CollectionId, OrderId, PageRequest, PageResponse};
use futures::future::join_all;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::account::AccountRepository;
use super::error::{is_unique_violation, CollectionStoreError, LedgerStoreError};
use super::journal::JournalRepository;
use crate::entities::{agent_collections, sea_orm_active_enums};

/// Input for recording a collection.
#[derive(Debug, Clone)]
pub struct RecordCollectionInput {
    /// Order the cash was collected for. One collection per order.
    pub order_id: OrderId,
    /// Collecting agent.
    pub agent_id: AgentId,
    /// Amount collected.
    pub amount: Decimal,
    /// When the cash was collected.
    pub collection_date: DateTime<Utc>,
}

/// Filter options for listing collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionFilter {
    /// Only this agent's collections.
    pub agent_id: Option<AgentId>,
    /// Only collections in this status.
    pub status: Option<CollectionStatus>,
    /// Collected at or after.
    pub from: Option<DateTime<Utc>>,
    /// Collected at or before.
    pub to: Option<DateTime<Utc>>,
}

impl From<agent_collections::Model> for Collection {
    fn from(model: agent_collections::Model) -> Self {
        Self {
            id: model.id.into(),
            order_id: model.order_id.into(),
            agent_id: model.agent_id.into(),
            amount: model.amount,
            status: model.status.into(),
            collection_date: model.collection_date.with_timezone(&Utc),
            verified_at: model.verified_at.map(|at| at.with_timezone(&Utc)),
            reconciled_at: model.reconciled_at.map(|at| at.with_timezone(&Utc)),
            deposit_id: model.deposit_id.map(Into::into),
        }
    }
}

/// Resolves the configured account codes to account ids.
pub(crate) async fn posting_accounts<C>(
    conn: &C,
    codes: &SystemAccounts,
) -> Result<CollectionAccounts, LedgerStoreError>
where
    C: ConnectionTrait,
{
    let cash_in_hand = AccountRepository::find_by_code_in(conn, &codes.cash_in_hand).await?;
    let cash_in_transit = AccountRepository::find_by_code_in(conn, &codes.cash_in_transit).await?;
    let ar_agents = AccountRepository::find_by_code_in(conn, &codes.ar_agents).await?;
    let product_revenue = AccountRepository::find_by_code_in(conn, &codes.product_revenue).await?;

    Ok(CollectionAccounts {
        cash_in_hand: cash_in_hand.id.into(),
        cash_in_transit: cash_in_transit.id.into(),
        ar_agents: ar_agents.id.into(),
        product_revenue: product_revenue.id.into(),
    })
}

/// Keeps the first occurrence of each id.
pub(crate) fn dedup_ids<T: Copy + Eq + std::hash::Hash>(ids: &[T]) -> Vec<T> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Collection repository.
#[derive(Debug, Clone)]
pub struct CollectionRepository {
    db: DatabaseConnection,
    postings: Option<SystemAccounts>,
}

impl CollectionRepository {
    /// Creates a repository that changes statuses without posting GL entries.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db, postings: None }
    }

    /// Posts GL entries against these accounts: `Dr Cash in Transit / Cr Product Revenue`
    /// when a collection is recorded, `Dr AR-Agents / Cr Cash in Transit` on verification.
    #[must_use]
    pub fn with_postings(mut self, accounts: SystemAccounts) -> Self {
        self.postings = Some(accounts);
        self
    }

    /// Records a draft collection, posting the delivery entry in the same transaction
    /// when GL postings are enabled.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for non-positive amounts, `DuplicateOrder` if the order
    /// already has a collection, or the GL posting's error. Nothing changes on error.
    pub async fn record(&self, input: RecordCollectionInput) -> Result<Collection, CollectionStoreError> {
        CollectionLifecycle::ensure_positive(input.amount)?;

        let now = Utc::now();
        let model = agent_collections::ActiveModel {
            id: Set(CollectionId::new().into_inner()),
            order_id: Set(input.order_id.into_inner()),
            agent_id: Set(input.agent_id.into_inner()),
            amount: Set(input.amount),
            status: Set(sea_orm_active_enums::CollectionStatus::Draft),
            collection_date: Set(input.collection_date.into()),
            verified_at: Set(None),
            reconciled_at: Set(None),
            deposit_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let txn = self.db.begin().await?;
        let collection = match model.insert(&txn).await {
            Ok(model) => Collection::from(model),
            Err(err) => {
                txn.rollback().await?;
                if is_unique_violation(&err) {
                    return Err(LifecycleError::DuplicateOrder(input.order_id).into());
                }
                return Err(err.into());
            }
        };

        if let Some(codes) = &self.postings {
            let accounts = posting_accounts(&txn, codes).await?;
            let entry = accounts.collection_recorded(&collection, now.date_naive());
            let posted = JournalRepository::post_entry_in(&txn, &entry).await?;
            tracing::debug!(
                collection_id = %collection.id,
                entry_number = %posted.entry.entry_number,
                "Posted delivered order revenue"
            );
        }

        txn.commit().await?;

        tracing::info!(
            collection_id = %collection.id,
            agent_id = %collection.agent_id,
            amount = %collection.amount,
            "Collection recorded"
        );
        Ok(collection)
    }

    /// Gets a collection by ID.
    ///
    /// # Errors
    ///
    /// Returns `CollectionNotFound` if no such collection exists.
    pub async fn get(&self, id: CollectionId) -> Result<Collection, CollectionStoreError> {
        agent_collections::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(Collection::from)
            .ok_or_else(|| LifecycleError::CollectionNotFound(id).into())
    }

    /// Lists collections, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: CollectionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Collection>, CollectionStoreError> {
        let page = page.normalized();

        let mut query = agent_collections::Entity::find();
        if let Some(agent_id) = filter.agent_id {
            query = query.filter(agent_collections::Column::AgentId.eq(agent_id.into_inner()));
        }
        if let Some(status) = filter.status {
            query = query.filter(
                agent_collections::Column::Status.eq(sea_orm_active_enums::CollectionStatus::from(status)),
            );
        }
        if let Some(from) = filter.from {
            query = query.filter(agent_collections::Column::CollectionDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(agent_collections::Column::CollectionDate.lte(to));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(agent_collections::Column::CollectionDate)
            .order_by_asc(agent_collections::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(
            rows.into_iter().map(Collection::from).collect(),
            page,
            total,
        ))
    }

    /// Moves a collection from draft to verified.
    ///
    /// # Errors
    ///
    /// Returns `CollectionNotFound`, `CollectionTransition` if it is not a draft, or the
    /// GL posting's error. Nothing changes on error.
    pub async fn verify(&self, id: CollectionId, now: DateTime<Utc>) -> Result<Collection, CollectionStoreError> {
        let txn = self.db.begin().await?;

        let collection = Collection::from(Self::transition(&txn, id, CollectionStatus::Verified, now).await?);

        if let Some(codes) = &self.postings {
            let accounts = posting_accounts(&txn, codes).await?;
            let entry = accounts.collection_verified(&collection, now.date_naive());
            let posted = JournalRepository::post_entry_in(&txn, &entry).await?;
            tracing::debug!(
                collection_id = %id,
                entry_number = %posted.entry.entry_number,
                "Posted collection verification"
            );
        }

        txn.commit().await?;

        tracing::info!(collection_id = %id, agent_id = %collection.agent_id, "Collection verified");
        Ok(collection)
    }

    /// Verifies each collection independently.
    ///
    /// Duplicate ids are verified once. One failure does not affect the others.
    ///
    /// # Errors
    ///
    /// Returns `EmptyBatch` when `ids` is empty.
    pub async fn bulk_verify(
        &self,
        ids: &[CollectionId],
        now: DateTime<Utc>,
    ) -> Result<BulkOutcome<CollectionId>, CollectionStoreError> {
        CollectionLifecycle::ensure_batch_capacity(ids.len(), usize::MAX)?;

        let ids = dedup_ids(ids);
        let results = join_all(ids.iter().map(|id| self.verify(*id, now))).await;

        let outcome: BulkOutcome<CollectionId> = ids
            .into_iter()
            .zip(results.into_iter().map(|result| result.map_err(CollectionStoreError::into_lifecycle)))
            .collect();

        tracing::info!(
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Bulk collection verification finished"
        );
        Ok(outcome)
    }

    /// Moves a collection from verified to reconciled without naming a deposit.
    ///
    /// # Errors
    ///
    /// Returns `CollectionNotFound` or `CollectionTransition` if it is not verified.
    pub async fn reconcile(&self, id: CollectionId, now: DateTime<Utc>) -> Result<Collection, CollectionStoreError> {
        let txn = self.db.begin().await?;
        let collection = Collection::from(Self::transition(&txn, id, CollectionStatus::Reconciled, now).await?);
        txn.commit().await?;

        tracing::info!(collection_id = %id, agent_id = %collection.agent_id, "Collection reconciled");
        Ok(collection)
    }

    /// Check-and-set status update. Zero rows affected means not found or illegal.
    async fn transition(
        txn: &DatabaseTransaction,
        id: CollectionId,
        to: CollectionStatus,
        now: DateTime<Utc>,
    ) -> Result<agent_collections::Model, CollectionStoreError> {
        let Some(from) = CollectionLifecycle::collection_predecessor(to) else {
            return Err(Self::diagnose(txn, id, to).await);
        };

        let stamp = Set(Some(now.into()));
        let mut changes = agent_collections::ActiveModel {
            status: Set(to.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        match to {
            CollectionStatus::Verified => changes.verified_at = stamp,
            CollectionStatus::Reconciled => changes.reconciled_at = stamp,
            CollectionStatus::Draft => {}
        }

        let updated = agent_collections::Entity::update_many()
            .set(changes)
            .filter(agent_collections::Column::Id.eq(id.into_inner()))
            .filter(agent_collections::Column::Status.eq(sea_orm_active_enums::CollectionStatus::from(from)))
            .exec_with_returning(txn)
            .await?;

        match updated.into_iter().next() {
            Some(model) => Ok(model),
            None => Err(Self::diagnose(txn, id, to).await),
        }
    }

    async fn diagnose(txn: &DatabaseTransaction, id: CollectionId, to: CollectionStatus) -> CollectionStoreError {
        match agent_collections::Entity::find_by_id(id.into_inner()).one(txn).await {
            Ok(Some(current)) => LifecycleError::CollectionTransition {
                collection_id: id,
                from: current.status.into(),
                to,
            }
            .into(),
            Ok(None) => LifecycleError::CollectionNotFound(id).into(),
            Err(err) => err.into(),
        }
    }

    /// Outstanding (draft or verified) collections of one agent, locked for update.
    pub(crate) async fn lock_outstanding(
        txn: &DatabaseTransaction,
        agent_id: AgentId,
    ) -> Result<Vec<Collection>, CollectionStoreError> {
        let rows = agent_collections::Entity::find()
            .filter(agent_collections::Column::AgentId.eq(agent_id.into_inner()))
            .filter(agent_collections::Column::Status.ne(sea_orm_active_enums::CollectionStatus::Reconciled))
            .order_by_asc(agent_collections::Column::Id)
            .lock_exclusive()
            .all(txn)
            .await?;
        Ok(rows.into_iter().map(Collection::from).collect())
    }
}
