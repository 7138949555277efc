//! Deposit repository: agent deposits, their review and reconciliation.

use chrono::{DateTime, Utc};
use codledger_core::collections::{
    BulkOutcome, Collection, CollectionLifecycle, Deposit, DepositMatcher, DepositStatus,
    LifecycleError,
};
use codledger_shared::config::SystemAccounts;
use codledger_shared::types::{AgentId, DepositId, PageRequest, PageResponse};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::collection::{dedup_ids, posting_accounts, CollectionRepository};
use super::error::{is_unique_violation, CollectionStoreError};
use super::journal::JournalRepository;
use crate::entities::{agent_collections, agent_deposits, sea_orm_active_enums};

/// Input for submitting a deposit.
#[derive(Debug, Clone)]
pub struct CreateDepositInput {
    /// Depositing agent.
    pub agent_id: AgentId,
    /// Amount deposited.
    pub amount: Decimal,
    /// How the money was handed over, e.g. `bank_transfer`.
    pub deposit_method: String,
    /// Bank or receipt reference. Unique across deposits.
    pub reference_number: String,
    /// Defaults to now.
    pub deposit_date: Option<DateTime<Utc>>,
    /// Free text.
    pub notes: Option<String>,
}

/// Filter options for listing deposits.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepositFilter {
    /// Only this agent's deposits.
    pub agent_id: Option<AgentId>,
    /// Only deposits in this status.
    pub status: Option<DepositStatus>,
}

/// A deposit and the collections it settled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositReconciliation {
    /// The verified deposit.
    pub deposit: Deposit,
    /// Collections moved to reconciled.
    pub reconciled: Vec<Collection>,
}

impl From<agent_deposits::Model> for Deposit {
    fn from(model: agent_deposits::Model) -> Self {
        Self {
            id: model.id.into(),
            agent_id: model.agent_id.into(),
            amount: model.amount,
            deposit_method: model.deposit_method,
            reference_number: model.reference_number,
            status: model.status.into(),
            deposit_date: model.deposit_date.with_timezone(&Utc),
            notes: model.notes,
            reviewed_at: model.reviewed_at.map(|at| at.with_timezone(&Utc)),
        }
    }
}

/// Deposit repository.
#[derive(Debug, Clone)]
pub struct DepositRepository {
    db: DatabaseConnection,
    postings: Option<SystemAccounts>,
}

impl DepositRepository {
    /// Creates a repository that changes statuses without posting GL entries.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db, postings: None }
    }

    /// Posts `Dr Cash in Hand / Cr AR-Agents` against these accounts on verification.
    #[must_use]
    pub fn with_postings(mut self, accounts: SystemAccounts) -> Self {
        self.postings = Some(accounts);
        self
    }

    /// Submits a pending deposit.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount`, `MissingField` or `DuplicateReference`.
    pub async fn create(&self, input: CreateDepositInput) -> Result<Deposit, CollectionStoreError> {
        CollectionLifecycle::ensure_positive(input.amount)?;
        if input.deposit_method.trim().is_empty() {
            return Err(LifecycleError::MissingField("depositMethod").into());
        }
        if input.reference_number.trim().is_empty() {
            return Err(LifecycleError::MissingField("referenceNumber").into());
        }

        let exists = agent_deposits::Entity::find()
            .filter(agent_deposits::Column::ReferenceNumber.eq(&input.reference_number))
            .count(&self.db)
            .await?;
        if exists > 0 {
            return Err(LifecycleError::DuplicateReference(input.reference_number).into());
        }

        let now = Utc::now();
        let model = agent_deposits::ActiveModel {
            id: Set(DepositId::new().into_inner()),
            agent_id: Set(input.agent_id.into_inner()),
            amount: Set(input.amount),
            deposit_method: Set(input.deposit_method),
            reference_number: Set(input.reference_number.clone()),
            status: Set(sea_orm_active_enums::DepositStatus::Pending),
            deposit_date: Set(input.deposit_date.unwrap_or(now).into()),
            notes: Set(input.notes),
            reviewed_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        match model.insert(&self.db).await {
            Ok(model) => {
                tracing::info!(
                    deposit_id = %model.id,
                    agent_id = %model.agent_id,
                    amount = %model.amount,
                    "Deposit submitted"
                );
                Ok(model.into())
            }
            Err(err) if is_unique_violation(&err) => {
                Err(LifecycleError::DuplicateReference(input.reference_number).into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Gets a deposit by ID.
    ///
    /// # Errors
    ///
    /// Returns `DepositNotFound` if no such deposit exists.
    pub async fn get(&self, id: DepositId) -> Result<Deposit, CollectionStoreError> {
        agent_deposits::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(Deposit::from)
            .ok_or_else(|| LifecycleError::DepositNotFound(id).into())
    }

    /// Lists deposits, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: DepositFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Deposit>, CollectionStoreError> {
        let page = page.normalized();

        let mut query = agent_deposits::Entity::find();
        if let Some(agent_id) = filter.agent_id {
            query = query.filter(agent_deposits::Column::AgentId.eq(agent_id.into_inner()));
        }
        if let Some(status) = filter.status {
            query = query.filter(
                agent_deposits::Column::Status.eq(sea_orm_active_enums::DepositStatus::from(status)),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(agent_deposits::Column::DepositDate)
            .order_by_asc(agent_deposits::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows.into_iter().map(Deposit::from).collect(), page, total))
    }

    /// Moves a deposit from pending to verified.
    ///
    /// # Errors
    ///
    /// Returns `DepositNotFound`, `DepositTransition` if it is not pending, or the GL
    /// posting's error. Nothing changes on error.
    pub async fn verify(&self, id: DepositId, now: DateTime<Utc>) -> Result<Deposit, CollectionStoreError> {
        let txn = self.db.begin().await?;

        let deposit = Deposit::from(Self::transition(&txn, id, DepositStatus::Verified, None, now).await?);

        if let Some(codes) = &self.postings {
            let accounts = posting_accounts(&txn, codes).await?;
            let entry = accounts.deposit_verified(&deposit, now.date_naive());
            let posted = JournalRepository::post_entry_in(&txn, &entry).await?;
            tracing::debug!(
                deposit_id = %id,
                entry_number = %posted.entry.entry_number,
                "Posted deposit verification"
            );
        }

        txn.commit().await?;

        tracing::info!(deposit_id = %id, agent_id = %deposit.agent_id, "Deposit verified");
        Ok(deposit)
    }

    /// Moves a deposit from pending to rejected, optionally replacing its notes.
    ///
    /// # Errors
    ///
    /// Returns `DepositNotFound` or `DepositTransition` if it is not pending.
    pub async fn reject(
        &self,
        id: DepositId,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Deposit, CollectionStoreError> {
        let txn = self.db.begin().await?;
        let deposit = Deposit::from(Self::transition(&txn, id, DepositStatus::Rejected, notes, now).await?);
        txn.commit().await?;

        tracing::info!(deposit_id = %id, agent_id = %deposit.agent_id, "Deposit rejected");
        Ok(deposit)
    }

    /// Verifies each deposit independently.
    ///
    /// The whole batch is refused before anything changes when it holds more than
    /// `max_batch` ids, or more than `MAX_DEPOSIT_BATCH` whatever `max_batch` says.
    /// Duplicate ids are verified once.
    ///
    /// # Errors
    ///
    /// Returns `BatchTooLarge` or `EmptyBatch`.
    pub async fn bulk_verify(
        &self,
        ids: &[DepositId],
        max_batch: usize,
        now: DateTime<Utc>,
    ) -> Result<BulkOutcome<DepositId>, CollectionStoreError> {
        let max_batch = CollectionLifecycle::deposit_batch_limit(max_batch);
        if let Err(err) = CollectionLifecycle::ensure_batch_capacity(ids.len(), max_batch) {
            tracing::warn!(size = ids.len(), max_batch, "Bulk deposit verification refused");
            return Err(err.into());
        }

        let ids = dedup_ids(ids);
        let results = join_all(ids.iter().map(|id| self.verify(*id, now))).await;

        let outcome: BulkOutcome<DepositId> = ids
            .into_iter()
            .zip(results.into_iter().map(|result| result.map_err(CollectionStoreError::into_lifecycle)))
            .collect();

        tracing::info!(
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Bulk deposit verification finished"
        );
        Ok(outcome)
    }

    /// Settles collections with a verified deposit.
    ///
    /// The deposit and the agent's outstanding collections are locked, `matcher` picks
    /// which collections the deposit covers, and those move to reconciled pointing at the
    /// deposit. All or nothing.
    ///
    /// # Errors
    ///
    /// Returns `DepositNotFound`, or whatever the matcher rejects the selection with.
    pub async fn reconcile(
        &self,
        id: DepositId,
        matcher: &dyn DepositMatcher,
        now: DateTime<Utc>,
    ) -> Result<DepositReconciliation, CollectionStoreError> {
        let txn = self.db.begin().await?;

        let deposit = agent_deposits::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await?
            .map(Deposit::from)
            .ok_or(LifecycleError::DepositNotFound(id))?;

        let candidates = CollectionRepository::lock_outstanding(&txn, deposit.agent_id).await?;
        let selected = matcher.select(&deposit, &candidates)?;
        let selected_ids: Vec<Uuid> = selected.iter().map(|c| c.into_inner()).collect();

        let updated = agent_collections::Entity::update_many()
            .set(agent_collections::ActiveModel {
                status: Set(sea_orm_active_enums::CollectionStatus::Reconciled),
                reconciled_at: Set(Some(now.into())),
                deposit_id: Set(Some(id.into_inner())),
                updated_at: Set(now.into()),
                ..Default::default()
            })
            .filter(agent_collections::Column::Id.is_in(selected_ids))
            .filter(agent_collections::Column::Status.eq(sea_orm_active_enums::CollectionStatus::Verified))
            .exec_with_returning(&txn)
            .await?;

        if updated.len() != selected.len() {
            let missing = selected
                .iter()
                .copied()
                .find(|wanted| !updated.iter().any(|row| row.id == wanted.into_inner()));
            if let Some(collection_id) = missing {
                return Err(LifecycleError::UnmatchedCollection {
                    collection_id,
                    reason: "is no longer verified".to_string(),
                }
                .into());
            }
        }

        txn.commit().await?;

        let reconciled: Vec<Collection> = updated.into_iter().map(Collection::from).collect();
        tracing::info!(
            deposit_id = %id,
            agent_id = %deposit.agent_id,
            collections = reconciled.len(),
            "Deposit reconciled"
        );
        Ok(DepositReconciliation { deposit, reconciled })
    }

    async fn transition(
        txn: &DatabaseTransaction,
        id: DepositId,
        to: DepositStatus,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<agent_deposits::Model, CollectionStoreError> {
        let mut changes = agent_deposits::ActiveModel {
            status: Set(to.into()),
            reviewed_at: Set(Some(now.into())),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        if let Some(notes) = notes {
            changes.notes = Set(Some(notes));
        }

        let updated = agent_deposits::Entity::update_many()
            .set(changes)
            .filter(agent_deposits::Column::Id.eq(id.into_inner()))
            .filter(agent_deposits::Column::Status.eq(sea_orm_active_enums::DepositStatus::Pending))
            .exec_with_returning(txn)
            .await?;

        if let Some(model) = updated.into_iter().next() {
            return Ok(model);
        }

        let current = agent_deposits::Entity::find_by_id(id.into_inner())
            .one(txn)
            .await?
            .ok_or(LifecycleError::DepositNotFound(id))?;
        Err(LifecycleError::DepositTransition {
            deposit_id: id,
            from: current.status.into(),
            to,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_model_maps_to_domain() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 17, 0, 0).unwrap();
        let row = agent_deposits::Model {
            id: Uuid::now_v7(),
            agent_id: Uuid::now_v7(),
            amount: dec!(900),
            deposit_method: "bank_transfer".to_string(),
            reference_number: "TRX-0042".to_string(),
            status: sea_orm_active_enums::DepositStatus::Rejected,
            deposit_date: at.into(),
            notes: Some("amount mismatch".to_string()),
            reviewed_at: Some(at.into()),
            created_at: at.into(),
            updated_at: at.into(),
        };

        let deposit = Deposit::from(row);

        assert_eq!(deposit.status, DepositStatus::Rejected);
        assert!(deposit.status.is_terminal());
        assert_eq!(deposit.reviewed_at, Some(at));
        assert_eq!(deposit.reference_number, "TRX-0042");
    }
}
