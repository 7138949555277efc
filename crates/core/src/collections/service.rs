//! Status transition rules for collections and deposits.

use rust_decimal::Decimal;
use codledger_shared::types::{CollectionId, DepositId};

use super::error::LifecycleError;
use super::types::{CollectionStatus, DepositStatus};

/// Hard cap on ids accepted by one bulk deposit verification.
pub const MAX_DEPOSIT_BATCH: usize = 50;

/// Pure transition rules. Storage applies them as check-and-set updates.
pub struct CollectionLifecycle;

impl CollectionLifecycle {
    /// draft → verified.
    ///
    /// # Errors
    ///
    /// Returns `CollectionTransition` from any other status.
    pub fn verify(
        collection_id: CollectionId,
        current: CollectionStatus,
    ) -> Result<CollectionStatus, LifecycleError> {
        Self::collection_step(collection_id, current, CollectionStatus::Verified)
    }

    /// verified → reconciled.
    ///
    /// # Errors
    ///
    /// Returns `CollectionTransition` from any other status.
    pub fn reconcile(
        collection_id: CollectionId,
        current: CollectionStatus,
    ) -> Result<CollectionStatus, LifecycleError> {
        Self::collection_step(collection_id, current, CollectionStatus::Reconciled)
    }

    /// pending → verified.
    ///
    /// # Errors
    ///
    /// Returns `DepositTransition` unless the deposit is pending.
    pub fn verify_deposit(
        deposit_id: DepositId,
        current: DepositStatus,
    ) -> Result<DepositStatus, LifecycleError> {
        Self::deposit_step(deposit_id, current, DepositStatus::Verified)
    }

    /// pending → rejected.
    ///
    /// # Errors
    ///
    /// Returns `DepositTransition` unless the deposit is pending.
    pub fn reject_deposit(
        deposit_id: DepositId,
        current: DepositStatus,
    ) -> Result<DepositStatus, LifecycleError> {
        Self::deposit_step(deposit_id, current, DepositStatus::Rejected)
    }

    /// The status a collection must be in for `to` to be reachable in one step.
    #[must_use]
    pub const fn collection_predecessor(to: CollectionStatus) -> Option<CollectionStatus> {
        match to {
            CollectionStatus::Draft => None,
            CollectionStatus::Verified => Some(CollectionStatus::Draft),
            CollectionStatus::Reconciled => Some(CollectionStatus::Verified),
        }
    }

    /// Whether `from → to` is a legal collection transition.
    #[must_use]
    pub fn is_valid_collection_transition(from: CollectionStatus, to: CollectionStatus) -> bool {
        Self::collection_predecessor(to) == Some(from)
    }

    /// Whether `from → to` is a legal deposit transition.
    #[must_use]
    pub const fn is_valid_deposit_transition(from: DepositStatus, to: DepositStatus) -> bool {
        matches!(
            (from, to),
            (
                DepositStatus::Pending,
                DepositStatus::Verified | DepositStatus::Rejected
            )
        )
    }

    /// Rejects a whole batch before any item is touched.
    ///
    /// # Errors
    ///
    /// `EmptyBatch` for zero ids, `BatchTooLarge` above `max`.
    pub fn ensure_batch_capacity(size: usize, max: usize) -> Result<(), LifecycleError> {
        if size == 0 {
            return Err(LifecycleError::EmptyBatch);
        }
        if size > max {
            return Err(LifecycleError::BatchTooLarge { size, max });
        }
        Ok(())
    }

    /// Effective bulk deposit cap: a configured value can lower the cap, never raise it
    /// above `MAX_DEPOSIT_BATCH`.
    #[must_use]
    pub fn deposit_batch_limit(configured: usize) -> usize {
        configured.clamp(1, MAX_DEPOSIT_BATCH)
    }

    /// Amounts must be strictly positive.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount`.
    pub fn ensure_positive(amount: Decimal) -> Result<(), LifecycleError> {
        if amount <= Decimal::ZERO {
            return Err(LifecycleError::InvalidAmount(amount));
        }
        Ok(())
    }

    fn collection_step(
        collection_id: CollectionId,
        from: CollectionStatus,
        to: CollectionStatus,
    ) -> Result<CollectionStatus, LifecycleError> {
        if Self::is_valid_collection_transition(from, to) {
            Ok(to)
        } else {
            Err(LifecycleError::CollectionTransition {
                collection_id,
                from,
                to,
            })
        }
    }

    fn deposit_step(
        deposit_id: DepositId,
        from: DepositStatus,
        to: DepositStatus,
    ) -> Result<DepositStatus, LifecycleError> {
        if Self::is_valid_deposit_transition(from, to) {
            Ok(to)
        } else {
            Err(LifecycleError::DepositTransition {
                deposit_id,
                from,
                to,
            })
        }
    }
}
