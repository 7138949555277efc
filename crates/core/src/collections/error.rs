//! Collection and deposit lifecycle errors.

use rust_decimal::Decimal;
use thiserror::Error;
use codledger_shared::types::{CollectionId, DepositId, OrderId};

use super::types::{CollectionStatus, DepositStatus};
use crate::ledger::LedgerError;

/// Errors that can occur during collection and deposit operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Collection is not in a status the action starts from.
    #[error("Collection {collection_id} cannot move from {from} to {to}")]
    CollectionTransition {
        /// The collection.
        collection_id: CollectionId,
        /// Current status.
        from: CollectionStatus,
        /// Requested status.
        to: CollectionStatus,
    },

    /// Deposit is not in a status the action starts from.
    #[error("Deposit {deposit_id} cannot move from {from} to {to}")]
    DepositTransition {
        /// The deposit.
        deposit_id: DepositId,
        /// Current status.
        from: DepositStatus,
        /// Requested status.
        to: DepositStatus,
    },

    /// Batch exceeds the cap; nothing was processed.
    #[error("Batch of {size} exceeds the maximum of {max}")]
    BatchTooLarge {
        /// Ids submitted.
        size: usize,
        /// Largest batch accepted.
        max: usize,
    },

    /// Batch has no ids.
    #[error("Batch must contain at least one id")]
    EmptyBatch,

    /// Collection not found.
    #[error("Collection not found: {0}")]
    CollectionNotFound(CollectionId),

    /// Deposit not found.
    #[error("Deposit not found: {0}")]
    DepositNotFound(DepositId),

    /// Order already has a collection.
    #[error("Order {0} already has a collection")]
    DuplicateOrder(OrderId),

    /// Deposit reference already used.
    #[error("A deposit with reference number '{0}' already exists")]
    DuplicateReference(String),

    /// Amount must be strictly positive.
    #[error("Amount must be greater than zero, got {0}")]
    InvalidAmount(Decimal),

    /// A required field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Only verified deposits settle collections.
    #[error("Deposit {deposit_id} is {status}; only verified deposits can be reconciled")]
    DepositNotVerified {
        /// The deposit.
        deposit_id: DepositId,
        /// Its status.
        status: DepositStatus,
    },

    /// A collection selected for reconciliation cannot be settled by the deposit.
    #[error("Collection {collection_id} cannot be matched: {reason}")]
    UnmatchedCollection {
        /// The collection.
        collection_id: CollectionId,
        /// Why it was refused.
        reason: String,
    },

    /// The accompanying GL posting failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LifecycleError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CollectionTransition { .. } | Self::DepositTransition { .. } => {
                "INVALID_TRANSITION"
            }
            Self::BatchTooLarge { .. } => "BATCH_TOO_LARGE",
            Self::EmptyBatch => "EMPTY_BATCH",
            Self::CollectionNotFound(_) => "COLLECTION_NOT_FOUND",
            Self::DepositNotFound(_) => "DEPOSIT_NOT_FOUND",
            Self::DuplicateOrder(_) => "DUPLICATE_ORDER",
            Self::DuplicateReference(_) => "DUPLICATE_REFERENCE",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::DepositNotVerified { .. } => "DEPOSIT_NOT_VERIFIED",
            Self::UnmatchedCollection { .. } => "UNMATCHED_COLLECTION",
            Self::Ledger(inner) => inner.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::BatchTooLarge { .. }
            | Self::EmptyBatch
            | Self::InvalidAmount(_)
            | Self::MissingField(_)
            | Self::UnmatchedCollection { .. } => 400,
            Self::CollectionNotFound(_) | Self::DepositNotFound(_) => 404,
            Self::CollectionTransition { .. }
            | Self::DepositTransition { .. }
            | Self::DuplicateOrder(_)
            | Self::DuplicateReference(_)
            | Self::DepositNotVerified { .. } => 409,
            Self::Ledger(inner) => inner.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}
