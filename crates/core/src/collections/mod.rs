//! Agent cash collection lifecycle.
//!
//! Collections move draft → verified → reconciled; deposits move pending → verified or
//! pending → rejected. Transitions never go backwards.

pub mod bulk;
pub mod error;
pub mod matcher;
pub mod postings;
pub mod service;
pub mod types;

pub use bulk::{BulkFailure, BulkOutcome, INTERNAL_FAILURE_MESSAGE};
pub use error::LifecycleError;
pub use matcher::{DepositMatcher, ExplicitSelection};
pub use postings::CollectionAccounts;
pub use service::{CollectionLifecycle, MAX_DEPOSIT_BATCH};
pub use types::{Collection, CollectionEvent, CollectionStatus, Deposit, DepositStatus};
