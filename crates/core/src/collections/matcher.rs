//! Choosing which collections a verified deposit settles.
//!
//! How deposits map onto collections is business policy, so it sits behind a trait.
//! The shipped matcher only accepts an explicit selection and checks it.

use std::collections::HashSet;

use codledger_shared::types::CollectionId;

use super::error::LifecycleError;
use super::types::{Collection, CollectionStatus, Deposit, DepositStatus};

/// Decides which collections a deposit settles.
pub trait DepositMatcher: Send + Sync {
    /// Picks collections out of `candidates` (the agent's outstanding collections).
    ///
    /// # Errors
    ///
    /// Returns an error when the selection cannot be honored.
    fn select(
        &self,
        deposit: &Deposit,
        candidates: &[Collection],
    ) -> Result<Vec<CollectionId>, LifecycleError>;
}

/// Settles exactly the collections the caller names.
#[derive(Debug, Clone, Default)]
pub struct ExplicitSelection {
    ids: Vec<CollectionId>,
}

impl ExplicitSelection {
    /// Creates a matcher for `ids`; duplicates are ignored.
    #[must_use]
    pub fn new(ids: impl IntoIterator<Item = CollectionId>) -> Self {
        let mut seen = HashSet::new();
        Self {
            ids: ids.into_iter().filter(|id| seen.insert(*id)).collect(),
        }
    }
}

impl DepositMatcher for ExplicitSelection {
    fn select(
        &self,
        deposit: &Deposit,
        candidates: &[Collection],
    ) -> Result<Vec<CollectionId>, LifecycleError> {
        if deposit.status != DepositStatus::Verified {
            return Err(LifecycleError::DepositNotVerified {
                deposit_id: deposit.id,
                status: deposit.status,
            });
        }
        if self.ids.is_empty() {
            return Err(LifecycleError::EmptyBatch);
        }

        for id in &self.ids {
            let Some(collection) = candidates.iter().find(|c| c.id == *id) else {
                return Err(LifecycleError::UnmatchedCollection {
                    collection_id: *id,
                    reason: format!("not an outstanding collection of agent {}", deposit.agent_id),
                });
            };
            if collection.agent_id != deposit.agent_id {
                return Err(LifecycleError::UnmatchedCollection {
                    collection_id: *id,
                    reason: format!("belongs to agent {}", collection.agent_id),
                });
            }
            if collection.status != CollectionStatus::Verified {
                return Err(LifecycleError::UnmatchedCollection {
                    collection_id: *id,
                    reason: format!("is {}, only verified collections can be reconciled", collection.status),
                });
            }
        }

        Ok(self.ids.clone())
    }
}
