//! Per-item outcome reporting for bulk operations.

use serde::Serialize;

use super::error::LifecycleError;

/// Message reported for items that failed on an internal error.
pub const INTERNAL_FAILURE_MESSAGE: &str = "An internal error occurred";

/// One item that failed inside a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailure<Id> {
    /// The item.
    pub id: Id,
    /// Machine-readable reason.
    pub code: &'static str,
    /// Human-readable reason.
    pub error: String,
}

/// Result of a bulk operation: items are independent, so some may fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome<Id> {
    /// Items that transitioned.
    pub succeeded: Vec<Id>,
    /// Items that did not, with reasons.
    pub failed: Vec<BulkFailure<Id>>,
}

impl<Id> Default for BulkOutcome<Id> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<Id> BulkOutcome<Id> {
    /// Records one item's result. Internal failures keep their code but not their text.
    pub fn record<T>(&mut self, id: Id, result: Result<T, LifecycleError>) {
        match result {
            Ok(_) => self.succeeded.push(id),
            Err(err) => {
                let error = if err.http_status_code() >= 500 {
                    INTERNAL_FAILURE_MESSAGE.to_string()
                } else {
                    err.to_string()
                };
                self.failed.push(BulkFailure {
                    id,
                    code: err.error_code(),
                    error,
                });
            }
        }
    }

    /// Every item succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl<Id, T> FromIterator<(Id, Result<T, LifecycleError>)> for BulkOutcome<Id> {
    fn from_iter<I: IntoIterator<Item = (Id, Result<T, LifecycleError>)>>(iter: I) -> Self {
        let mut outcome = Self::default();
        for (id, result) in iter {
            outcome.record(id, result);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::CollectionStatus;
    use codledger_shared::types::CollectionId;

    #[test]
    fn partial_success_reports_each_failure() {
        let ok = CollectionId::new();
        let missing = CollectionId::new();
        let done = CollectionId::new();

        let outcome: BulkOutcome<CollectionId> = vec![
            (ok, Ok(())),
            (missing, Err(LifecycleError::CollectionNotFound(missing))),
            (
                done,
                Err(LifecycleError::CollectionTransition {
                    collection_id: done,
                    from: CollectionStatus::Reconciled,
                    to: CollectionStatus::Verified,
                }),
            ),
        ]
        .into_iter()
        .collect();

        assert_eq!(outcome.succeeded, vec![ok]);
        assert_eq!(outcome.failed.len(), 2);
        assert_eq!(outcome.failed[0].id, missing);
        assert_eq!(outcome.failed[0].code, "COLLECTION_NOT_FOUND");
        assert_eq!(outcome.failed[1].code, "INVALID_TRANSITION");
        assert!(!outcome.is_complete());
    }

    #[test]
    fn internal_failures_hide_their_details() {
        let id = CollectionId::new();
        let outcome: BulkOutcome<CollectionId> = vec![(
            id,
            Err::<(), _>(LifecycleError::Database(
                "relation \"agent_collections\" does not exist".to_string(),
            )),
        )]
        .into_iter()
        .collect();

        assert_eq!(outcome.failed[0].code, "DATABASE_ERROR");
        assert_eq!(outcome.failed[0].error, INTERNAL_FAILURE_MESSAGE);
    }
}
