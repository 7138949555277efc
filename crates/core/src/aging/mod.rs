//! Agent aging: how long agents have held collected cash.
//!
//! Buckets are by whole days since collection: 0-1, 2-3, 4-7 and 8+.

pub mod classifier;
pub mod types;

#[cfg(test)]
mod props;

pub use classifier::AgingClassifier;
pub use types::{
    days_since, AgeBucket, AgentAging, AgingReport, AgingSummary, OutstandingCollection,
};
