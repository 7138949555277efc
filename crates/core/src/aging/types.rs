//! Aging report types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use codledger_shared::types::AgentId;

/// Age band of an outstanding collection, by whole days since collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBucket {
    /// 0-1 days (also future-dated collections).
    #[serde(rename = "0-1")]
    ZeroToOne,
    /// 2-3 days.
    #[serde(rename = "2-3")]
    TwoToThree,
    /// 4-7 days; overdue.
    #[serde(rename = "4-7")]
    FourToSeven,
    /// 8 days or more; critically overdue.
    #[serde(rename = "8+")]
    EightPlus,
}

impl AgeBucket {
    /// Bucket for a collection `days` old.
    #[must_use]
    pub const fn for_days(days: i64) -> Self {
        if days <= 1 {
            Self::ZeroToOne
        } else if days <= 3 {
            Self::TwoToThree
        } else if days <= 7 {
            Self::FourToSeven
        } else {
            Self::EightPlus
        }
    }

    /// The bucket counts as overdue.
    #[must_use]
    pub const fn is_overdue(self) -> bool {
        matches!(self, Self::FourToSeven | Self::EightPlus)
    }
}

/// Whole days elapsed between `collected` and `now`, floored.
#[must_use]
pub fn days_since(now: DateTime<Utc>, collected: DateTime<Utc>) -> i64 {
    const DAY_MS: i64 = 86_400_000;
    (now - collected).num_milliseconds().div_euclid(DAY_MS)
}

/// A collection that is not yet reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutstandingCollection {
    /// Agent holding the cash.
    pub agent_id: AgentId,
    /// Amount held.
    pub amount: Decimal,
    /// When it was collected.
    pub collection_date: DateTime<Utc>,
}

/// One agent's outstanding balance split by age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAging {
    /// The agent.
    pub agent_id: AgentId,
    /// Sum of all buckets.
    pub total_balance: Decimal,
    /// 0-1 days.
    #[serde(rename = "bucket_0_1")]
    pub bucket_0_1: Decimal,
    /// 2-3 days.
    #[serde(rename = "bucket_2_3")]
    pub bucket_2_3: Decimal,
    /// 4-7 days.
    #[serde(rename = "bucket_4_7")]
    pub bucket_4_7: Decimal,
    /// 8+ days.
    #[serde(rename = "bucket_8_plus")]
    pub bucket_8_plus: Decimal,
    /// Oldest outstanding collection.
    pub oldest_collection_date: DateTime<Utc>,
    /// Number of outstanding collections.
    pub collection_count: u32,
    /// Agent is blocked from new deliveries.
    pub is_blocked: bool,
}

impl AgentAging {
    pub(crate) fn empty(agent_id: AgentId, first_seen: DateTime<Utc>) -> Self {
        Self {
            agent_id,
            total_balance: Decimal::ZERO,
            bucket_0_1: Decimal::ZERO,
            bucket_2_3: Decimal::ZERO,
            bucket_4_7: Decimal::ZERO,
            bucket_8_plus: Decimal::ZERO,
            oldest_collection_date: first_seen,
            collection_count: 0,
            is_blocked: false,
        }
    }

    pub(crate) fn add(&mut self, bucket: AgeBucket, amount: Decimal, collected: DateTime<Utc>) {
        *self.bucket_mut(bucket) += amount;
        self.total_balance += amount;
        self.collection_count += 1;
        if collected < self.oldest_collection_date {
            self.oldest_collection_date = collected;
        }
    }

    fn bucket_mut(&mut self, bucket: AgeBucket) -> &mut Decimal {
        match bucket {
            AgeBucket::ZeroToOne => &mut self.bucket_0_1,
            AgeBucket::TwoToThree => &mut self.bucket_2_3,
            AgeBucket::FourToSeven => &mut self.bucket_4_7,
            AgeBucket::EightPlus => &mut self.bucket_8_plus,
        }
    }

    /// Amount in `bucket`.
    #[must_use]
    pub fn amount_in(&self, bucket: AgeBucket) -> Decimal {
        match bucket {
            AgeBucket::ZeroToOne => self.bucket_0_1,
            AgeBucket::TwoToThree => self.bucket_2_3,
            AgeBucket::FourToSeven => self.bucket_4_7,
            AgeBucket::EightPlus => self.bucket_8_plus,
        }
    }

    /// Holds any cash aged four days or more.
    #[must_use]
    pub fn is_overdue(&self) -> bool {
        self.bucket_4_7 > Decimal::ZERO || self.bucket_8_plus > Decimal::ZERO
    }

    /// Overdue and not yet blocked.
    #[must_use]
    pub fn needs_block(&self) -> bool {
        self.is_overdue() && !self.is_blocked
    }
}

/// Totals across all agents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingSummary {
    /// Agents with any outstanding collection.
    pub total_agents_with_balance: u32,
    /// Sum of all outstanding collections.
    pub total_outstanding_amount: Decimal,
    /// Agents holding cash in 4-7 or 8+.
    pub overdue_agents_count: u32,
    /// Sum of 8+ buckets.
    pub critical_overdue_amount: Decimal,
    /// Sum of 4-7 buckets.
    pub warning_overdue_amount: Decimal,
    /// Agents currently blocked.
    pub blocked_agents_count: u32,
}

/// Aging snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingReport {
    /// The instant ages were measured from.
    pub generated_at: DateTime<Utc>,
    /// Totals.
    pub summary: AgingSummary,
    /// Per-agent rows, most critical first.
    pub buckets: Vec<AgentAging>,
}
