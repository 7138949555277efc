//! Collection and deposit domain types.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use codledger_shared::types::{AgentId, CollectionId, DepositId, OrderId};

/// Lifecycle of cash an agent collected for an order.
///
/// Transitions only move forward: draft → verified → reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    /// Recorded by the agent, not yet checked.
    Draft,
    /// Checked by an accountant; the agent owes this cash.
    Verified,
    /// Settled by a verified deposit.
    Reconciled,
}

impl CollectionStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Verified => "verified",
            Self::Reconciled => "reconciled",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "verified" => Some(Self::Verified),
            "reconciled" => Some(Self::Reconciled),
            _ => None,
        }
    }

    /// Still counts toward the agent's cash holdings.
    #[must_use]
    pub const fn is_outstanding(self) -> bool {
        !matches!(self, Self::Reconciled)
    }
}

impl fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of an agent deposit. `Verified` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    /// Submitted, awaiting review.
    Pending,
    /// Confirmed received.
    Verified,
    /// Refused.
    Rejected,
}

impl DepositStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "verified" => Some(Self::Verified),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// No further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Rejected)
    }
}

impl fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cash collected by an agent on delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Collection ID.
    pub id: CollectionId,
    /// Order settled by this cash (one collection per order).
    pub order_id: OrderId,
    /// Agent holding the cash.
    pub agent_id: AgentId,
    /// Amount collected, positive.
    pub amount: Decimal,
    /// Lifecycle status.
    pub status: CollectionStatus,
    /// When the cash was collected.
    pub collection_date: DateTime<Utc>,
    /// When the collection was verified.
    pub verified_at: Option<DateTime<Utc>>,
    /// When the collection was reconciled.
    pub reconciled_at: Option<DateTime<Utc>>,
    /// Deposit that settled the collection.
    pub deposit_id: Option<DepositId>,
}

/// Cash an agent handed back to the business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    /// Deposit ID.
    pub id: DepositId,
    /// Depositing agent.
    pub agent_id: AgentId,
    /// Amount deposited, positive.
    pub amount: Decimal,
    /// How the money was handed over (bank_transfer, cash, mobile_money, ...).
    pub deposit_method: String,
    /// External reference, unique across deposits.
    pub reference_number: String,
    /// Lifecycle status.
    pub status: DepositStatus,
    /// When the deposit was made.
    pub deposit_date: DateTime<Utc>,
    /// Reviewer or agent notes.
    pub notes: Option<String>,
    /// When the deposit was verified or rejected.
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Something that changed an agent's outstanding cash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CollectionEvent {
    /// A collection moved to verified.
    CollectionVerified {
        /// The collection.
        collection_id: CollectionId,
        /// Its agent.
        agent_id: AgentId,
    },
    /// A collection moved to reconciled.
    CollectionReconciled {
        /// The collection.
        collection_id: CollectionId,
        /// Its agent.
        agent_id: AgentId,
    },
    /// A deposit moved to verified.
    DepositVerified {
        /// The deposit.
        deposit_id: DepositId,
        /// Its agent.
        agent_id: AgentId,
    },
}

impl CollectionEvent {
    /// Agent whose aging must be recomputed.
    #[must_use]
    pub const fn agent_id(&self) -> AgentId {
        match self {
            Self::CollectionVerified { agent_id, .. }
            | Self::CollectionReconciled { agent_id, .. }
            | Self::DepositVerified { agent_id, .. } => *agent_id,
        }
    }
}
