//! GL entries that accompany collection and deposit verification.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use codledger_shared::types::AccountId;

use super::types::{Collection, Deposit};
use crate::ledger::{JournalLineInput, PostEntryInput, SourceType};

/// Accounts the collection flow posts against, resolved to IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionAccounts {
    /// Cash held by the business.
    pub cash_in_hand: AccountId,
    /// Cash collected but not yet verified.
    pub cash_in_transit: AccountId,
    /// Receivable from agents.
    pub ar_agents: AccountId,
    /// Revenue recognized when an order is delivered and paid in cash.
    pub product_revenue: AccountId,
}

impl CollectionAccounts {
    /// Delivered order paid in cash: the agent holds the money, the sale is earned.
    /// Dr Cash in Transit / Cr Product Revenue, dated the day the collection is recorded.
    #[must_use]
    pub fn collection_recorded(&self, collection: &Collection, entry_date: NaiveDate) -> PostEntryInput {
        Self::pair(
            entry_date,
            format!("Cash collected for delivered order {}", collection.order_id),
            SourceType::OrderSettlement,
            collection.id.into_inner(),
            self.cash_in_transit,
            self.product_revenue,
            collection.amount,
        )
    }

    /// Verified collection: the agent now owes the cash.
    /// Dr AR-Agents / Cr Cash in Transit, dated the day of verification.
    #[must_use]
    pub fn collection_verified(&self, collection: &Collection, entry_date: NaiveDate) -> PostEntryInput {
        Self::pair(
            entry_date,
            format!("Collection verified for order {}", collection.order_id),
            SourceType::AgentCollection,
            collection.id.into_inner(),
            self.ar_agents,
            self.cash_in_transit,
            collection.amount,
        )
    }

    /// Verified deposit: the cash is in hand and the agent's debt shrinks.
    /// Dr Cash in Hand / Cr AR-Agents, dated the day of verification.
    #[must_use]
    pub fn deposit_verified(&self, deposit: &Deposit, entry_date: NaiveDate) -> PostEntryInput {
        Self::pair(
            entry_date,
            format!("Agent deposit {} verified", deposit.reference_number),
            SourceType::Deposit,
            deposit.id.into_inner(),
            self.cash_in_hand,
            self.ar_agents,
            deposit.amount,
        )
    }

    fn pair(
        entry_date: NaiveDate,
        description: String,
        source_type: SourceType,
        source_id: uuid::Uuid,
        debit: AccountId,
        credit: AccountId,
        amount: Decimal,
    ) -> PostEntryInput {
        PostEntryInput {
            entry_date,
            description,
            source_type,
            source_id: Some(source_id),
            lines: vec![
                JournalLineInput::debit(debit, amount),
                JournalLineInput::credit(credit, amount),
            ],
        }
    }
}
