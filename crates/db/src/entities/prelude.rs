pub use super::accounts::Entity as Accounts;
pub use super::agent_blocks::Entity as AgentBlocks;
pub use super::agent_collections::Entity as AgentCollections;
pub use super::agent_deposits::Entity as AgentDeposits;
pub use super::journal_entries::Entity as JournalEntries;
pub use super::journal_entry_counters::Entity as JournalEntryCounters;
pub use super::ledger_transactions::Entity as LedgerTransactions;
