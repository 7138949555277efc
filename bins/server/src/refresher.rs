//! Recomputes agent aging after collection and deposit status changes.
//!
//! Runs outside the request path: handlers publish events after commit, this task
//! re-reads the affected agent's outstanding cash and, when `auto_block` is on, blocks
//! agents holding cash aged four days or more.

use chrono::Utc;
use codledger_core::collections::CollectionEvent;
use codledger_db::AgingRepository;
use sea_orm::DatabaseConnection;
use tokio::sync::broadcast::{Receiver, error::RecvError};
use tracing::{debug, info, warn};

pub struct Refresher {
    aging: AgingRepository,
    auto_block: bool,
}

impl Refresher {
    pub fn new(db: DatabaseConnection, auto_block: bool) -> Self {
        Self {
            aging: AgingRepository::new(db),
            auto_block,
        }
    }

    pub async fn run(self, mut events: Receiver<CollectionEvent>) {
        info!(auto_block = self.auto_block, "Aging refresher started");

        loop {
            match events.recv().await {
                Ok(event) => self.refresh_agent(&event).await,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Aging refresher fell behind, recomputing all agents");
                    self.refresh_all().await;
                }
                Err(RecvError::Closed) => break,
            }
        }

        info!("Aging refresher stopped");
    }

    async fn refresh_agent(&self, event: &CollectionEvent) {
        let agent_id = event.agent_id();

        if self.auto_block {
            match self.aging.block_if_overdue(agent_id, Utc::now()).await {
                Ok(true) => info!(agent_id = %agent_id, "Overdue agent blocked"),
                Ok(false) => debug!(agent_id = %agent_id, "Agent aging refreshed"),
                Err(e) => warn!(agent_id = %agent_id, error = %e, "Failed to refresh agent aging"),
            }
            return;
        }

        match self.aging.for_agent(agent_id, Utc::now()).await {
            Ok(Some(row)) if row.needs_block() => warn!(
                agent_id = %agent_id,
                total_balance = %row.total_balance,
                bucket_8_plus = %row.bucket_8_plus,
                "Agent holds overdue cash"
            ),
            Ok(_) => debug!(agent_id = %agent_id, "Agent aging refreshed"),
            Err(e) => warn!(agent_id = %agent_id, error = %e, "Failed to refresh agent aging"),
        }
    }

    async fn refresh_all(&self) {
        if self.auto_block {
            if let Err(e) = self.aging.auto_block_overdue(Utc::now()).await {
                warn!(error = %e, "Failed to auto-block overdue agents");
            }
            return;
        }

        match self.aging.snapshot(Utc::now()).await {
            Ok(report) => info!(
                agents = report.summary.total_agents_with_balance,
                overdue_agents = report.summary.overdue_agents_count,
                outstanding = %report.summary.total_outstanding_amount,
                "Agent aging recomputed"
            ),
            Err(e) => warn!(error = %e, "Failed to recompute agent aging"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codledger_shared::types::{AgentId, CollectionId};
    use std::time::Duration;
    use tokio::sync::broadcast;

    #[tokio::test]
    async fn survives_database_errors_and_stops_when_the_bus_closes() {
        let (tx, rx) = broadcast::channel(4);
        let refresher = Refresher::new(DatabaseConnection::Disconnected, true);
        let handle = tokio::spawn(refresher.run(rx));

        tx.send(CollectionEvent::CollectionVerified {
            collection_id: CollectionId::new(),
            agent_id: AgentId::new(),
        })
        .unwrap();
        drop(tx);

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("refresher stops")
            .expect("refresher does not panic");
    }
}
