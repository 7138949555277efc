//! Agent aging reads and the blocked-agent flag.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use codledger_core::aging::{AgentAging, AgingClassifier, AgingReport, OutstandingCollection};
use codledger_shared::types::AgentId;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, FromQueryResult, QueryFilter, QuerySelect, Set, Statement,
};
use uuid::Uuid;

use super::read_snapshot;
use crate::entities::{agent_blocks, agent_collections, sea_orm_active_enums};

#[derive(Debug, FromQueryResult)]
struct OutstandingRow {
    agent_id: Uuid,
    amount: Decimal,
    collection_date: sea_orm::prelude::DateTimeWithTimeZone,
}

impl From<OutstandingRow> for OutstandingCollection {
    fn from(row: OutstandingRow) -> Self {
        Self {
            agent_id: row.agent_id.into(),
            amount: row.amount,
            collection_date: row.collection_date.with_timezone(&Utc),
        }
    }
}

/// Reason recorded when an overdue agent is blocked automatically.
pub const AUTO_BLOCK_REASON: &str = "Automatic block: overdue collection balance (4+ days)";

/// Aging repository.
#[derive(Debug, Clone)]
pub struct AgingRepository {
    db: DatabaseConnection,
}

impl AgingRepository {
    /// Creates a new aging repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Aging of every agent holding unreconciled cash, as of `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn snapshot(&self, now: DateTime<Utc>) -> Result<AgingReport, DbErr> {
        let txn = read_snapshot(&self.db).await?;
        let report = Self::snapshot_in(&txn, now, None).await?;
        txn.commit().await?;
        Ok(report)
    }

    /// Aging of one agent, `None` when it holds nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn for_agent(&self, agent_id: AgentId, now: DateTime<Utc>) -> Result<Option<AgentAging>, DbErr> {
        let txn = read_snapshot(&self.db).await?;
        let report = Self::snapshot_in(&txn, now, Some(agent_id)).await?;
        txn.commit().await?;
        Ok(report.buckets.into_iter().next())
    }

    pub(crate) async fn snapshot_in<C>(
        conn: &C,
        now: DateTime<Utc>,
        agent: Option<AgentId>,
    ) -> Result<AgingReport, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut query = agent_collections::Entity::find()
            .select_only()
            .column(agent_collections::Column::AgentId)
            .column(agent_collections::Column::Amount)
            .column(agent_collections::Column::CollectionDate)
            .filter(
                agent_collections::Column::Status.ne(sea_orm_active_enums::CollectionStatus::Reconciled),
            );
        if let Some(agent_id) = agent {
            query = query.filter(agent_collections::Column::AgentId.eq(agent_id.into_inner()));
        }

        let outstanding: Vec<OutstandingCollection> = query
            .into_model::<OutstandingRow>()
            .all(conn)
            .await?
            .into_iter()
            .map(OutstandingCollection::from)
            .collect();

        let blocked = Self::blocked_in(conn).await?;
        Ok(AgingClassifier::classify(now, &outstanding, &blocked))
    }

    /// Agents currently blocked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn blocked_agents(&self) -> Result<HashSet<AgentId>, DbErr> {
        Self::blocked_in(&self.db).await
    }

    async fn blocked_in<C>(conn: &C) -> Result<HashSet<AgentId>, DbErr>
    where
        C: ConnectionTrait,
    {
        Ok(agent_blocks::Entity::find()
            .all(conn)
            .await?
            .into_iter()
            .map(|block| AgentId::from_uuid(block.agent_id))
            .collect())
    }

    /// Marks an agent as blocked. Blocking twice keeps the original timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn block(&self, agent_id: AgentId, reason: Option<String>) -> Result<(), DbErr> {
        let block = agent_blocks::ActiveModel {
            agent_id: Set(agent_id.into_inner()),
            reason: Set(reason),
            blocked_at: Set(Utc::now().into()),
        };

        agent_blocks::Entity::insert(block)
            .on_conflict(
                OnConflict::column(agent_blocks::Column::AgentId)
                    .update_column(agent_blocks::Column::Reason)
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        tracing::info!(agent_id = %agent_id, "Agent blocked");
        Ok(())
    }

    /// Blocks `agent_id` if it holds cash aged four days or more.
    ///
    /// Returns whether a new block was recorded. An existing block, manual or automatic,
    /// is left as it is.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn block_if_overdue(&self, agent_id: AgentId, now: DateTime<Utc>) -> Result<bool, DbErr> {
        match self.for_agent(agent_id, now).await? {
            Some(row) if row.needs_block() => self.auto_block(agent_id).await,
            _ => Ok(false),
        }
    }

    /// Blocks every unblocked agent holding overdue cash. Returns the agents blocked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn auto_block_overdue(&self, now: DateTime<Utc>) -> Result<Vec<AgentId>, DbErr> {
        let report = self.snapshot(now).await?;

        let mut blocked = Vec::new();
        for agent_id in AgingClassifier::agents_to_block(&report) {
            if self.auto_block(agent_id).await? {
                blocked.push(agent_id);
            }
        }

        tracing::info!(
            overdue_agents = report.summary.overdue_agents_count,
            blocked = blocked.len(),
            "Auto-block cycle completed"
        );
        Ok(blocked)
    }

    async fn auto_block(&self, agent_id: AgentId) -> Result<bool, DbErr> {
        let result = self
            .db
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                r"
                INSERT INTO agent_blocks (agent_id, reason, blocked_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (agent_id) DO NOTHING
                ",
                [
                    agent_id.into_inner().into(),
                    AUTO_BLOCK_REASON.into(),
                    Utc::now().into(),
                ],
            ))
            .await?;

        let inserted = result.rows_affected() > 0;
        if inserted {
            tracing::warn!(agent_id = %agent_id, "Agent blocked for overdue cash");
        }
        Ok(inserted)
    }

    /// Lifts a block. Returns whether the agent was blocked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn unblock(&self, agent_id: AgentId) -> Result<bool, DbErr> {
        let result = agent_blocks::Entity::delete_by_id(agent_id.into_inner())
            .exec(&self.db)
            .await?;

        let was_blocked = result.rows_affected > 0;
        if was_blocked {
            tracing::info!(agent_id = %agent_id, "Agent unblocked");
        }
        Ok(was_blocked)
    }
}
