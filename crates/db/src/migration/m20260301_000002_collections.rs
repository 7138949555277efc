//! Agent collections, deposits and blocks.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(AGENT_DEPOSITS_SQL).await?;
        db.execute_unprepared(AGENT_COLLECTIONS_SQL).await?;
        db.execute_unprepared(AGENT_BLOCKS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE collection_status AS ENUM ('draft', 'verified', 'reconciled');

CREATE TYPE deposit_status AS ENUM ('pending', 'verified', 'rejected');
";

const AGENT_DEPOSITS_SQL: &str = r"
CREATE TABLE agent_deposits (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    agent_id UUID NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    deposit_method VARCHAR(50) NOT NULL,
    reference_number VARCHAR(100) NOT NULL UNIQUE,
    status deposit_status NOT NULL DEFAULT 'pending',
    deposit_date TIMESTAMPTZ NOT NULL DEFAULT now(),
    notes TEXT,
    reviewed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_deposit_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_deposits_agent_status ON agent_deposits(agent_id, status);
";

const AGENT_COLLECTIONS_SQL: &str = r"
CREATE TABLE agent_collections (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    order_id UUID NOT NULL UNIQUE,
    agent_id UUID NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    status collection_status NOT NULL DEFAULT 'draft',
    collection_date TIMESTAMPTZ NOT NULL,
    verified_at TIMESTAMPTZ,
    reconciled_at TIMESTAMPTZ,
    deposit_id UUID REFERENCES agent_deposits(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_collection_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_collections_agent_status ON agent_collections(agent_id, status);
CREATE INDEX idx_collections_outstanding ON agent_collections(collection_date)
    WHERE status <> 'reconciled';
";

const AGENT_BLOCKS_SQL: &str = r"
CREATE TABLE agent_blocks (
    agent_id UUID PRIMARY KEY,
    reason TEXT,
    blocked_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS agent_blocks;
DROP TABLE IF EXISTS agent_collections;
DROP TABLE IF EXISTS agent_deposits;
DROP TYPE IF EXISTS deposit_status;
DROP TYPE IF EXISTS collection_status;
";
