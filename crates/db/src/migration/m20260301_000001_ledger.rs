//! Chart of accounts, journal entries and ledger lines.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(LEDGER_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(JOURNAL_ENTRY_COUNTERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

CREATE TYPE normal_balance AS ENUM ('debit', 'credit');

CREATE TYPE account_subtype AS ENUM (
    'cash',
    'receivable',
    'inventory',
    'current_liability',
    'capital',
    'operating_revenue',
    'cost_of_goods_sold',
    'operating_expense'
);

CREATE TYPE source_type AS ENUM (
    'manual',
    'order_settlement',
    'expense',
    'deposit',
    'agent_collection',
    'adjustment',
    'reversal'
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    code VARCHAR(4) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    account_type account_type NOT NULL,
    account_subtype account_subtype,
    normal_balance normal_balance NOT NULL,
    current_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    version BIGINT NOT NULL DEFAULT 0,
    last_entry_date DATE,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_code_digits CHECK (code ~ '^[0-9]{4}$'),
    CONSTRAINT chk_normal_balance_matches_type CHECK (
        (account_type IN ('asset', 'expense') AND normal_balance = 'debit')
        OR (account_type IN ('liability', 'equity', 'revenue') AND normal_balance = 'credit')
    )
);

CREATE INDEX idx_accounts_type ON accounts(account_type) WHERE is_active;
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    entry_number VARCHAR(20) NOT NULL UNIQUE,
    entry_date DATE NOT NULL,
    description TEXT NOT NULL,
    source_type source_type NOT NULL DEFAULT 'manual',
    source_id UUID,
    total_amount NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_total_positive CHECK (total_amount > 0)
);

CREATE INDEX idx_je_date ON journal_entries(entry_date);
CREATE INDEX idx_je_source ON journal_entries(source_type, source_id);
";

const LEDGER_TRANSACTIONS_SQL: &str = r"
CREATE TABLE ledger_transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id),
    account_id UUID NOT NULL REFERENCES accounts(id),
    line_number INTEGER NOT NULL,
    debit_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    account_version BIGINT NOT NULL,
    account_previous_balance NUMERIC(19, 4) NOT NULL,
    running_balance NUMERIC(19, 4) NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_one_side CHECK (
        (debit_amount > 0 AND credit_amount = 0) OR (debit_amount = 0 AND credit_amount > 0)
    ),
    CONSTRAINT uq_lt_account_version UNIQUE (account_id, account_version),
    CONSTRAINT uq_lt_entry_line UNIQUE (journal_entry_id, line_number)
);

CREATE INDEX idx_lt_entry ON ledger_transactions(journal_entry_id);
";

const JOURNAL_ENTRY_COUNTERS_SQL: &str = r"
CREATE TABLE journal_entry_counters (
    entry_date DATE PRIMARY KEY,
    last_sequence BIGINT NOT NULL
);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS journal_entry_counters;
DROP TABLE IF EXISTS ledger_transactions;
DROP TABLE IF EXISTS journal_entries;
DROP TABLE IF EXISTS accounts;
DROP TYPE IF EXISTS source_type;
DROP TYPE IF EXISTS account_subtype;
DROP TYPE IF EXISTS normal_balance;
DROP TYPE IF EXISTS account_type;
";
