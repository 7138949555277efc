//! Database migration runner for codledger.
//!
//! Usage:
//!   migrator up      - Apply the ledger and collection schema
//!   migrator down    - Roll back the last migration
//!   migrator status  - Show which migrations are applied
//!   migrator fresh   - Drop everything and re-apply
//!
//! Reads `DATABASE_URL` (a `.env` file is honored).

use codledger_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The CLI installs its own tracing subscriber.
    cli::run_cli(Migrator).await;
}
