//! codledger API server
//!
//! Main entry point for the ledger and agent cash reconciliation service.

mod refresher;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codledger_api::{AppState, create_router};
use codledger_db::connect_with;
use codledger_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect_with(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    info!(
        cash_in_hand = %config.ledger.accounts.cash_in_hand,
        cash_in_transit = %config.ledger.accounts.cash_in_transit,
        ar_agents = %config.ledger.accounts.ar_agents,
        post_collection_entries = config.ledger.post_collection_entries,
        bulk_deposit_cap = config.ledger.bulk_deposit_cap,
        auto_block_overdue = config.ledger.auto_block_overdue,
        "Ledger configured"
    );

    let state = AppState::new(db.clone(), config.ledger.clone());

    let refresher = tokio::spawn(
        refresher::Refresher::new(db, config.ledger.auto_block_overdue).run(state.events.subscribe()),
    );

    let app = create_router(state);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresher.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
