//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST routes for the ledger, statements, collections, deposits, aging and cash flow
//! - Mapping of domain errors onto `{ "error", "message" }` responses
//! - The collection event channel that drives downstream aging refreshes

pub mod error;
pub mod events;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use codledger_shared::config::LedgerConfig;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::events::EventBus;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DatabaseConnection,
    /// Ledger settings: system accounts, batch cap, forecast windows.
    pub ledger: Arc<LedgerConfig>,
    /// Fan-out of collection and deposit status changes.
    pub events: EventBus,
}

impl AppState {
    /// Creates state with a fresh event bus.
    pub fn new(db: DatabaseConnection, ledger: LedgerConfig) -> Self {
        Self {
            db,
            ledger: Arc::new(ledger),
            events: EventBus::default(),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
