//! Agent collection routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use codledger_core::collections::{BulkOutcome, Collection, CollectionEvent, CollectionStatus};
use codledger_db::repositories::{CollectionFilter, CollectionRepository, RecordCollectionInput};
use codledger_shared::types::{AgentId, CollectionId, OrderId, PageRequest, PageResponse};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiResult;

/// Creates the collection routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/collections", get(list_collections).post(record_collection))
        .route("/collections/bulk-verify", post(bulk_verify))
        .route("/collections/{collection_id}/verify", post(verify_collection))
        .route("/collections/{collection_id}/reconcile", post(reconcile_collection))
}

fn repository(state: &AppState) -> CollectionRepository {
    let repo = CollectionRepository::new(state.db.clone());
    if state.ledger.post_collection_entries {
        repo.with_postings(state.ledger.accounts.clone())
    } else {
        repo
    }
}

/// Request body for recording a collection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCollectionRequest {
    /// Delivered order the cash was collected for.
    pub order_id: OrderId,
    /// Collecting agent.
    pub agent_id: AgentId,
    /// Amount collected.
    pub amount: Decimal,
    /// When the cash was collected. Defaults to now.
    pub collection_date: Option<DateTime<Utc>>,
}

/// Query parameters for listing collections.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCollectionsQuery {
    /// Only this agent.
    pub agent_id: Option<AgentId>,
    /// Only this status.
    pub status: Option<CollectionStatus>,
    /// Collected at or after.
    pub from: Option<DateTime<Utc>>,
    /// Collected at or before.
    pub to: Option<DateTime<Utc>>,
}

/// Request body for bulk verification.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkVerifyRequest {
    /// Collections to verify.
    #[serde(alias = "collectionIds")]
    pub ids: Vec<CollectionId>,
}

/// POST `/collections` - Record a draft collection.
async fn record_collection(
    State(state): State<AppState>,
    Json(payload): Json<RecordCollectionRequest>,
) -> ApiResult<impl IntoResponse> {
    let collection = repository(&state)
        .record(RecordCollectionInput {
            order_id: payload.order_id,
            agent_id: payload.agent_id,
            amount: payload.amount,
            collection_date: payload.collection_date.unwrap_or_else(Utc::now),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

/// GET `/collections` - List collections, newest first.
async fn list_collections(
    State(state): State<AppState>,
    Query(query): Query<ListCollectionsQuery>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<Collection>>> {
    let filter = CollectionFilter {
        agent_id: query.agent_id,
        status: query.status,
        from: query.from,
        to: query.to,
    };
    Ok(Json(repository(&state).list(filter, page).await?))
}

/// POST `/collections/{collection_id}/verify` - Draft to verified.
async fn verify_collection(
    State(state): State<AppState>,
    Path(collection_id): Path<CollectionId>,
) -> ApiResult<Json<Collection>> {
    let collection = repository(&state).verify(collection_id, Utc::now()).await?;
    state.events.publish(CollectionEvent::CollectionVerified {
        collection_id,
        agent_id: collection.agent_id,
    });
    Ok(Json(collection))
}

/// POST `/collections/bulk-verify` - Verify each id independently.
async fn bulk_verify(
    State(state): State<AppState>,
    Json(payload): Json<BulkVerifyRequest>,
) -> ApiResult<Json<BulkOutcome<CollectionId>>> {
    let repo = repository(&state);
    let outcome = repo.bulk_verify(&payload.ids, Utc::now()).await?;

    let verified = join_all(outcome.succeeded.iter().map(|id| repo.get(*id))).await;
    state.events.publish_all(verified.into_iter().filter_map(Result::ok).map(|c| {
        CollectionEvent::CollectionVerified {
            collection_id: c.id,
            agent_id: c.agent_id,
        }
    }));

    Ok(Json(outcome))
}

/// POST `/collections/{collection_id}/reconcile` - Verified to reconciled.
async fn reconcile_collection(
    State(state): State<AppState>,
    Path(collection_id): Path<CollectionId>,
) -> ApiResult<Json<Collection>> {
    let collection = repository(&state).reconcile(collection_id, Utc::now()).await?;
    state.events.publish(CollectionEvent::CollectionReconciled {
        collection_id,
        agent_id: collection.agent_id,
    });
    Ok(Json(collection))
}
