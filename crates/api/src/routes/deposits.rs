//! Agent deposit routes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use codledger_core::collections::{
    BulkOutcome, CollectionEvent, Deposit, DepositStatus, ExplicitSelection,
};
use codledger_db::repositories::{
    CreateDepositInput, DepositFilter, DepositReconciliation, DepositRepository,
};
use codledger_shared::types::{AgentId, CollectionId, DepositId, PageRequest, PageResponse};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::optional_json;
use crate::AppState;
use crate::error::ApiResult;

/// Creates the deposit routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/deposits", get(list_deposits).post(create_deposit))
        .route("/deposits/bulk-verify", post(bulk_verify))
        .route("/deposits/{deposit_id}/verify", post(verify_deposit))
        .route("/deposits/{deposit_id}/reject", post(reject_deposit))
        .route("/deposits/{deposit_id}/reconcile", post(reconcile_deposit))
}

fn repository(state: &AppState) -> DepositRepository {
    let repo = DepositRepository::new(state.db.clone());
    if state.ledger.post_collection_entries {
        repo.with_postings(state.ledger.accounts.clone())
    } else {
        repo
    }
}

/// Request body for submitting a deposit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepositRequest {
    /// Depositing agent.
    pub agent_id: AgentId,
    /// Amount deposited.
    pub amount: Decimal,
    /// How the cash was handed over.
    pub deposit_method: String,
    /// Bank or receipt reference, unique.
    pub reference_number: String,
    /// Defaults to now.
    pub deposit_date: Option<DateTime<Utc>>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Query parameters for listing deposits.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDepositsQuery {
    /// Only this agent.
    pub agent_id: Option<AgentId>,
    /// Only this status.
    pub status: Option<DepositStatus>,
}

/// Request body for rejecting a deposit.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectDepositRequest {
    /// Reason for the rejection.
    pub notes: Option<String>,
}

/// Request body for bulk verification.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkVerifyRequest {
    /// Deposits to verify.
    #[serde(alias = "depositIds")]
    pub ids: Vec<DepositId>,
}

/// Request body for reconciling a deposit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileDepositRequest {
    /// Verified collections of the same agent that the deposit settles.
    pub collection_ids: Vec<CollectionId>,
}

/// POST `/deposits` - Submit a pending deposit.
async fn create_deposit(
    State(state): State<AppState>,
    Json(payload): Json<CreateDepositRequest>,
) -> ApiResult<impl IntoResponse> {
    let deposit = repository(&state)
        .create(CreateDepositInput {
            agent_id: payload.agent_id,
            amount: payload.amount,
            deposit_method: payload.deposit_method,
            reference_number: payload.reference_number,
            deposit_date: payload.deposit_date,
            notes: payload.notes,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(deposit)))
}

/// GET `/deposits` - List deposits, newest first.
async fn list_deposits(
    State(state): State<AppState>,
    Query(query): Query<ListDepositsQuery>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<Deposit>>> {
    let filter = DepositFilter {
        agent_id: query.agent_id,
        status: query.status,
    };
    Ok(Json(repository(&state).list(filter, page).await?))
}

/// POST `/deposits/{deposit_id}/verify` - Pending to verified.
async fn verify_deposit(
    State(state): State<AppState>,
    Path(deposit_id): Path<DepositId>,
) -> ApiResult<Json<Deposit>> {
    let deposit = repository(&state).verify(deposit_id, Utc::now()).await?;
    state.events.publish(CollectionEvent::DepositVerified {
        deposit_id,
        agent_id: deposit.agent_id,
    });
    Ok(Json(deposit))
}

/// POST `/deposits/{deposit_id}/reject` - Pending to rejected.
async fn reject_deposit(
    State(state): State<AppState>,
    Path(deposit_id): Path<DepositId>,
    body: Bytes,
) -> ApiResult<Json<Deposit>> {
    let request: RejectDepositRequest = optional_json(&body)?;
    let deposit = repository(&state)
        .reject(deposit_id, request.notes, Utc::now())
        .await?;
    Ok(Json(deposit))
}

/// POST `/deposits/bulk-verify` - Verify each id independently; the whole batch is
/// refused when it exceeds the configured cap.
async fn bulk_verify(
    State(state): State<AppState>,
    Json(payload): Json<BulkVerifyRequest>,
) -> ApiResult<Json<BulkOutcome<DepositId>>> {
    let repo = repository(&state);
    let outcome = repo
        .bulk_verify(&payload.ids, state.ledger.bulk_deposit_cap, Utc::now())
        .await?;

    let verified = join_all(outcome.succeeded.iter().map(|id| repo.get(*id))).await;
    state.events.publish_all(verified.into_iter().filter_map(Result::ok).map(|d| {
        CollectionEvent::DepositVerified {
            deposit_id: d.id,
            agent_id: d.agent_id,
        }
    }));

    Ok(Json(outcome))
}

/// POST `/deposits/{deposit_id}/reconcile` - Settle the named collections.
async fn reconcile_deposit(
    State(state): State<AppState>,
    Path(deposit_id): Path<DepositId>,
    Json(payload): Json<ReconcileDepositRequest>,
) -> ApiResult<Json<DepositReconciliation>> {
    let matcher = ExplicitSelection::new(payload.collection_ids);
    let settled = repository(&state)
        .reconcile(deposit_id, &matcher, Utc::now())
        .await?;

    state.events.publish_all(settled.reconciled.iter().map(|c| {
        CollectionEvent::CollectionReconciled {
            collection_id: c.id,
            agent_id: c.agent_id,
        }
    }));
    Ok(Json(settled))
}
