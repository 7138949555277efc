//! Agent aging routes and the agent block flag.

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Path, State},
    response::Response,
    routing::{get, put},
};
use chrono::Utc;
use codledger_core::aging::AgingReport;
use codledger_core::export;
use codledger_db::repositories::{AgingRepository, LedgerStoreError};
use codledger_shared::types::AgentId;
use serde::{Deserialize, Serialize};

use super::{csv_attachment, optional_json};
use crate::AppState;
use crate::error::ApiResult;

/// Creates the aging routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/agent-aging", get(agent_aging))
        .route("/agent-aging/export/csv", get(export_aging))
        .route("/agents/{agent_id}/block", put(block_agent).delete(unblock_agent))
}

/// Request body for blocking an agent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockAgentRequest {
    /// Why the agent is blocked.
    pub reason: Option<String>,
}

/// Block flag state after a change.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockResponse {
    /// The agent.
    pub agent_id: AgentId,
    /// Whether the agent is now blocked.
    pub is_blocked: bool,
}

/// GET `/agent-aging` - Outstanding agent cash split by age.
async fn agent_aging(State(state): State<AppState>) -> ApiResult<Json<AgingReport>> {
    let report = AgingRepository::new(state.db.clone()).snapshot(Utc::now()).await?;
    Ok(Json(report))
}

/// GET `/agent-aging/export/csv` - The aging table as CSV.
async fn export_aging(State(state): State<AppState>) -> ApiResult<Response> {
    let report = AgingRepository::new(state.db.clone()).snapshot(Utc::now()).await?;
    let csv = export::aging_csv(&report).map_err(LedgerStoreError::from)?;

    let filename = format!("agent-aging-{}.csv", report.generated_at.format("%Y%m%d"));
    Ok(csv_attachment(&filename, Body::from(csv)))
}

/// PUT `/agents/{agent_id}/block` - Flag an agent as blocked.
async fn block_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<AgentId>,
    body: Bytes,
) -> ApiResult<Json<BlockResponse>> {
    let request: BlockAgentRequest = optional_json(&body)?;
    AgingRepository::new(state.db.clone())
        .block(agent_id, request.reason)
        .await?;
    Ok(Json(BlockResponse {
        agent_id,
        is_blocked: true,
    }))
}

/// DELETE `/agents/{agent_id}/block` - Lift a block. Unblocking an unblocked agent is a no-op.
async fn unblock_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<AgentId>,
) -> ApiResult<Json<BlockResponse>> {
    AgingRepository::new(state.db.clone()).unblock(agent_id).await?;
    Ok(Json(BlockResponse {
        agent_id,
        is_blocked: false,
    }))
}
