//! Journal entry routes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use codledger_core::ledger::{PostEntryInput, SourceType};
use codledger_db::repositories::{JournalRepository, PostedEntry};
use codledger_shared::types::JournalEntryId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{optional_json, today};
use crate::AppState;
use crate::error::ApiResult;

/// Creates the journal entry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journal-entries", post(post_entry))
        .route("/journal-entries/{entry_id}", get(get_entry))
        .route("/journal-entries/{entry_id}/reverse", post(reverse_entry))
}

/// Request body for reversing an entry.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseEntryRequest {
    /// Date of the reversal. Defaults to today.
    pub entry_date: Option<NaiveDate>,
    /// Defaults to "Reversal of <entry number>".
    pub description: Option<String>,
}

/// A posted journal entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryResponse {
    /// Entry ID.
    pub id: Uuid,
    /// Display number, sequential per entry date.
    pub entry_number: String,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Description.
    pub description: String,
    /// What produced the entry.
    pub source_type: SourceType,
    /// Identifier in the producing subsystem.
    pub source_id: Option<Uuid>,
    /// Sum of debits (equal to the sum of credits).
    pub total_amount: Decimal,
    /// Lines in posting order.
    pub lines: Vec<JournalLineResponse>,
    /// Posting time.
    pub created_at: DateTime<Utc>,
}

/// One posted line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalLineResponse {
    /// Line ID.
    pub id: Uuid,
    /// Account posted to.
    pub account_id: Uuid,
    /// Position within the entry.
    pub line_number: i32,
    /// Debit amount.
    pub debit_amount: Decimal,
    /// Credit amount.
    pub credit_amount: Decimal,
    /// Account balance before this line.
    pub previous_balance: Decimal,
    /// Account balance after this line.
    pub running_balance: Decimal,
    /// Account version after this line.
    pub account_version: i64,
    /// Line memo.
    pub description: Option<String>,
}

impl From<PostedEntry> for JournalEntryResponse {
    fn from(posted: PostedEntry) -> Self {
        let PostedEntry { entry, lines } = posted;
        Self {
            id: entry.id,
            entry_number: entry.entry_number,
            entry_date: entry.entry_date,
            description: entry.description,
            source_type: entry.source_type.into(),
            source_id: entry.source_id,
            total_amount: entry.total_amount,
            created_at: entry.created_at.with_timezone(&Utc),
            lines: lines
                .into_iter()
                .map(|line| JournalLineResponse {
                    id: line.id,
                    account_id: line.account_id,
                    line_number: line.line_number,
                    debit_amount: line.debit_amount,
                    credit_amount: line.credit_amount,
                    previous_balance: line.account_previous_balance,
                    running_balance: line.running_balance,
                    account_version: line.account_version,
                    description: line.description,
                })
                .collect(),
        }
    }
}

/// POST `/journal-entries` - Validate and post an entry.
async fn post_entry(
    State(state): State<AppState>,
    Json(payload): Json<PostEntryInput>,
) -> ApiResult<impl IntoResponse> {
    let posted = JournalRepository::new(state.db.clone()).post_entry(payload).await?;
    Ok((StatusCode::CREATED, Json(JournalEntryResponse::from(posted))))
}

/// GET `/journal-entries/{entry_id}` - Get an entry with its lines.
async fn get_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<JournalEntryId>,
) -> ApiResult<Json<JournalEntryResponse>> {
    let posted = JournalRepository::new(state.db.clone()).get_entry(entry_id).await?;
    Ok(Json(posted.into()))
}

/// POST `/journal-entries/{entry_id}/reverse` - Post the mirror image of an entry.
async fn reverse_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<JournalEntryId>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let request: ReverseEntryRequest = optional_json(&body)?;
    let reversal = JournalRepository::new(state.db.clone())
        .reverse_entry(entry_id, request.entry_date.unwrap_or_else(today), request.description)
        .await?;
    Ok((StatusCode::CREATED, Json(JournalEntryResponse::from(reversal))))
}
