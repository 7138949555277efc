//! Cash position and forecast routes.

use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    response::Response,
    routing::get,
};
use chrono::Utc;
use codledger_core::cashflow::CashFlowReport;
use codledger_core::export;
use codledger_db::repositories::{CashFlowRepository, LedgerStoreError};
use serde::Deserialize;

use super::csv_attachment;
use crate::AppState;
use crate::error::ApiResult;

/// Creates the cash flow routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cash-flow", get(cash_flow))
        .route("/cash-flow/export/csv", get(export_cash_flow))
}

/// Query parameters for the cash flow report.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowQuery {
    /// Days to project. Defaults to the configured horizon.
    #[serde(alias = "days")]
    pub horizon_days: Option<u32>,
}

async fn build_report(state: &AppState, query: &CashFlowQuery) -> ApiResult<CashFlowReport> {
    let horizon = query
        .horizon_days
        .unwrap_or(state.ledger.forecast_horizon_days);
    let report = CashFlowRepository::new(state.db.clone(), state.ledger.accounts.clone())
        .report(Utc::now(), horizon, state.ledger.forecast_lookback_days)
        .await?;
    Ok(report)
}

/// GET `/cash-flow` - KPIs, forecast and per-agent holdings.
async fn cash_flow(
    State(state): State<AppState>,
    Query(query): Query<CashFlowQuery>,
) -> ApiResult<Json<CashFlowReport>> {
    Ok(Json(build_report(&state, &query).await?))
}

/// GET `/cash-flow/export/csv` - The forecast as CSV.
async fn export_cash_flow(
    State(state): State<AppState>,
    Query(query): Query<CashFlowQuery>,
) -> ApiResult<Response> {
    let report = build_report(&state, &query).await?;
    let csv = export::forecast_csv(&report.forecast).map_err(LedgerStoreError::from)?;

    let filename = format!("cash-flow-{}.csv", report.generated_at.format("%Y%m%d"));
    Ok(csv_attachment(&filename, Body::from(csv)))
}
