//! Balance sheet and profit and loss routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{Datelike, NaiveDate};
use codledger_core::reports::{BalanceSheet, ProfitAndLoss};
use codledger_db::repositories::StatementRepository;
use serde::Deserialize;

use super::today;
use crate::AppState;
use crate::error::ApiResult;

/// Creates the statement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/balance-sheet", get(balance_sheet))
        .route("/profit-loss", get(profit_and_loss))
}

/// Query parameters for the balance sheet.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheetQuery {
    /// Cumulative up to and including this date. Defaults to today.
    pub as_of_date: Option<NaiveDate>,
}

/// Query parameters for profit and loss.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLossQuery {
    /// First day of the period. Defaults to the first of the current month.
    pub start_date: Option<NaiveDate>,
    /// Last day of the period. Defaults to today.
    pub end_date: Option<NaiveDate>,
}

/// GET `/balance-sheet` - Balance sheet as of a date.
async fn balance_sheet(
    State(state): State<AppState>,
    Query(query): Query<BalanceSheetQuery>,
) -> ApiResult<Json<BalanceSheet>> {
    let as_of = query.as_of_date.unwrap_or_else(today);
    let sheet = StatementRepository::new(state.db.clone()).balance_sheet(as_of).await?;
    Ok(Json(sheet))
}

/// GET `/profit-loss` - Profit and loss for a period.
async fn profit_and_loss(
    State(state): State<AppState>,
    Query(query): Query<ProfitLossQuery>,
) -> ApiResult<Json<ProfitAndLoss>> {
    let end = query.end_date.unwrap_or_else(today);
    let start = query
        .start_date
        .unwrap_or_else(|| end.with_day(1).unwrap_or(end));
    let pnl = StatementRepository::new(state.db.clone())
        .profit_and_loss(start, end)
        .await?;
    Ok(Json(pnl))
}
