//! Chart of accounts and per-account ledger routes.

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use chrono::{DateTime, NaiveDate, Utc};
use codledger_core::ledger::{AccountSubtype, AccountType, NormalBalance};
use codledger_db::entities::accounts;
use codledger_db::repositories::{
    AccountFilter, AccountRepository, AccountWithActivity, CreateAccountInput, DateRange,
    LedgerQueryRepository, PeriodActivity,
};
use codledger_shared::types::{AccountId, PageRequest};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{csv_attachment, today};
use crate::AppState;
use crate::error::{ApiError, ApiResult};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{account_id}", get(get_account))
        .route("/accounts/{account_id}/active", patch(set_active))
        .route("/accounts/{account_id}/balance", get(get_balance))
        .route("/accounts/{account_id}/ledger", get(get_ledger))
        .route("/accounts/{account_id}/ledger/export", get(export_ledger))
}

/// Query parameters for listing accounts.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAccountsQuery {
    /// Filter by account type.
    #[serde(rename = "type")]
    pub account_type: Option<AccountType>,
    /// Filter by active status.
    pub active: Option<bool>,
    /// Start of the activity rollup period.
    pub activity_from: Option<NaiveDate>,
    /// End of the activity rollup period.
    pub activity_to: Option<NaiveDate>,
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    /// Four-digit code inside the type's range.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account description.
    pub description: Option<String>,
    /// Account type.
    #[serde(rename = "type", alias = "accountType")]
    pub account_type: AccountType,
    /// Defaults to the side natural for the type.
    pub normal_balance: Option<NormalBalance>,
    /// Finer classification.
    pub subtype: Option<AccountSubtype>,
}

/// Request body for activating or deactivating an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveRequest {
    /// New flag.
    pub is_active: bool,
}

/// Account as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account description.
    pub description: Option<String>,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Account subtype.
    pub subtype: Option<AccountSubtype>,
    /// Side that increases the balance.
    pub normal_balance: NormalBalance,
    /// Current balance.
    pub current_balance: Decimal,
    /// Lines posted so far.
    pub version: i64,
    /// Whether the account accepts postings.
    pub is_active: bool,
    /// Debits and credits in the requested period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<PeriodActivityResponse>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Period activity rollup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodActivityResponse {
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
}

impl From<PeriodActivity> for PeriodActivityResponse {
    fn from(activity: PeriodActivity) -> Self {
        Self {
            total_debit: activity.total_debit,
            total_credit: activity.total_credit,
        }
    }
}

impl From<accounts::Model> for AccountResponse {
    fn from(account: accounts::Model) -> Self {
        Self {
            id: account.id,
            code: account.code,
            name: account.name,
            description: account.description,
            account_type: account.account_type.into(),
            subtype: account.account_subtype.map(AccountSubtype::from),
            normal_balance: account.normal_balance.into(),
            current_balance: account.current_balance,
            version: account.version,
            is_active: account.is_active,
            activity: None,
            created_at: account.created_at.with_timezone(&Utc),
            updated_at: account.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<AccountWithActivity> for AccountResponse {
    fn from(row: AccountWithActivity) -> Self {
        let mut response = Self::from(row.account);
        response.activity = row.activity.map(PeriodActivityResponse::from);
        response
    }
}

/// Query parameters for the balance endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceQuery {
    /// Balance as of this date (inclusive). Defaults to the current balance.
    pub as_of: Option<NaiveDate>,
}

/// Date range for ledger pages and exports.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRangeQuery {
    /// First entry date included.
    #[serde(alias = "from")]
    pub start_date: Option<NaiveDate>,
    /// Last entry date included.
    #[serde(alias = "to")]
    pub end_date: Option<NaiveDate>,
}

impl LedgerRangeQuery {
    fn range(&self) -> ApiResult<DateRange> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && start > end
        {
            return Err(ApiError::bad_request(
                "INVALID_DATE_RANGE",
                format!("Start date {start} is after end date {end}"),
            ));
        }
        Ok(DateRange {
            start: self.start_date,
            end: self.end_date,
        })
    }
}

/// GET `/accounts` - List accounts, optionally with period activity.
async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListAccountsQuery>,
    Query(page): Query<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    let activity = match (query.activity_from, query.activity_to) {
        (Some(from), Some(to)) if from > to => {
            return Err(ApiError::bad_request(
                "INVALID_DATE_RANGE",
                format!("Start date {from} is after end date {to}"),
            ));
        }
        (Some(from), Some(to)) => Some((from, to)),
        (Some(from), None) => Some((from, today())),
        (None, Some(to)) => Some((NaiveDate::default(), to)),
        (None, None) => None,
    };

    let filter = AccountFilter {
        account_type: query.account_type,
        is_active: query.active,
        activity,
    };

    let accounts = AccountRepository::new(state.db.clone()).list(filter, page).await?;
    Ok(Json(accounts.map(AccountResponse::from)))
}

/// POST `/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = CreateAccountInput {
        code: payload.code,
        name: payload.name,
        description: payload.description,
        account_type: payload.account_type,
        account_subtype: payload.subtype,
        normal_balance: payload
            .normal_balance
            .unwrap_or_else(|| payload.account_type.natural_side()),
    };

    let account = AccountRepository::new(state.db.clone()).create(input).await?;

    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// GET `/accounts/{account_id}` - Get one account.
async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> ApiResult<Json<AccountResponse>> {
    let account = AccountRepository::new(state.db.clone()).get(account_id).await?;
    Ok(Json(account.into()))
}

/// PATCH `/accounts/{account_id}/active` - Activate or deactivate an account.
async fn set_active(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
    Json(payload): Json<SetActiveRequest>,
) -> ApiResult<Json<AccountResponse>> {
    let account = AccountRepository::new(state.db.clone())
        .set_active(account_id, payload.is_active)
        .await?;
    Ok(Json(account.into()))
}

/// Balance response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    /// Account ID.
    pub account_id: AccountId,
    /// Date the balance applies to.
    pub as_of: NaiveDate,
    /// Balance at the end of that date.
    pub balance: Decimal,
}

/// GET `/accounts/{account_id}/balance` - Balance now or as of a date.
async fn get_balance(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
    Query(query): Query<BalanceQuery>,
) -> ApiResult<Json<BalanceResponse>> {
    let (as_of, balance) = match query.as_of {
        Some(as_of) => {
            let balance = LedgerQueryRepository::new(state.db.clone())
                .balance_as_of(account_id, as_of)
                .await?;
            (as_of, balance)
        }
        None => {
            let account = AccountRepository::new(state.db.clone()).get(account_id).await?;
            (today(), account.current_balance)
        }
    };

    Ok(Json(BalanceResponse {
        account_id,
        as_of,
        balance,
    }))
}

/// GET `/accounts/{account_id}/ledger` - One page of the account's lines, oldest first.
async fn get_ledger(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
    Query(range): Query<LedgerRangeQuery>,
    Query(page): Query<PageRequest>,
) -> ApiResult<impl IntoResponse> {
    let ledger = LedgerQueryRepository::new(state.db.clone())
        .get_ledger(account_id, range.range()?, page)
        .await?;

    Ok(Json(serde_json::json!({
        "account": AccountResponse::from(ledger.account),
        "transactions": ledger.transactions.data,
        "pagination": ledger.transactions.pagination,
    })))
}

/// GET `/accounts/{account_id}/ledger/export` - The account's lines as a CSV stream.
async fn export_ledger(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
    Query(range): Query<LedgerRangeQuery>,
) -> ApiResult<Response> {
    let stream = LedgerQueryRepository::new(state.db.clone())
        .export_ledger(account_id, range.range()?)
        .await?;

    info!(account_id = %account_id, "Streaming ledger export");
    Ok(csv_attachment(
        &format!("ledger-{account_id}.csv"),
        Body::from_stream(stream),
    ))
}
