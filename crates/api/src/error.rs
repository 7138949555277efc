//! Rendering of domain and store errors as HTTP responses.
//!
//! Every error becomes `{ "error": CODE, "message": text }` with the status its module
//! assigns. Server-side failures are logged and their details withheld.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use codledger_db::repositories::{CollectionStoreError, LedgerStoreError, ReportStoreError};
use codledger_shared::AppError;
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

/// Result type for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// An error ready to be sent to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 400 with the given code.
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    /// Status that will be sent.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code that will be sent.
    pub const fn code(&self) -> &'static str {
        self.code
    }

    fn from_parts(status: u16, code: &'static str, message: String) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error_code = code, error = %message, "Request failed");
            return Self::new(status, code, "An internal error occurred");
        }
        Self::new(status, code, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

impl From<LedgerStoreError> for ApiError {
    fn from(err: LedgerStoreError) -> Self {
        Self::from_parts(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<CollectionStoreError> for ApiError {
    fn from(err: CollectionStoreError) -> Self {
        Self::from_parts(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<ReportStoreError> for ApiError {
    fn from(err: ReportStoreError) -> Self {
        Self::from_parts(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::from_parts(err.status_code(), err.error_code(), err.to_string())
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::from(AppError::Database(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codledger_core::collections::LifecycleError;
    use codledger_core::ledger::LedgerError;
    use codledger_shared::types::{AccountId, DepositId};
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn renders_code_and_message() {
        let err = ApiError::from(LedgerStoreError::from(LedgerError::AccountNotFound(AccountId::new())));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let body = body_json(err.into_response()).await;
        assert_eq!(body["error"], "ACCOUNT_NOT_FOUND");
        assert!(body["message"].as_str().unwrap().contains("not found"));
    }

    #[test]
    fn batch_cap_is_a_bad_request() {
        let err = ApiError::from(CollectionStoreError::from(LifecycleError::BatchTooLarge {
            size: 51,
            max: 50,
        }));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "BATCH_TOO_LARGE");
    }

    #[test]
    fn not_found_deposit() {
        let err = ApiError::from(CollectionStoreError::from(LifecycleError::DepositNotFound(DepositId::new())));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "DEPOSIT_NOT_FOUND");
    }

    #[tokio::test]
    async fn database_details_are_withheld() {
        let err = ApiError::from(DbErr::Custom("connection reset by peer".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(err.into_response()).await;
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert_eq!(body["message"], "An internal error occurred");
    }
}
