//! API route definitions.

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use crate::AppState;
use crate::error::{ApiError, ApiResult};

pub mod accounts;
pub mod aging;
pub mod cashflow;
pub mod collections;
pub mod deposits;
pub mod health;
pub mod journal;
pub mod statements;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(journal::routes())
        .merge(statements::routes())
        .merge(collections::routes())
        .merge(deposits::routes())
        .merge(aging::routes())
        .merge(cashflow::routes())
}

/// Wraps a CSV body (complete or streamed) as a download named `filename`.
fn csv_attachment(filename: &str, body: Body) -> Response {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Parses an optional JSON body; an empty body yields the default.
fn optional_json<T>(body: &Bytes) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.is_empty() {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request("INVALID_BODY", e.to_string()))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use codledger_shared::config::LedgerConfig;
    use http_body_util::BodyExt;
    use rstest::rstest;
    use sea_orm::DatabaseConnection;
    use tower::ServiceExt;

    use crate::{AppState, create_router};

    fn app_with(ledger: LedgerConfig) -> axum::Router {
        create_router(AppState::new(DatabaseConnection::Disconnected, ledger))
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        send_to(app_with(LedgerConfig::default()), request).await
    }

    async fn send_to(app: axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_database_down() {
        let (status, body) = send(Request::get("/api/v1/health").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["database"], "down");
    }

    #[tokio::test]
    async fn oversized_deposit_batch_is_refused_up_front() {
        let ids: Vec<String> = (0..51).map(|_| uuid::Uuid::now_v7().to_string()).collect();
        let (status, body) =
            send(post_json("/api/v1/deposits/bulk-verify", &serde_json::json!({ "ids": ids }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BATCH_TOO_LARGE");
    }

    #[tokio::test]
    async fn configured_deposit_cap_cannot_exceed_fifty() {
        let app = app_with(LedgerConfig {
            bulk_deposit_cap: 500,
            ..LedgerConfig::default()
        });
        let ids: Vec<String> = (0..51).map(|_| uuid::Uuid::now_v7().to_string()).collect();
        let (status, body) = send_to(
            app,
            post_json("/api/v1/deposits/bulk-verify", &serde_json::json!({ "ids": ids })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BATCH_TOO_LARGE");
    }

    #[tokio::test]
    async fn empty_collection_batch_is_refused() {
        let (status, body) =
            send(post_json("/api/v1/collections/bulk-verify", &serde_json::json!({ "ids": [] }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "EMPTY_BATCH");
    }

    #[rstest]
    #[case("/api/v1/profit-loss?startDate=2026-02-01&endDate=2026-01-01")]
    #[case("/api/v1/accounts/0190a000-0000-7000-8000-000000000000/ledger?startDate=2026-02-01&endDate=2026-01-01")]
    #[case("/api/v1/accounts?activityFrom=2026-02-01&activityTo=2026-01-01")]
    #[tokio::test]
    async fn inverted_date_ranges_are_rejected(#[case] uri: &str) {
        let (status, body) = send(Request::get(uri).body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_DATE_RANGE");
    }

    #[tokio::test]
    async fn malformed_reverse_body_is_rejected() {
        let request = Request::post("/api/v1/journal-entries/0190a000-0000-7000-8000-000000000000/reverse")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_BODY");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (status, _) = send(Request::get("/api/v1/nope").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
