//! # REST API
//!
//! Builds the axum router that exposes the transaction pipeline over HTTP.
//! Handlers only translate: request bytes go to [`TransactionService`],
//! and its results come back as status codes and JSON. No validation rules
//! live here.
//!
//! ## Endpoints
//!
//! | Method | Path                                  | Description                  |
//! |--------|---------------------------------------|------------------------------|
//! | GET    | `/health`                             | Liveness probe               |
//! | POST   | `/transactions`                       | Create a transaction         |
//! | GET    | `/transactions/:transaction_id/details` | Transaction by id          |

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tally_ledger::{ServiceError, Transaction, TransactionService, TransactionStore, Violation};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone: everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The create/read pipeline.
    pub service: TransactionService,
    /// Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
    /// Largest request body the API accepts, in bytes.
    pub max_body_bytes: usize,
}

impl AppState {
    /// Wires a service around `store`.
    pub fn new(
        store: Arc<dyn TransactionStore>,
        metrics: SharedMetrics,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            service: TransactionService::new(store),
            metrics,
            max_body_bytes,
        }
    }
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/transactions", post(create_transaction_handler))
        .route(
            "/transactions/:transaction_id/details",
            get(transaction_details_handler),
        )
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Wire representation of a stored transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    pub id: String,
    pub amount: f64,
    pub currency: String,
    pub description: String,
    /// RFC 3339, millisecond precision, `Z` suffix.
    pub processed_at: String,
}

impl From<&Transaction> for TransactionDetails {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id.to_string(),
            amount: tx.amount,
            currency: tx.currency.clone(),
            description: tx.description.clone(),
            processed_at: tx.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// One violated rule, as reported to API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationDetail {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl From<&Violation> for ViolationDetail {
    fn from(v: &Violation) -> Self {
        Self {
            field: v.field.clone(),
            rule: v.rule.code().to_string(),
            message: v.to_string(),
        }
    }
}

/// Error body returned by the transaction endpoints on failure, including
/// oversized or unreadable create bodies.
///
/// Requests that never reach a handler (unknown routes, wrong methods) get
/// axum's default responses.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ViolationDetail>>,
}

impl ErrorResponse {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: Vec<ViolationDetail>) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health`: returns 200 while the process is up.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `POST /transactions`: validates and stores a transaction.
///
/// The body is taken as raw bytes and parsed here, so an empty, malformed
/// or oversized body gets the same error shape as a validation failure
/// instead of axum's default plain-text rejection. Numbers outside the `f64`
/// range fail JSON parsing and are reported as invalid JSON.
async fn create_transaction_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let _timer = state.metrics.request_latency_seconds.start_timer();

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "create request body rejected");
            state.metrics.validation_failures_total.inc();
            let status = rejection.status();
            let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
                "Request body too large".to_string()
            } else {
                rejection.body_text()
            };
            return ErrorResponse::new(status, message).into_response();
        }
    };

    if body.iter().all(u8::is_ascii_whitespace) {
        state.metrics.validation_failures_total.inc();
        return ErrorResponse::new(StatusCode::BAD_REQUEST, "Missing request body").into_response();
    }

    let candidate: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "create request body is not valid JSON");
            state.metrics.validation_failures_total.inc();
            return ErrorResponse::new(StatusCode::BAD_REQUEST, "Invalid JSON format")
                .into_response();
        }
    };

    match state.service.create_transaction(&candidate) {
        Ok(tx) => {
            state.metrics.transactions_created_total.inc();
            state
                .metrics
                .stored_transactions
                .set(i64::try_from(state.service.stored_count()).unwrap_or(i64::MAX));
            (StatusCode::CREATED, Json(TransactionDetails::from(&tx))).into_response()
        }
        Err(ServiceError::Validation(err)) => {
            state.metrics.validation_failures_total.inc();
            let details = err.violations().iter().map(ViolationDetail::from).collect();
            ErrorResponse::new(StatusCode::BAD_REQUEST, "Validation error")
                .with_details(details)
                .into_response()
        }
        Err(ServiceError::Store(err)) => {
            state.metrics.store_failures_total.inc();
            tracing::error!(error = %err, "failed to create transaction");
            ErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create transaction",
            )
            .into_response()
        }
    }
}

/// `GET /transactions/:transaction_id/details`: returns one transaction.
///
/// Not-found is the pipeline's `None`; turning it into a 404 happens here.
async fn transaction_details_handler(
    Path(transaction_id): Path<String>,
    State(state): State<AppState>,
) -> Response {
    let _timer = state.metrics.request_latency_seconds.start_timer();
    state.metrics.lookups_total.inc();

    match state.service.get_transaction_details(&transaction_id) {
        Some(tx) => (StatusCode::OK, Json(TransactionDetails::from(&tx))).into_response(),
        None => {
            state.metrics.lookups_not_found_total.inc();
            ErrorResponse::new(
                StatusCode::NOT_FOUND,
                format!("Transaction with ID {} not found", transaction_id),
            )
            .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
