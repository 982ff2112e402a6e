//! HTTP routes.
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `POST` | `/calculate` | `{"success": true, "total": 2364869}` |
//! | `POST` | `/estimate` | Full [`Estimate`] JSON |
//! | `POST` | `/pdf` | `application/pdf` attachment |
//! | `GET` | `/health` | `{"status": "ok"}` |

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, Request};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Local;
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{info, instrument, Level};
use uuid::Uuid;

use estimate_core::pdf::render_estimate_pdf;
use estimate_core::validation::validate_request;
use estimate_core::{Estimate, Estimator, RawEstimateRequest};

use crate::error::{ApiError, ApiResult};

pub const PDF_FILENAME: &str = "estimate.pdf";

/// Shared handler state. Cloned per request; the estimator is immutable.
#[derive(Clone, Debug)]
pub struct AppState {
    estimator: Arc<Estimator>,
}

impl AppState {
    pub fn new(estimator: Estimator) -> Self {
        AppState {
            estimator: Arc::new(estimator),
        }
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }
}

#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub success: bool,
    pub total: i64,
}

/// Build the application router with tracing and timeout layers.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/calculate", post(calculate))
        .route("/estimate", post(estimate))
        .route("/pdf", post(pdf))
        .route("/health", get(health))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %Uuid::new_v4(),
                    )
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[instrument(skip_all)]
async fn calculate(
    State(state): State<AppState>,
    body: Result<Json<RawEstimateRequest>, JsonRejection>,
) -> ApiResult<Json<CalculateResponse>> {
    let Json(raw) = body?;
    let estimate = state.estimator().estimate(&raw)?;
    info!(total = estimate.total_cash, "calculated");

    Ok(Json(CalculateResponse {
        success: true,
        total: estimate.total_cash,
    }))
}

#[instrument(skip_all)]
async fn estimate(
    State(state): State<AppState>,
    body: Result<Json<RawEstimateRequest>, JsonRejection>,
) -> ApiResult<Json<Estimate>> {
    let Json(raw) = body?;
    let estimate = state.estimator().estimate(&raw)?;
    info!(total = estimate.total_cash, rows = estimate.rows.len(), "estimated");
    Ok(Json(estimate))
}

#[instrument(skip_all)]
async fn pdf(
    State(state): State<AppState>,
    body: Result<Json<RawEstimateRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(raw) = body?;
    let estimator = state.estimator();
    let request = validate_request(&raw, estimator.prices())?;
    let estimate = estimator.estimate_validated(&request)?;
    let payments = estimator.payment_options(&estimate);
    let issued_on = Local::now().date_naive();

    let bytes = tokio::task::spawn_blocking(move || {
        render_estimate_pdf(&request, &estimate, &payments, issued_on)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("PDF task failed: {e}")))??;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{PDF_FILENAME}\""),
            ),
        ],
        bytes,
    ))
}
