//! HTTP endpoint server using Axum

use axum::{
    extract::{
        multipart::MultipartError, rejection::JsonRejection, DefaultBodyLimit, Multipart, Request,
        State,
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::config::Config;
use crate::error::EvaluationError;
use crate::evaluation::QualityEngine;
use crate::metrics::{self, Metrics};
use crate::models::results::{CombinedEvaluation, DatasetResult, DescriptionResult};

/// Uploads larger than this are rejected before they reach the engine
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const HEALTH_STATUS: &str = "healthy";

#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub engine: Arc<QualityEngine>,
}

/// Error body `{"error": ...}` with a status matching the failure
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<EvaluationError> for ApiError {
    fn from(err: EvaluationError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if matches!(err, EvaluationError::RuleExtraction(_)) {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "Evaluation request failed");
        } else {
            warn!(status = %self.status, error = %self.message, "Evaluation request rejected");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": HEALTH_STATUS,
        "uptime_seconds": uptime_seconds,
        "service": "praxis-quality-engine"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis() as u64,
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Deserialize)]
pub struct DescriptionRequest {
    pub description: String,
}

/// Score a description against the rules it states
async fn evaluate_description(
    State(state): State<AppState>,
    request: Result<Json<DescriptionRequest>, JsonRejection>,
) -> Result<Json<DescriptionResult>, ApiError> {
    let Json(request) = request?;
    let result = state
        .engine
        .evaluate_description(&request.description)
        .await?;
    state.metrics.record_evaluation(metrics::DESCRIPTION);
    Ok(Json(result))
}

/// Score an uploaded archive (multipart field `file`)
async fn classify_dataset(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<DatasetResult>, ApiError> {
    let form = read_upload(multipart, "file").await?;
    let archive = form
        .archive
        .ok_or_else(|| ApiError::bad_request("missing multipart field `file`"))?;

    let result = state.engine.evaluate_dataset(&archive).await?;
    state.metrics.record_evaluation(metrics::DATASET);
    Ok(Json(result))
}

/// Score a description and an archive together (fields `description`, `files`)
async fn evaluate_combined(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CombinedEvaluation>, ApiError> {
    let form = read_upload(multipart, "files").await?;
    let description = form
        .description
        .ok_or_else(|| ApiError::bad_request("missing multipart field `description`"))?;
    let archive = form
        .archive
        .ok_or_else(|| ApiError::bad_request("missing multipart field `files`"))?;

    let result = state.engine.evaluate(description, archive).await?;
    state.metrics.record_evaluation(metrics::COMBINED);
    Ok(Json(result))
}

#[derive(Debug, Default)]
struct UploadForm {
    description: Option<String>,
    archive: Option<Vec<u8>>,
}

async fn read_upload(mut multipart: Multipart, archive_field: &str) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "description" {
            form.description = Some(field.text().await?);
        } else if name == archive_field {
            form.archive = Some(field.bytes().await?.to_vec());
        }
    }
    Ok(form)
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/description", post(evaluate_description))
        .route("/api/classify", post(classify_dataset))
        .route("/api/evaluate", post(evaluate_combined))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let engine = Arc::new(QualityEngine::from_config(&config));

    let state = AppState {
        metrics,
        start_time: Arc::new(Instant::now()),
        engine,
    };
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!(port = config.port, "HTTP server listening on port {}", config.port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        config.port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
