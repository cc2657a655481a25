//! HTTP API
//!
//! Thin axum layer over [`AnalystService`]. Errors are rendered as
//! `{"detail": "..."}` with the status from [`LlmError::http_status`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::LlmError;
use crate::service::{AnalystService, ProvidersOverview};
use crate::types::{ExecutionRequest, ExecutionResponse, GenerationRequest, GenerationResult};

pub type SharedService = Arc<AnalystService>;

/// Error wrapper that knows how to become an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub LlmError);

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(LlmError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::info!(error = %self.0, "Request rejected");
        }
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize)]
struct SchemaResponse {
    schema: String,
}

pub fn router(service: SharedService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/generate_sql", post(generate_sql))
        .route("/api/execute_sql", post(execute_sql))
        .route("/api/providers", get(list_providers))
        .route("/api/schema", get(describe_schema))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service)
}

/// Bind `addr` and serve until Ctrl+C.
pub async fn serve(service: SharedService, addr: SocketAddr) -> Result<(), LlmError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        providers = ?service.manager().available_providers(),
        default_provider = service.default_provider(),
        "SQL analyst API listening"
    );
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

async fn generate_sql(
    State(service): State<SharedService>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResult>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(service.generate(request).await?))
}

/// SQL errors are part of the response body (`{"data": null, "error": ...}`),
/// not an HTTP failure.
async fn execute_sql(
    State(service): State<SharedService>,
    payload: Result<Json<ExecutionRequest>, JsonRejection>,
) -> Result<Json<ExecutionResponse>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(service.execute(request).await.into_response()))
}

async fn list_providers(State(service): State<SharedService>) -> Json<ProvidersOverview> {
    Json(service.providers())
}

async fn describe_schema(
    State(service): State<SharedService>,
) -> Result<Json<SchemaResponse>, ApiError> {
    let schema = service.describe_schema().await?;
    Ok(Json(SchemaResponse { schema }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
