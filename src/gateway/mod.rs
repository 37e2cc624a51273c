//! Monitoring HTTP surface (Axum).
//!
//! Liveness, readiness and a JSON dump of every component's counters. The
//! product's own routes live elsewhere.


use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::service::InsightServices;

/// Response header carrying a short machine-readable status.
pub const INSIGHT_STATUS_HEADER: &str = "x-insight-status";
pub const STATUS_HEALTHY: &str = "healthy";
pub const STATUS_READY: &str = "ready";
pub const STATUS_PENDING: &str = "pending";

pub fn create_router(services: Arc<InsightServices>) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/stats", get(stats_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(services)
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(Serialize)]
pub struct ComponentStatus {
    pub vocabulary: &'static str,
    pub statistics: &'static str,
    pub embedder: String,
    pub assistant: &'static str,
}

fn status_headers(status: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(INSIGHT_STATUS_HEADER, HeaderValue::from_static(status));
    headers
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (
        StatusCode::OK,
        status_headers(STATUS_HEALTHY),
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(services))]
pub async fn ready_handler(State(services): State<Arc<InsightServices>>) -> Response {
    let vocabulary = if services.pool().is_initialized() {
        STATUS_READY
    } else {
        STATUS_PENDING
    };
    let ready = services.is_ready();
    let statistics = if ready { STATUS_READY } else { STATUS_PENDING };
    let assistant = if services.orchestrator().has_assistant() {
        "enabled"
    } else {
        "disabled"
    };

    let components = ComponentStatus {
        vocabulary,
        statistics,
        embedder: services.embeddings().provider_name().to_string(),
        assistant,
    };

    let (code, status) = if ready {
        (StatusCode::OK, STATUS_READY)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, STATUS_PENDING)
    };

    (
        code,
        status_headers(status),
        Json(ReadyResponse { status, components }),
    )
        .into_response()
}

#[tracing::instrument(skip(services))]
pub async fn stats_handler(State(services): State<Arc<InsightServices>>) -> Response {
    (StatusCode::OK, Json(services.health())).into_response()
}
