use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::collections::HashMap;

use crate::core::metrics;
use crate::core::state::AppState;
use crate::schemas::{HealthResponse, RootResponse};

pub(crate) async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let response = RootResponse {
        message: "ExamEval API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs_url: format!("{}/docs", state.settings().api().api_v1_str),
    };

    Json(response)
}

/// Desks live in memory, so health reduces to reporting their counts and
/// whether shutdown has begun.
pub(crate) async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut components = HashMap::new();
    components.insert("practice_desks".to_string(), state.practice().len().await.to_string());
    components.insert("upload_desks".to_string(), state.uploads().len().await.to_string());
    components.insert("catalog_tests".to_string(), state.catalog().tests().len().to_string());

    let status = if state.shutdown().is_cancelled() { "draining" } else { "healthy" };

    Json(HealthResponse { service: "exameval".to_string(), status: status.to_string(), components })
}

pub(crate) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    if !state.settings().telemetry().prometheus_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }

    match metrics::render() {
        Some(body) => ([(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
            .into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
