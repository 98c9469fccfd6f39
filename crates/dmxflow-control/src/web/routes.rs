//! Catalog API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use dmxflow_core::{FixtureCatalog, FixtureDefinition};
use std::sync::Arc;

use super::handlers::{ApiResponse, StatusResponse};
use super::server::AppState;

/// Build the API router
pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/fixtures", get(list_fixtures))
        .route("/fixtures/:manufacturer/:model", get(get_fixture))
        .route("/api/status", get(get_status))
}

/// GET /fixtures - List all fixture definitions
async fn list_fixtures(State(state): State<AppState>) -> Json<ApiResponse<FixtureCatalog>> {
    Json(ApiResponse::success(state.catalog.as_ref().clone()))
}

/// GET /fixtures/:manufacturer/:model - Get one definition
async fn get_fixture(
    Path((manufacturer, model)): Path<(String, String)>,
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Arc<FixtureDefinition>>>) {
    match state.catalog.get(&manufacturer, &model) {
        Some(definition) => (StatusCode::OK, Json(ApiResponse::success(definition))),
        None => {
            tracing::debug!("Fixture {} {} not in catalog", manufacturer, model);
            (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(format!(
                    "Fixture {} {} not found",
                    manufacturer, model
                ))),
            )
        }
    }
}

/// GET /api/status - Service status
async fn get_status(State(state): State<AppState>) -> Json<ApiResponse<StatusResponse>> {
    Json(ApiResponse::success(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started.elapsed().as_secs(),
        fixture_definitions: state.catalog.len(),
    }))
}
