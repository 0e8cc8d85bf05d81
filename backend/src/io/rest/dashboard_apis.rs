use axum::{extract::State, http::StatusCode, response::{IntoResponse, Json}};
use tracing::info;

use super::error_response;
use crate::AppState;

pub async fn get_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/dashboard");

    match state.dashboard_service.dashboard_stats().await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => error_response("compute dashboard", e),
    }
}
