//! # REST API for Data Export

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use super::error_response;
use crate::AppState;

/// Export the cadets of an institution as CSV content
pub async fn export_cadets_csv(
    State(state): State<AppState>,
    Path(institution_id): Path<String>,
) -> impl IntoResponse {
    info!("📄 GET /api/institutions/{}/export/csv", institution_id);

    match state.export_service.export_cadets_csv(&institution_id).await {
        Ok(export) => (StatusCode::OK, Json(export)).into_response(),
        Err(e) => error_response("export cadets", e),
    }
}
