use axum::{extract::Query, http::StatusCode, response::{IntoResponse, Json}};
use serde::Deserialize;
use shared::CampDurationResponse;
use tracing::info;

use crate::domain::models::camp::compute_duration_days;

#[derive(Debug, Deserialize)]
pub struct CampDurationQuery {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

/// Duration helper used by the camp edit form while dates are being typed
pub async fn get_camp_duration(Query(query): Query<CampDurationQuery>) -> impl IntoResponse {
    info!("GET /api/camps/duration - {} to {}", query.start, query.end);

    let duration_days = compute_duration_days(&query.start, &query.end);
    (
        StatusCode::OK,
        Json(CampDurationResponse {
            start_date: query.start,
            end_date: query.end,
            duration_days,
        }),
    )
}
