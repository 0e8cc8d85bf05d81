//! # REST API for Cadet Management
//!
//! The listing endpoint carries an `ETag` built from the institution's
//! listing revision and answers `304 Not Modified` to a matching
//! `If-None-Match`.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
};
use shared::{CadetListRequest, CadetResponse, CreateCadetRequest, DeleteCadetResponse, UpdateCadetRequest};
use tracing::{info, warn};

use super::error_response;
use super::mappers::cadet_mapper::CadetMapper;
use crate::AppState;

fn etag_matches(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate == etag)
}

pub async fn list_cadets(
    State(state): State<AppState>,
    Path(institution_id): Path<String>,
    Query(request): Query<CadetListRequest>,
    headers: HeaderMap,
) -> impl IntoResponse {
    info!("GET /api/institutions/{}/cadets - query: {:?}", institution_id, request);

    let etag = match state.cadet_service.listing_etag(&institution_id).await {
        Ok(etag) => etag,
        Err(e) => return error_response("list cadets", e),
    };
    if etag_matches(&headers, &etag) {
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
    }

    let query = match CadetMapper::to_list_query(&institution_id, request) {
        Ok(query) => query,
        Err(e) => return error_response("list cadets", e.into()),
    };

    match state.cadet_service.list_cadets(query).await {
        Ok(result) => {
            let mut response = (StatusCode::OK, Json(CadetMapper::to_list_response(result))).into_response();
            if let Ok(value) = HeaderValue::from_str(&etag) {
                response.headers_mut().insert(header::ETAG, value);
            }
            response
        }
        Err(e) => error_response("list cadets", e),
    }
}

pub async fn create_cadet(
    State(state): State<AppState>,
    Path(institution_id): Path<String>,
    Json(request): Json<CreateCadetRequest>,
) -> impl IntoResponse {
    info!("POST /api/institutions/{}/cadets - reg no: {}", institution_id, request.reg_no);

    let command = match CadetMapper::to_create_command(&institution_id, request) {
        Ok(command) => command,
        Err(e) => return error_response("create cadet", e.into()),
    };

    match state.cadet_service.create_cadet(command).await {
        Ok(cadet) => (
            StatusCode::CREATED,
            Json(CadetResponse {
                cadet: CadetMapper::to_dto(cadet),
                success_message: "Cadet created successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response("create cadet", e),
    }
}

pub async fn get_cadet(State(state): State<AppState>, Path(cadet_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/cadets/{}", cadet_id);

    match state.cadet_service.get_cadet(&cadet_id).await {
        Ok(Some(cadet)) => (StatusCode::OK, Json(CadetMapper::to_dto(cadet))).into_response(),
        Ok(None) => {
            warn!("Cadet not found: {}", cadet_id);
            (StatusCode::NOT_FOUND, "Cadet not found").into_response()
        }
        Err(e) => error_response("get cadet", e),
    }
}

pub async fn update_cadet(
    State(state): State<AppState>,
    Path(cadet_id): Path<String>,
    Json(request): Json<UpdateCadetRequest>,
) -> impl IntoResponse {
    info!("PUT /api/cadets/{}", cadet_id);

    let command = match CadetMapper::to_update_command(request) {
        Ok(command) => command,
        Err(e) => return error_response("update cadet", e.into()),
    };

    match state.cadet_service.update_cadet(&cadet_id, command).await {
        Ok(cadet) => (
            StatusCode::OK,
            Json(CadetResponse {
                cadet: CadetMapper::to_dto(cadet),
                success_message: "Cadet updated successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response("update cadet", e),
    }
}

pub async fn delete_cadet(State(state): State<AppState>, Path(cadet_id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/cadets/{}", cadet_id);

    match state.cadet_service.delete_cadet(&cadet_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(DeleteCadetResponse {
                deleted_id: cadet_id,
                success_message: "Cadet deleted successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response("delete cadet", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etag_matching() {
        let mut headers = HeaderMap::new();
        assert!(!etag_matches(&headers, "\"1-rev-3\""));

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"1-rev-2\", \"1-rev-3\""));
        assert!(etag_matches(&headers, "\"1-rev-3\""));
        assert!(!etag_matches(&headers, "\"1-rev-4\""));

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
        assert!(etag_matches(&headers, "\"1-rev-4\""));
    }
}
