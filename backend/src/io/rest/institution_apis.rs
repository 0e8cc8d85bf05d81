//! # REST API for Institution Management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use shared::{CreateInstitutionRequest, UpdateInstitutionRequest};
use tracing::{info, warn};

use super::error_response;
use super::mappers::institution_mapper::InstitutionMapper;
use crate::AppState;

/// List all institutions with their cadet counts
pub async fn list_institutions(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/institutions");

    match state.institution_service.list_institutions().await {
        Ok(institutions) => (StatusCode::OK, Json(InstitutionMapper::to_list_response(institutions))).into_response(),
        Err(e) => error_response("list institutions", e),
    }
}

pub async fn create_institution(
    State(state): State<AppState>,
    Json(request): Json<CreateInstitutionRequest>,
) -> impl IntoResponse {
    info!("POST /api/institutions - request: {:?}", request);

    let command = InstitutionMapper::to_create_command(request);
    match state.institution_service.create_institution(command).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(InstitutionMapper::to_response(created, "Institution created successfully")),
        )
            .into_response(),
        Err(e) => error_response("create institution", e),
    }
}

pub async fn get_institution(
    State(state): State<AppState>,
    Path(institution_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/institutions/{}", institution_id);

    match state.institution_service.get_institution(&institution_id).await {
        Ok(Some(institution)) => (StatusCode::OK, Json(InstitutionMapper::to_dto(institution))).into_response(),
        Ok(None) => {
            warn!("Institution not found: {}", institution_id);
            (StatusCode::NOT_FOUND, "Institution not found").into_response()
        }
        Err(e) => error_response("get institution", e),
    }
}

/// Rename an institution or change its officer
pub async fn update_institution(
    State(state): State<AppState>,
    Path(institution_id): Path<String>,
    Json(request): Json<UpdateInstitutionRequest>,
) -> impl IntoResponse {
    info!("PUT /api/institutions/{} - request: {:?}", institution_id, request);

    let command = InstitutionMapper::to_update_command(request);
    match state
        .institution_service
        .update_institution(&institution_id, command)
        .await
    {
        Ok(updated) => (
            StatusCode::OK,
            Json(InstitutionMapper::to_response(updated, "Institution updated successfully")),
        )
            .into_response(),
        Err(e) => error_response("update institution", e),
    }
}
