//! # REST API for Spreadsheet Import
//!
//! Both endpoints answer with the import result contract
//! `{ success, count?, error?, summary? }`, including on failure.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use shared::{ImportResult, ImportUrlRequest};
use tracing::{error, info, warn};

use crate::domain::import::{ImportError, ImportOutcome, ImportSource, SpreadsheetFormat};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ImportFileParams {
    /// `csv`, `xlsx` or `xls`
    pub format: Option<String>,
    /// Original file name; its extension is used when `format` is absent
    pub filename: Option<String>,
}

fn import_error_status(e: &ImportError) -> StatusCode {
    match e {
        ImportError::UnknownInstitution(_) => StatusCode::NOT_FOUND,
        ImportError::SourceAcquisition(_) | ImportError::Parse(_) | ImportError::Schema { .. } => {
            StatusCode::BAD_REQUEST
        }
        ImportError::Snapshot(_) | ImportError::Commit(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn import_response(institution_id: &str, result: Result<ImportOutcome, ImportError>) -> Response {
    match result {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ImportResult::succeeded(outcome.count, outcome.summary)),
        )
            .into_response(),
        Err(e) => {
            let status = import_error_status(&e);
            if status.is_server_error() {
                error!("❌ Import into {} failed: {}", institution_id, e);
            } else {
                warn!("Import into {} rejected: {}", institution_id, e);
            }
            (status, Json(ImportResult::failed(e.to_string()))).into_response()
        }
    }
}

/// Import an uploaded spreadsheet sent as the raw request body
pub async fn import_file(
    State(state): State<AppState>,
    Path(institution_id): Path<String>,
    Query(params): Query<ImportFileParams>,
    body: Bytes,
) -> impl IntoResponse {
    info!(
        "POST /api/institutions/{}/import/file - {:?} ({} bytes)",
        institution_id,
        params,
        body.len()
    );

    let format = params
        .format
        .as_deref()
        .or(params.filename.as_deref())
        .and_then(SpreadsheetFormat::detect);
    let Some(format) = format else {
        warn!("Import into {} rejected: unknown file format", institution_id);
        return (
            StatusCode::BAD_REQUEST,
            Json(ImportResult::failed("Unsupported file format; expected csv, xlsx or xls")),
        )
            .into_response();
    };

    let source = ImportSource::File {
        format,
        bytes: body.to_vec(),
    };
    let result = state.import_service.import(&institution_id, source).await;
    import_response(&institution_id, result)
}

/// Import a remotely hosted CSV file
pub async fn import_url(
    State(state): State<AppState>,
    Path(institution_id): Path<String>,
    Json(request): Json<ImportUrlRequest>,
) -> impl IntoResponse {
    info!("POST /api/institutions/{}/import/url - {}", institution_id, request.url);

    let result = state
        .import_service
        .import(&institution_id, ImportSource::Url(request.url))
        .await;
    import_response(&institution_id, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_status() {
        assert_eq!(
            import_error_status(&ImportError::UnknownInstitution("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            import_error_status(&ImportError::Schema { missing: vec!["regNo".into()] }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            import_error_status(&ImportError::Commit("disk full".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
