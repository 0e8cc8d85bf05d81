//! # REST API Interface Layer
//!
//! One module of axum handlers per resource. Handlers only translate:
//! shared DTOs in, domain commands to the services, DTOs and status codes out.
//!
//! Domain errors are mapped by type rather than by message:
//! - `RecordError::NotFound` → 404
//! - `RecordError::Conflict` → 409
//! - validation errors → 400
//! - anything else → 500

pub mod cadet_apis;
pub mod camp_apis;
pub mod dashboard_apis;
pub mod export_apis;
pub mod import_apis;
pub mod institution_apis;
pub mod mappers;

pub use cadet_apis::*;
pub use camp_apis::*;
pub use dashboard_apis::*;
pub use export_apis::*;
pub use import_apis::*;
pub use institution_apis::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::domain::models::{CadetValidationError, InstitutionValidationError, RecordError};

pub(crate) fn status_for(e: &anyhow::Error) -> StatusCode {
    if let Some(record_error) = e.downcast_ref::<RecordError>() {
        return match record_error {
            RecordError::NotFound { .. } => StatusCode::NOT_FOUND,
            RecordError::Conflict(_) => StatusCode::CONFLICT,
        };
    }
    if e.downcast_ref::<CadetValidationError>().is_some()
        || e.downcast_ref::<InstitutionValidationError>().is_some()
    {
        return StatusCode::BAD_REQUEST;
    }
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Log a failed operation and turn it into a plain-text error response
pub(crate) fn error_response(action: &str, e: anyhow::Error) -> Response {
    let status = status_for(&e);
    if status.is_server_error() {
        error!("❌ Failed to {}: {:#}", action, e);
    } else {
        error!("Failed to {}: {}", action, e);
    }
    (status, e.to_string()).into_response()
}
