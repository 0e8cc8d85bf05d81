pub mod cadet;
pub mod camp;
pub mod certificate;
pub mod institution;

pub use cadet::{Cadet, CadetValidationError, Division, PersonalDetails, Rank};
pub use camp::{Camp, CampType};
pub use certificate::{Certificate, CertificateType};
pub use institution::{Institution, InstitutionValidationError};

/// Lookup and uniqueness failures shared by all services
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("{0}")]
    Conflict(String),
}

impl RecordError {
    pub fn institution_not_found(id: &str) -> Self {
        RecordError::NotFound {
            kind: "Institution",
            id: id.to_string(),
        }
    }

    pub fn cadet_not_found(id: &str) -> Self {
        RecordError::NotFound {
            kind: "Cadet",
            id: id.to_string(),
        }
    }
}
