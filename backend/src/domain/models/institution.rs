//! Domain model for an institution.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub id: String,
    pub name: String,
    pub officer_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Institution {
    pub fn generate_id() -> String {
        format!("institution::{}", Uuid::new_v4().simple())
    }
}

/// Maximum length of an institution or officer name
pub const MAX_INSTITUTION_NAME_LEN: usize = 120;

#[derive(Debug, thiserror::Error)]
pub enum InstitutionValidationError {
    #[error("Institution name cannot be empty")]
    EmptyName,
    #[error("Institution name cannot exceed 120 characters")]
    NameTooLong,
    #[error("Officer name cannot exceed 120 characters")]
    OfficerNameTooLong,
}
