use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An institution (college or school unit) that owns a set of cadets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    /// Stable identifier in format: "institution::<uuid>"
    pub id: String,
    pub name: String,
    /// Name of the officer responsible for the unit at this institution
    pub officer_name: String,
    /// Computed on read from the cadet store, never persisted
    pub cadet_count: usize,
    pub created_at: String, // RFC 3339 timestamp
    pub updated_at: String, // RFC 3339 timestamp
}

/// Request for creating a new institution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateInstitutionRequest {
    pub name: String,
    pub officer_name: String,
}

/// Request for updating (or renaming) an existing institution
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateInstitutionRequest {
    pub name: Option<String>,
    pub officer_name: Option<String>,
}

/// Response after creating or updating an institution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstitutionResponse {
    pub institution: Institution,
    pub success_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstitutionListResponse {
    pub institutions: Vec<Institution>,
}

/// A training camp a cadet attended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camp {
    /// Camp type code, e.g. "ATC", "CATC", "RDC"
    pub camp_type: String,
    /// Selection level, only meaningful for some camp types
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_date: String, // YYYY-MM-DD
    #[serde(default)]
    pub end_date: String, // YYYY-MM-DD
    /// Derived from the dates; 0 when dates are missing or inverted
    #[serde(default)]
    pub duration_days: u32,
    #[serde(default)]
    pub reward: Option<String>,
    #[serde(default)]
    pub certificate_url: Option<String>,
}

/// A certificate examination passed by a cadet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    /// One of "A Certificate", "B Certificate", "C Certificate"
    pub certificate_type: String,
    pub grade: String,
    pub year: i32,
}

/// Personal, contact and demographic details of a cadet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadetDetails {
    pub gender: String,
    pub dob: String,
    pub mobile: String,
    pub email: String,
    pub blood_group: String,
    pub home_address: String,
    pub nok_name: String,
    pub nok_relation: String,
    pub nok_contact: String,
    pub adhaar: String,
    pub education: String,
    pub sports_culturals: String,
}

/// A cadet enrolled under an institution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cadet {
    /// Identifier in format: "cadet::<uuid>"
    pub id: String,
    pub institution_id: String,
    /// Registration number, unique within the institution
    pub reg_no: String,
    pub name: String,
    /// Rank code, e.g. "CDT", "SGT", "SUO"
    pub rank: String,
    /// Enrollment year
    pub batch: i32,
    /// Auto-assigned division code ("SD", "SW", "JD", "JW")
    pub division: Option<String>,
    #[serde(flatten)]
    pub details: CadetDetails,
    pub camps: Vec<Camp>,
    pub certificates: Vec<Certificate>,
    pub created_at: String, // RFC 3339 timestamp
    pub updated_at: String, // RFC 3339 timestamp
}

/// Request for creating a cadet inside an institution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateCadetRequest {
    pub reg_no: String,
    pub name: String,
    #[serde(default)]
    pub rank: Option<String>,
    pub batch: i32,
    #[serde(flatten)]
    pub details: CadetDetails,
    #[serde(default)]
    pub camps: Vec<Camp>,
    #[serde(default)]
    pub certificates: Vec<Certificate>,
}

/// Request for updating a cadet; camps and certificates replace the
/// stored lists when present
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateCadetRequest {
    pub reg_no: Option<String>,
    pub name: Option<String>,
    pub rank: Option<String>,
    pub batch: Option<i32>,
    pub details: Option<CadetDetails>,
    pub camps: Option<Vec<Camp>>,
    pub certificates: Option<Vec<Certificate>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CadetResponse {
    pub cadet: Cadet,
    pub success_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteCadetResponse {
    pub deleted_id: String,
    pub success_message: String,
}

/// Filters and pagination for listing the cadets of an institution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CadetListRequest {
    /// Case-insensitive match against name or registration number
    pub search: Option<String>,
    pub rank: Option<String>,
    pub batch: Option<i32>,
    pub division: Option<String>,
    /// Cursor for pagination - cadet ID to start after
    pub after: Option<String>,
    /// Maximum number of cadets to return
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadetListResponse {
    pub cadets: Vec<Cadet>,
    pub pagination: PaginationInfo,
    /// Number of cadets matching the filters, across all pages
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionCount {
    pub institution_id: String,
    pub name: String,
    pub cadet_count: usize,
}

/// Aggregate counts shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_institutions: usize,
    pub total_cadets: usize,
    pub total_camps: usize,
    pub total_certificates: usize,
    pub cadets_per_institution: Vec<InstitutionCount>,
    pub cadets_per_rank: BTreeMap<String, usize>,
    pub cadets_per_batch: BTreeMap<i32, usize>,
    pub cadets_per_division: BTreeMap<String, usize>,
    pub camps_per_type: BTreeMap<String, usize>,
    pub certificates_per_type: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampDurationResponse {
    pub start_date: String,
    pub end_date: String,
    pub duration_days: u32,
}

/// Request to import a remotely hosted CSV file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportUrlRequest {
    pub url: String,
}

/// A row left out of an import, numbered from 1 for the first data row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedRow {
    pub row_number: usize,
    pub reason: String,
}

/// What an import did besides the written count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub inserted: usize,
    pub updated: usize,
    pub dropped_rows: Vec<DroppedRow>,
    /// Rows whose batch year was replaced by the current year
    pub batch_defaulted: usize,
    /// Rows whose missing or unknown rank was replaced by the default rank
    pub rank_defaulted: usize,
    /// Registration numbers that appeared more than once in the file
    pub duplicate_reg_nos: Vec<String>,
    pub unknown_camp_types: usize,
    /// Camp column groups past the configured maximum index
    pub camps_beyond_limit: usize,
}

/// Result of an import: `{ success, count?, error? }` plus an optional summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ImportSummary>,
}

impl ImportResult {
    pub fn succeeded(count: usize, summary: ImportSummary) -> Self {
        Self {
            success: true,
            count: Some(count),
            error: None,
            summary: Some(summary),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            count: None,
            error: Some(error.into()),
            summary: None,
        }
    }
}

/// Exported cadet data for one institution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDataResponse {
    pub csv_content: String,
    pub filename: String,
    pub cadet_count: usize,
}
