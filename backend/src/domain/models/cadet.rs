//! Domain model for a cadet and the enumerations attached to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::camp::Camp;
use super::certificate::Certificate;

/// Enrollment years accepted for the batch field
pub const BATCH_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1950..=2100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Rank {
    #[default]
    #[serde(rename = "CDT")]
    Cadet,
    #[serde(rename = "LCPL")]
    LanceCorporal,
    #[serde(rename = "CPL")]
    Corporal,
    #[serde(rename = "SGT")]
    Sergeant,
    #[serde(rename = "CQMS")]
    CompanyQuarterMasterSergeant,
    #[serde(rename = "CSM")]
    CompanySergeantMajor,
    #[serde(rename = "SUO")]
    SeniorUnderOfficer,
}

impl Rank {
    pub const ALL: [Rank; 7] = [
        Rank::Cadet,
        Rank::LanceCorporal,
        Rank::Corporal,
        Rank::Sergeant,
        Rank::CompanyQuarterMasterSergeant,
        Rank::CompanySergeantMajor,
        Rank::SeniorUnderOfficer,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Rank::Cadet => "CDT",
            Rank::LanceCorporal => "LCPL",
            Rank::Corporal => "CPL",
            Rank::Sergeant => "SGT",
            Rank::CompanyQuarterMasterSergeant => "CQMS",
            Rank::CompanySergeantMajor => "CSM",
            Rank::SeniorUnderOfficer => "SUO",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Rank::Cadet => "Cadet",
            Rank::LanceCorporal => "Lance Corporal",
            Rank::Corporal => "Corporal",
            Rank::Sergeant => "Sergeant",
            Rank::CompanyQuarterMasterSergeant => "Company Quarter Master Sergeant",
            Rank::CompanySergeantMajor => "Company Sergeant Major",
            Rank::SeniorUnderOfficer => "Senior Under Officer",
        }
    }

    /// Match either the code ("SGT") or the title ("Sergeant"), ignoring case
    /// and dots ("L.Cpl")
    pub fn parse(value: &str) -> Option<Self> {
        let wanted: String = value
            .trim()
            .chars()
            .filter(|c| *c != '.')
            .collect::<String>()
            .to_uppercase();
        if wanted.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|rank| rank.code() == wanted || rank.title().to_uppercase() == wanted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Division {
    #[serde(rename = "SD")]
    SeniorDivision,
    #[serde(rename = "SW")]
    SeniorWing,
    #[serde(rename = "JD")]
    JuniorDivision,
    #[serde(rename = "JW")]
    JuniorWing,
}

impl Division {
    pub fn code(&self) -> &'static str {
        match self {
            Division::SeniorDivision => "SD",
            Division::SeniorWing => "SW",
            Division::JuniorDivision => "JD",
            Division::JuniorWing => "JW",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "SD" => Some(Division::SeniorDivision),
            "SW" => Some(Division::SeniorWing),
            "JD" => Some(Division::JuniorDivision),
            "JW" => Some(Division::JuniorWing),
            _ => None,
        }
    }

    /// Registration numbers look like `TN21SDA123456`: two letters of state,
    /// two digits of year, then the division code.
    pub fn from_reg_no(reg_no: &str) -> Option<Self> {
        let compact: Vec<char> = reg_no
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        if compact.len() < 6 {
            return None;
        }
        let state_ok = compact[..2].iter().all(|c| c.is_ascii_alphabetic());
        let year_ok = compact[2..4].iter().all(|c| c.is_ascii_digit());
        if !state_ok || !year_ok {
            return None;
        }
        let code: String = compact[4..6].iter().collect();
        Self::from_code(&code)
    }

    /// Auto-assign a division: the registration number wins, gender is the fallback
    pub fn assign(reg_no: &str, gender: &str) -> Option<Self> {
        Self::from_reg_no(reg_no).or_else(|| match gender.trim().to_lowercase().as_str() {
            "m" | "male" | "boy" => Some(Division::SeniorDivision),
            "f" | "female" | "girl" => Some(Division::SeniorWing),
            _ => None,
        })
    }
}

/// Personal, contact and demographic fields of a cadet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalDetails {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cadet {
    pub id: String,
    /// Stable institution identifier; renaming an institution never touches it
    pub institution_id: String,
    pub reg_no: String,
    pub name: String,
    pub rank: Rank,
    pub batch: i32,
    pub division: Option<Division>,
    #[serde(default)]
    pub details: PersonalDetails,
    #[serde(default)]
    pub camps: Vec<Camp>,
    #[serde(default)]
    pub certificates: Vec<Certificate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cadet {
    pub fn generate_id() -> String {
        format!("cadet::{}", Uuid::new_v4().simple())
    }

    /// Key used to match registration numbers across imports and forms
    pub fn reg_no_key(reg_no: &str) -> String {
        reg_no.trim().to_uppercase()
    }

    pub fn reassign_division(&mut self) {
        self.division = Division::assign(&self.reg_no, &self.details.gender);
    }

    /// True when both records hold the same data, timestamps aside
    pub fn same_content(&self, other: &Cadet) -> bool {
        let mut this = self.clone();
        this.created_at = other.created_at;
        this.updated_at = other.updated_at;
        this == *other
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CadetValidationError {
    #[error("Registration number cannot be empty")]
    EmptyRegNo,
    #[error("Registration number cannot exceed 32 characters")]
    RegNoTooLong,
    #[error("Cadet name cannot be empty")]
    EmptyName,
    #[error("Cadet name cannot exceed 100 characters")]
    NameTooLong,
    #[error("Batch year {0} is out of range")]
    BatchOutOfRange(i32),
    #[error("Unknown rank: {0}")]
    UnknownRank(String),
    #[error("Unknown division: {0}")]
    UnknownDivision(String),
    #[error("Unknown camp type: {0}")]
    UnknownCampType(String),
    #[error("Unknown certificate type: {0}")]
    UnknownCertificateType(String),
    #[error("Certificate year {0} is out of range")]
    CertificateYearOutOfRange(i32),
    #[error("Unknown pagination cursor: {0}")]
    UnknownCursor(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_parse_accepts_codes_and_titles() {
        assert_eq!(Rank::parse("SGT"), Some(Rank::Sergeant));
        assert_eq!(Rank::parse("sergeant"), Some(Rank::Sergeant));
        assert_eq!(Rank::parse("L.Cpl"), Some(Rank::LanceCorporal));
        assert_eq!(Rank::parse(" suo "), Some(Rank::SeniorUnderOfficer));
        assert_eq!(Rank::parse("General"), None);
        assert_eq!(Rank::parse(""), None);
    }

    #[test]
    fn test_rank_defaults_to_cadet() {
        assert_eq!(Rank::default(), Rank::Cadet);
        assert_eq!(Rank::default().code(), "CDT");
    }

    #[test]
    fn test_division_from_reg_no() {
        assert_eq!(Division::from_reg_no("TN21SDA123456"), Some(Division::SeniorDivision));
        assert_eq!(Division::from_reg_no("tn/22/sw/a/654321"), Some(Division::SeniorWing));
        assert_eq!(Division::from_reg_no("123456"), None);
        assert_eq!(Division::from_reg_no("TN21XXA1"), None);
    }

    #[test]
    fn test_division_falls_back_to_gender() {
        assert_eq!(Division::assign("12345", "Female"), Some(Division::SeniorWing));
        assert_eq!(Division::assign("12345", "M"), Some(Division::SeniorDivision));
        assert_eq!(Division::assign("12345", ""), None);
        assert_eq!(Division::assign("TN21JWA1", "Male"), Some(Division::JuniorWing));
    }

    #[test]
    fn test_same_content_ignores_timestamps() {
        let now = Utc::now();
        let cadet = Cadet {
            id: Cadet::generate_id(),
            institution_id: "institution::1".to_string(),
            reg_no: "TN21SDA123456".to_string(),
            name: "Arun".to_string(),
            rank: Rank::Cadet,
            batch: 2021,
            division: Some(Division::SeniorDivision),
            details: PersonalDetails::default(),
            camps: Vec::new(),
            certificates: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let mut later = cadet.clone();
        later.updated_at = now + chrono::Duration::seconds(30);
        assert!(cadet.same_content(&later));

        later.name = "Arun Kumar".to_string();
        assert!(!cadet.same_content(&later));
    }
}
