//! Domain model for a training camp entry embedded in a cadet record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date layouts accepted for camp start/end dates
const CAMP_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CampType {
    /// Annual Training Camp
    Atc,
    /// Combined Annual Training Camp
    Catc,
    /// National Integration Camp
    Nic,
    /// Special National Integration Camp
    Snic,
    /// Thal Sainik Camp
    Tsc,
    /// Republic Day Camp
    Rdc,
    /// Ek Bharat Shreshtha Bharat
    Ebsb,
    /// Basic Leadership Camp
    Blc,
    /// Advance Leadership Camp
    Alc,
    /// Trekking expedition
    Trek,
    /// Army Attachment Camp
    Aac,
}

impl CampType {
    pub const ALL: [CampType; 11] = [
        CampType::Atc,
        CampType::Catc,
        CampType::Nic,
        CampType::Snic,
        CampType::Tsc,
        CampType::Rdc,
        CampType::Ebsb,
        CampType::Blc,
        CampType::Alc,
        CampType::Trek,
        CampType::Aac,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            CampType::Atc => "ATC",
            CampType::Catc => "CATC",
            CampType::Nic => "NIC",
            CampType::Snic => "SNIC",
            CampType::Tsc => "TSC",
            CampType::Rdc => "RDC",
            CampType::Ebsb => "EBSB",
            CampType::Blc => "BLC",
            CampType::Alc => "ALC",
            CampType::Trek => "TREK",
            CampType::Aac => "AAC",
        }
    }

    /// Look up a camp type by its code, ignoring case and surrounding whitespace
    pub fn from_code(code: &str) -> Option<Self> {
        let wanted = code.trim().to_uppercase();
        Self::ALL.into_iter().find(|t| t.code() == wanted)
    }

    /// Selection camps carry a level (group, directorate, national)
    pub fn has_level(&self) -> bool {
        matches!(self, CampType::Tsc | CampType::Rdc | CampType::Catc | CampType::Nic)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camp {
    pub camp_type: CampType,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub duration_days: u32,
    #[serde(default)]
    pub reward: Option<String>,
    #[serde(default)]
    pub certificate_url: Option<String>,
}

impl Camp {
    /// Recompute the duration from the dates and drop a level the camp type
    /// does not use. Applied on every interactive write.
    pub fn normalized(mut self) -> Self {
        self.duration_days = compute_duration_days(&self.start_date, &self.end_date);
        if !self.camp_type.has_level() {
            self.level = None;
        }
        self
    }
}

/// Parse a camp date in any of the accepted layouts
pub fn parse_camp_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    CAMP_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Inclusive day count between two dates; 0 when either date is missing,
/// malformed, or the end precedes the start
pub fn compute_duration_days(start_date: &str, end_date: &str) -> u32 {
    match (parse_camp_date(start_date), parse_camp_date(end_date)) {
        (Some(start), Some(end)) if end >= start => {
            let days = (end - start).num_days() + 1;
            u32::try_from(days).unwrap_or(0)
        }
        _ => 0,
    }
}
