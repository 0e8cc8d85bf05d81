//! Maps human-authored spreadsheet headers onto canonical field names.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::parser::RawRow;

pub const REG_NO: &str = "regNo";
pub const NAME: &str = "name";
pub const BATCH: &str = "batch";
pub const RANK: &str = "rank";
pub const GENDER: &str = "gender";
pub const DOB: &str = "dob";
pub const MOBILE: &str = "mobile";
pub const EMAIL: &str = "email";
pub const BLOOD_GROUP: &str = "bloodGroup";
pub const HOME_ADDRESS: &str = "homeAddress";
pub const NOK_NAME: &str = "nokName";
pub const NOK_RELATION: &str = "nokRelation";
pub const NOK_CONTACT: &str = "nokContact";
pub const ADHAAR: &str = "adhaar";
pub const EDUCATION: &str = "education";
pub const SPORTS_CULTURALS: &str = "sportsCulturals";

/// Sub-fields of a flattened `camp{N}_<field>` column group
pub const CAMP_FIELDS: [&str; 7] = [
    "type",
    "level",
    "location",
    "startDate",
    "endDate",
    "reward",
    "certificateUrl",
];

static SYNONYMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let table: [(&str, &[&str]); 16] = [
        (
            REG_NO,
            &[
                "regno",
                "reg no",
                "reg. no",
                "reg. no.",
                "reg_no",
                "regimental no",
                "regimental no.",
                "regimental number",
                "registration no",
                "registration number",
                "cadet reg no",
            ],
        ),
        (NAME, &["name", "cadet name", "full name", "name of the cadet"]),
        (BATCH, &["batch", "year", "batch year", "enrollment year", "enrolment year"]),
        (RANK, &["rank", "cadet rank"]),
        (GENDER, &["gender", "sex"]),
        (DOB, &["dob", "date of birth", "birth date", "d.o.b"]),
        (
            MOBILE,
            &["mobile", "mobile no", "mobile number", "phone", "phone no", "contact no"],
        ),
        (EMAIL, &["email", "e-mail", "email id", "mail id"]),
        (BLOOD_GROUP, &["bloodgroup", "blood group", "blood_group"]),
        (HOME_ADDRESS, &["homeaddress", "address", "home address", "permanent address"]),
        (NOK_NAME, &["nokname", "nok name", "next of kin", "next of kin name"]),
        (NOK_RELATION, &["nokrelation", "nok relation", "relation", "relationship"]),
        (NOK_CONTACT, &["nokcontact", "nok contact", "nok mobile", "nok phone"]),
        (ADHAAR, &["adhaar", "aadhaar", "aadhar", "adhaar no", "aadhaar no", "aadhaar number"]),
        (EDUCATION, &["education", "course", "qualification", "class"]),
        (
            SPORTS_CULTURALS,
            &["sportsculturals", "sports", "culturals", "sports/culturals", "sports & culturals"],
        ),
    ];

    table
        .iter()
        .flat_map(|(canonical, synonyms)| synonyms.iter().map(move |s| (*s, *canonical)))
        .collect()
});

/// A row keyed by canonical field names. `row_number` is the 1-based
/// spreadsheet line, counting the header row as line 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRow {
    pub row_number: usize,
    pub fields: HashMap<String, String>,
}

impl NormalizedRow {
    /// Trimmed value of a field, `None` when absent or blank
    pub fn value(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

/// Canonical name of one header; unknown headers come back trimmed but otherwise untouched
pub fn canonical_header(header: &str) -> String {
    let trimmed = header.trim();
    let key = trimmed.to_lowercase();

    if let Some(canonical) = SYNONYMS.get(key.as_str()) {
        return canonical.to_string();
    }
    if let Some(camp_field) = canonical_camp_header(&key) {
        return camp_field;
    }
    trimmed.to_string()
}

/// `Camp3_StartDate` → `camp3_startDate`
fn canonical_camp_header(key: &str) -> Option<String> {
    let rest = key.strip_prefix("camp")?;
    let (index, field) = rest.split_once('_')?;
    if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let field = CAMP_FIELDS
        .iter()
        .find(|f| f.to_lowercase() == field.replace('_', ""))?;
    let index = match index.trim_start_matches('0') {
        "" => "0",
        digits => digits,
    };
    Some(format!("camp{}_{}", index, field))
}

/// Later headers overwrite earlier ones that canonicalize to the same field,
/// except that a blank cell never replaces a filled one.
pub fn normalize_row(row_number: usize, raw: &RawRow) -> NormalizedRow {
    let mut fields: HashMap<String, String> = HashMap::with_capacity(raw.len());
    for (header, value) in raw {
        let key = canonical_header(header);
        if value.trim().is_empty()
            && fields.get(&key).is_some_and(|held| !held.trim().is_empty())
        {
            continue;
        }
        fields.insert(key, value.clone());
    }
    NormalizedRow { row_number, fields }
}
