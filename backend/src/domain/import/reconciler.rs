//! Upsert planning: decides, per valid row, whether it updates an existing
//! cadet or inserts a new one.
//!
//! The snapshot of the institution's cadets is taken once before planning.
//! Rows are matched on the registration number (trimmed, case-insensitive);
//! when the same number shows up again later in the file, the later row
//! replaces the earlier planned write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{DroppedRow, ImportSummary};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::camp_reconstructor::{self, ReconstructedCamps};
use super::header_normalizer::{self as fields, NormalizedRow};
use super::row_validator;
use crate::domain::models::cadet::BATCH_YEAR_RANGE;
use crate::domain::models::{Cadet, PersonalDetails, Rank};
use crate::storage::BatchWrite;

/// What to do with a row whose batch year is not a number in `BATCH_YEAR_RANGE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchFallback {
    /// Substitute the current calendar year
    #[default]
    CurrentYear,
    /// Drop the row
    RejectRow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportPolicy {
    pub max_camp_index: u32,
    pub batch_fallback: BatchFallback,
    pub default_rank: Rank,
}

impl Default for ImportPolicy {
    fn default() -> Self {
        Self {
            max_camp_index: 10,
            batch_fallback: BatchFallback::CurrentYear,
            default_rank: Rank::Cadet,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpsertPlan {
    pub writes: Vec<BatchWrite>,
    pub summary: ImportSummary,
}

impl UpsertPlan {
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

pub fn plan(
    institution_id: &str,
    snapshot: Vec<Cadet>,
    rows: &[NormalizedRow],
    policy: &ImportPolicy,
    current_year: i32,
    now: DateTime<Utc>,
) -> UpsertPlan {
    let existing: HashMap<String, Cadet> = snapshot
        .into_iter()
        .map(|c| (Cadet::reg_no_key(&c.reg_no), c))
        .collect();

    let mut writes: Vec<BatchWrite> = Vec::new();
    let mut planned: HashMap<String, usize> = HashMap::new();
    let mut summary = ImportSummary {
        rows_read: rows.len(),
        ..Default::default()
    };

    for row in rows {
        if let Some(field) = row_validator::missing_required_field(row) {
            summary.dropped_rows.push(DroppedRow {
                row_number: row.row_number,
                reason: format!("missing required field {}", field),
            });
            continue;
        }
        // Required fields are present past this point
        let reg_no = row.value(fields::REG_NO).unwrap_or_default().to_string();
        let name = row.value(fields::NAME).unwrap_or_default().to_string();
        let raw_batch = row.value(fields::BATCH).unwrap_or_default();

        let batch = match parse_batch(raw_batch) {
            Some(batch) => batch,
            None => match policy.batch_fallback {
                BatchFallback::CurrentYear => {
                    debug!(
                        "Row {}: batch '{}' replaced by {}",
                        row.row_number, raw_batch, current_year
                    );
                    summary.batch_defaulted += 1;
                    current_year
                }
                BatchFallback::RejectRow => {
                    summary.dropped_rows.push(DroppedRow {
                        row_number: row.row_number,
                        reason: format!("invalid batch year '{}'", raw_batch),
                    });
                    continue;
                }
            },
        };

        let camps = camp_reconstructor::reconstruct(row, policy.max_camp_index);
        summary.unknown_camp_types += camps.unknown_types.len();
        summary.camps_beyond_limit += camps.beyond_limit.len();

        let key = Cadet::reg_no_key(&reg_no);
        let rank = row.value(fields::RANK).and_then(Rank::parse);
        let incoming = IncomingRow {
            row,
            reg_no,
            name,
            batch,
            rank,
            camps,
        };

        let write = match existing.get(&key) {
            Some(stored) => BatchWrite::Update(incoming.apply_to(stored, now)),
            None => {
                if incoming.rank.is_none() {
                    summary.rank_defaulted += 1;
                }
                // A repeated number inside the file keeps the id of its first insert
                let id = planned
                    .get(&key)
                    .map(|&i| writes[i].cadet().id.clone())
                    .unwrap_or_else(Cadet::generate_id);
                BatchWrite::Insert(incoming.into_new_cadet(id, institution_id, policy, now))
            }
        };

        match planned.get(&key) {
            Some(&index) => {
                if !summary.duplicate_reg_nos.contains(&key) {
                    summary.duplicate_reg_nos.push(key.clone());
                }
                warn!(
                    "Row {}: registration number {} repeated, later row wins",
                    row.row_number, key
                );
                writes[index] = write;
            }
            None => {
                planned.insert(key, writes.len());
                writes.push(write);
            }
        }
    }

    summary.inserted = writes.iter().filter(|w| w.is_insert()).count();
    summary.updated = writes.len() - summary.inserted;
    UpsertPlan { writes, summary }
}

fn parse_batch(value: &str) -> Option<i32> {
    value
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|year| BATCH_YEAR_RANGE.contains(year))
}

struct IncomingRow<'a> {
    row: &'a NormalizedRow,
    reg_no: String,
    name: String,
    batch: i32,
    rank: Option<Rank>,
    camps: ReconstructedCamps,
}

impl IncomingRow<'_> {
    fn into_new_cadet(self, id: String, institution_id: &str, policy: &ImportPolicy, now: DateTime<Utc>) -> Cadet {
        let mut details = PersonalDetails::default();
        overwrite_details(&mut details, self.row);

        let mut cadet = Cadet {
            id,
            institution_id: institution_id.to_string(),
            reg_no: self.reg_no,
            name: self.name,
            rank: self.rank.unwrap_or(policy.default_rank),
            batch: self.batch,
            division: None,
            details,
            camps: self.camps.camps,
            certificates: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        cadet.reassign_division();
        cadet
    }

    /// Columns present in the row overwrite; everything else is kept.
    fn apply_to(self, stored: &Cadet, now: DateTime<Utc>) -> Cadet {
        let mut cadet = stored.clone();
        cadet.reg_no = self.reg_no;
        cadet.name = self.name;
        cadet.batch = self.batch;
        if let Some(rank) = self.rank {
            cadet.rank = rank;
        }
        overwrite_details(&mut cadet.details, self.row);
        if self.camps.has_camp_columns {
            cadet.camps = self.camps.camps;
        }
        cadet.reassign_division();

        if !cadet.same_content(stored) {
            cadet.updated_at = now;
        }
        cadet
    }
}

fn overwrite_details(details: &mut PersonalDetails, row: &NormalizedRow) {
    let targets: [(&str, &mut String); 12] = [
        (fields::GENDER, &mut details.gender),
        (fields::DOB, &mut details.dob),
        (fields::MOBILE, &mut details.mobile),
        (fields::EMAIL, &mut details.email),
        (fields::BLOOD_GROUP, &mut details.blood_group),
        (fields::HOME_ADDRESS, &mut details.home_address),
        (fields::NOK_NAME, &mut details.nok_name),
        (fields::NOK_RELATION, &mut details.nok_relation),
        (fields::NOK_CONTACT, &mut details.nok_contact),
        (fields::ADHAAR, &mut details.adhaar),
        (fields::EDUCATION, &mut details.education),
        (fields::SPORTS_CULTURALS, &mut details.sports_culturals),
    ];
    for (field, target) in targets {
        if let Some(value) = row.fields.get(field) {
            *target = value.trim().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CampType, Certificate, CertificateType, Division};
    use crate::storage::file::test_utils::sample_cadet;

    const INSTITUTION: &str = "institution::a";

    fn row(number: usize, fields: &[(&str, &str)]) -> NormalizedRow {
        NormalizedRow {
            row_number: number,
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn plan_rows(snapshot: Vec<Cadet>, rows: &[NormalizedRow]) -> UpsertPlan {
        plan(INSTITUTION, snapshot, rows, &ImportPolicy::default(), 2026, Utc::now())
    }

    #[test]
    fn test_matching_reg_no_becomes_an_update() {
        let stored = sample_cadet(INSTITUTION, "TN21SDA123456", "Arun");
        let rows = [row(2, &[("regNo", "tn21sda123456 "), ("name", "Arun Kumar"), ("batch", "2021")])];

        let plan = plan_rows(vec![stored.clone()], &rows);

        assert_eq!(plan.writes.len(), 1);
        match &plan.writes[0] {
            BatchWrite::Update(cadet) => {
                assert_eq!(cadet.id, stored.id);
                assert_eq!(cadet.name, "Arun Kumar");
                assert_eq!(cadet.batch, 2021);
                assert_eq!(cadet.created_at, stored.created_at);
            }
            other => panic!("expected update, got {:?}", other),
        }
        assert_eq!(plan.summary.updated, 1);
        assert_eq!(plan.summary.inserted, 0);
    }

    #[test]
    fn test_new_reg_no_becomes_an_insert() {
        let rows = [row(
            2,
            &[
                ("regNo", "TN22SWA000001"),
                ("name", "Divya"),
                ("batch", "2022"),
                ("bloodGroup", "O+"),
                ("camp1_type", "ATC"),
                ("camp1_location", "Trichy"),
            ],
        )];

        let plan = plan_rows(Vec::new(), &rows);

        let BatchWrite::Insert(cadet) = &plan.writes[0] else {
            panic!("expected insert");
        };
        assert_eq!(cadet.institution_id, INSTITUTION);
        assert_eq!(cadet.rank, Rank::Cadet);
        assert_eq!(cadet.division, Some(Division::SeniorWing));
        assert_eq!(cadet.details.blood_group, "O+");
        assert_eq!(cadet.camps.len(), 1);
        assert_eq!(cadet.camps[0].camp_type, CampType::Atc);
        assert_eq!(plan.summary.rank_defaulted, 1);
    }

    #[test]
    fn test_non_numeric_batch_uses_current_year() {
        let rows = [row(2, &[("regNo", "R1"), ("name", "Arun"), ("batch", "abc")])];
        let plan = plan_rows(Vec::new(), &rows);

        assert_eq!(plan.writes[0].cadet().batch, 2026);
        assert_eq!(plan.summary.batch_defaulted, 1);
    }

    #[test]
    fn test_out_of_range_batch_uses_current_year() {
        let rows = [
            row(2, &[("regNo", "R1"), ("name", "Arun"), ("batch", "1800")]),
            row(3, &[("regNo", "R2"), ("name", "Bala"), ("batch", "1950")]),
        ];
        let plan = plan_rows(Vec::new(), &rows);

        assert_eq!(plan.writes[0].cadet().batch, 2026);
        assert_eq!(plan.writes[1].cadet().batch, 1950);
        assert_eq!(plan.summary.batch_defaulted, 1);
    }

    #[test]
    fn test_reject_row_batch_policy() {
        let rows = [
            row(2, &[("regNo", "R1"), ("name", "Arun"), ("batch", "abc")]),
            row(3, &[("regNo", "R2"), ("name", "Bala"), ("batch", "1800")]),
            row(4, &[("regNo", "R3"), ("name", "Chitra"), ("batch", "2023")]),
        ];
        let policy = ImportPolicy {
            batch_fallback: BatchFallback::RejectRow,
            ..Default::default()
        };
        let plan = plan(INSTITUTION, Vec::new(), &rows, &policy, 2026, Utc::now());

        assert_eq!(plan.writes.len(), 1);
        let dropped: Vec<usize> = plan.summary.dropped_rows.iter().map(|d| d.row_number).collect();
        assert_eq!(dropped, vec![2, 3]);
        assert_eq!(plan.summary.batch_defaulted, 0);
    }

    #[test]
    fn test_invalid_rows_are_dropped() {
        let rows = [
            row(2, &[("regNo", "R1"), ("name", "Arun"), ("batch", "2021")]),
            row(3, &[("regNo", ""), ("name", "Nobody"), ("batch", "2021")]),
            row(4, &[("regNo", "R2"), ("batch", "2021")]),
        ];
        let plan = plan_rows(Vec::new(), &rows);

        assert_eq!(plan.writes.len(), 1);
        assert_eq!(plan.summary.rows_read, 3);
        assert_eq!(plan.summary.dropped_rows.len(), 2);
        assert_eq!(plan.summary.dropped_rows[0].reason, "missing required field regNo");
        assert_eq!(plan.summary.dropped_rows[1].reason, "missing required field name");
    }

    #[test]
    fn test_repeated_reg_no_last_row_wins() {
        let rows = [
            row(2, &[("regNo", "TN21SDA123456"), ("name", "First"), ("batch", "2021")]),
            row(3, &[("regNo", "R9"), ("name", "Other"), ("batch", "2021")]),
            row(4, &[("regNo", "tn21sda123456"), ("name", "Second"), ("batch", "2021")]),
        ];
        let plan = plan_rows(Vec::new(), &rows);

        assert_eq!(plan.writes.len(), 2);
        assert_eq!(plan.writes[0].cadet().name, "Second");
        assert_eq!(plan.summary.duplicate_reg_nos, vec!["TN21SDA123456".to_string()]);
        assert_eq!(plan.summary.inserted, 2);
    }

    #[test]
    fn test_update_keeps_rank_certificates_and_camps() {
        let mut stored = sample_cadet(INSTITUTION, "R1", "Arun");
        stored.rank = Rank::Sergeant;
        stored.details.mobile = "9876543210".to_string();
        stored.certificates = vec![Certificate {
            certificate_type: CertificateType::B,
            grade: "A".to_string(),
            year: 2023,
        }];
        stored.camps = camp_reconstructor::reconstruct(&row(1, &[("camp1_type", "NIC")]), 10).camps;

        let rows = [row(2, &[("regNo", "R1"), ("name", "Arun"), ("batch", "2022"), ("email", "arun@example.com")])];
        let plan = plan_rows(vec![stored.clone()], &rows);
        let cadet = plan.writes[0].cadet();

        assert_eq!(cadet.rank, Rank::Sergeant);
        assert_eq!(cadet.certificates, stored.certificates);
        assert_eq!(cadet.camps, stored.camps);
        assert_eq!(cadet.details.mobile, "9876543210");
        assert_eq!(cadet.details.email, "arun@example.com");
        assert_eq!(plan.summary.rank_defaulted, 0);
    }

    #[test]
    fn test_unchanged_update_keeps_timestamp() {
        let stored = sample_cadet(INSTITUTION, "R1", "Arun");
        let rows = [row(2, &[("regNo", "R1"), ("name", "Arun"), ("batch", "2022")])];

        let later = stored.updated_at + chrono::Duration::hours(1);
        let plan = plan(INSTITUTION, vec![stored.clone()], &rows, &ImportPolicy::default(), 2026, later);

        assert_eq!(plan.writes[0].cadet(), &stored);
    }

    #[test]
    fn test_camp_counters() {
        let rows = [row(
            2,
            &[
                ("regNo", "R1"),
                ("name", "Arun"),
                ("batch", "2022"),
                ("camp1_type", "XYZ"),
                ("camp11_type", "ATC"),
            ],
        )];
        let plan = plan_rows(Vec::new(), &rows);
        assert_eq!(plan.summary.unknown_camp_types, 1);
        assert_eq!(plan.summary.camps_beyond_limit, 1);
        assert!(plan.writes[0].cadet().camps.is_empty());
    }
}
