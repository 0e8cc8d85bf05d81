//! Export service domain logic.
//!
//! Renders an institution's cadets as CSV using the same canonical column
//! names the importer recognises, with camps flattened into `camp{i}_*`
//! column groups, so an exported file can be imported again unchanged.

use anyhow::{Context, Result};
use chrono::Utc;
use shared::ExportDataResponse;
use tracing::{error, info};

use crate::domain::import::header_normalizer::{self as fields, CAMP_FIELDS};
use crate::domain::models::{Cadet, Camp, RecordError};
use crate::storage::{CadetStorage, Connection, InstitutionStorage};

const CADET_COLUMNS: [&str; 16] = [
    fields::REG_NO,
    fields::NAME,
    fields::BATCH,
    fields::RANK,
    fields::GENDER,
    fields::DOB,
    fields::MOBILE,
    fields::EMAIL,
    fields::BLOOD_GROUP,
    fields::HOME_ADDRESS,
    fields::NOK_NAME,
    fields::NOK_RELATION,
    fields::NOK_CONTACT,
    fields::ADHAAR,
    fields::EDUCATION,
    fields::SPORTS_CULTURALS,
];

/// Export service that handles all export-related business logic
#[derive(Clone)]
pub struct ExportService<C: Connection> {
    institutions: C::InstitutionRepository,
    cadets: C::CadetRepository,
}

impl<C: Connection> ExportService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            institutions: connection.create_institution_repository(),
            cadets: connection.create_cadet_repository(),
        }
    }

    pub async fn export_cadets_csv(&self, institution_id: &str) -> Result<ExportDataResponse> {
        info!("📄 EXPORT: Exporting cadets as CSV for institution {}", institution_id);

        let institution = match self.institutions.get_institution(institution_id).await? {
            Some(institution) => institution,
            None => {
                error!("❌ EXPORT: Institution not found: {}", institution_id);
                return Err(RecordError::institution_not_found(institution_id).into());
            }
        };

        let mut cadets = self.cadets.list_cadets(institution_id).await?;
        cadets.sort_by(|a, b| Cadet::reg_no_key(&a.reg_no).cmp(&Cadet::reg_no_key(&b.reg_no)));

        let csv_content = render_csv(&cadets).context("Failed to render cadet CSV")?;

        let filename = format!(
            "{}_cadets_{}.csv",
            institution
                .name
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("_")
                .to_lowercase(),
            Utc::now().format("%Y%m%d")
        );

        info!("✅ EXPORT: {} cadets exported as {}", cadets.len(), filename);
        Ok(ExportDataResponse {
            csv_content,
            filename,
            cadet_count: cadets.len(),
        })
    }
}

fn render_csv(cadets: &[Cadet]) -> Result<String> {
    let camp_groups = cadets.iter().map(|c| c.camps.len()).max().unwrap_or(0);

    let mut header: Vec<String> = CADET_COLUMNS.iter().map(|c| c.to_string()).collect();
    for index in 1..=camp_groups {
        header.extend(CAMP_FIELDS.iter().map(|f| format!("camp{}_{}", index, f)));
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&header)?;

    for cadet in cadets {
        let d = &cadet.details;
        let mut record: Vec<String> = vec![
            cadet.reg_no.clone(),
            cadet.name.clone(),
            cadet.batch.to_string(),
            cadet.rank.code().to_string(),
            d.gender.clone(),
            d.dob.clone(),
            d.mobile.clone(),
            d.email.clone(),
            d.blood_group.clone(),
            d.home_address.clone(),
            d.nok_name.clone(),
            d.nok_relation.clone(),
            d.nok_contact.clone(),
            d.adhaar.clone(),
            d.education.clone(),
            d.sports_culturals.clone(),
        ];
        for index in 0..camp_groups {
            match cadet.camps.get(index) {
                Some(camp) => record.extend(camp_cells(camp)),
                None => record.extend(std::iter::repeat(String::new()).take(CAMP_FIELDS.len())),
            }
        }
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Cells in `CAMP_FIELDS` order
fn camp_cells(camp: &Camp) -> [String; 7] {
    [
        camp.camp_type.code().to_string(),
        camp.level.clone().unwrap_or_default(),
        camp.location.clone(),
        camp.start_date.clone(),
        camp.end_date.clone(),
        camp.reward.clone().unwrap_or_default(),
        camp.certificate_url.clone().unwrap_or_default(),
    ]
}
