use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::commands::cadets::{
    CadetListQuery, CadetListResult, CreateCadetCommand, PaginationInfo, UpdateCadetCommand,
};
use crate::domain::listing_revisions::ListingRevisions;
use crate::domain::models::cadet::BATCH_YEAR_RANGE;
use crate::domain::models::{Cadet, CadetValidationError, Camp, Certificate, RecordError};
use crate::storage::{CadetStorage, Connection, InstitutionStorage};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 500;

const MAX_REG_NO_LEN: usize = 32;
const MAX_CADET_NAME_LEN: usize = 100;

/// Interactive create/read/update/delete of individual cadets
#[derive(Clone)]
pub struct CadetService<C: Connection> {
    institutions: C::InstitutionRepository,
    cadets: C::CadetRepository,
    revisions: ListingRevisions,
}

impl<C: Connection> CadetService<C> {
    pub fn new(connection: &C, revisions: ListingRevisions) -> Self {
        Self {
            institutions: connection.create_institution_repository(),
            cadets: connection.create_cadet_repository(),
            revisions,
        }
    }

    pub async fn create_cadet(&self, command: CreateCadetCommand) -> Result<Cadet> {
        info!(
            "Creating cadet {} in institution {}",
            command.reg_no, command.institution_id
        );
        self.ensure_institution(&command.institution_id).await?;

        let reg_no = validate_reg_no(&command.reg_no)?;
        let name = validate_name(&command.name)?;
        validate_batch(command.batch)?;
        validate_certificates(&command.certificates)?;
        self.ensure_reg_no_available(&command.institution_id, &reg_no, None)
            .await?;

        let now = Utc::now();
        let mut cadet = Cadet {
            id: Cadet::generate_id(),
            institution_id: command.institution_id,
            reg_no,
            name,
            rank: command.rank.unwrap_or_default(),
            batch: command.batch,
            division: None,
            details: command.details,
            camps: normalize_camps(command.camps),
            certificates: command.certificates,
            created_at: now,
            updated_at: now,
        };
        cadet.reassign_division();

        self.cadets.store_cadet(&cadet).await?;
        self.revisions.invalidate(&cadet.institution_id);

        info!("✅ Created cadet {} with ID {}", cadet.reg_no, cadet.id);
        Ok(cadet)
    }

    pub async fn get_cadet(&self, cadet_id: &str) -> Result<Option<Cadet>> {
        let cadet = self.cadets.get_cadet(cadet_id).await?;
        if cadet.is_none() {
            warn!("Cadet not found: {}", cadet_id);
        }
        Ok(cadet)
    }

    pub async fn update_cadet(&self, cadet_id: &str, command: UpdateCadetCommand) -> Result<Cadet> {
        info!("Updating cadet: {}", cadet_id);

        let mut cadet = self
            .cadets
            .get_cadet(cadet_id)
            .await?
            .ok_or_else(|| RecordError::cadet_not_found(cadet_id))?;

        if let Some(reg_no) = command.reg_no {
            let reg_no = validate_reg_no(&reg_no)?;
            self.ensure_reg_no_available(&cadet.institution_id, &reg_no, Some(cadet_id))
                .await?;
            cadet.reg_no = reg_no;
        }
        if let Some(name) = command.name {
            cadet.name = validate_name(&name)?;
        }
        if let Some(rank) = command.rank {
            cadet.rank = rank;
        }
        if let Some(batch) = command.batch {
            validate_batch(batch)?;
            cadet.batch = batch;
        }
        if let Some(details) = command.details {
            cadet.details = details;
        }
        if let Some(camps) = command.camps {
            cadet.camps = normalize_camps(camps);
        }
        if let Some(certificates) = command.certificates {
            validate_certificates(&certificates)?;
            cadet.certificates = certificates;
        }
        cadet.reassign_division();
        cadet.updated_at = Utc::now();

        self.cadets.update_cadet(&cadet).await?;
        self.revisions.invalidate(&cadet.institution_id);
        Ok(cadet)
    }

    pub async fn delete_cadet(&self, cadet_id: &str) -> Result<()> {
        info!("Deleting cadet: {}", cadet_id);

        let cadet = self
            .cadets
            .get_cadet(cadet_id)
            .await?
            .ok_or_else(|| RecordError::cadet_not_found(cadet_id))?;

        if !self.cadets.delete_cadet(cadet_id).await? {
            return Err(RecordError::cadet_not_found(cadet_id).into());
        }
        self.revisions.invalidate(&cadet.institution_id);
        Ok(())
    }

    /// Filtered, cursor-paginated listing ordered by name, then registration number.
    ///
    /// `total` counts every cadet matching the filters, not just the page.
    pub async fn list_cadets(&self, query: CadetListQuery) -> Result<CadetListResult> {
        self.ensure_institution(&query.institution_id).await?;

        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE) as usize;
        let search = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut cadets: Vec<Cadet> = self
            .cadets
            .list_cadets(&query.institution_id)
            .await?
            .into_iter()
            .filter(|c| query.rank.map_or(true, |rank| c.rank == rank))
            .filter(|c| query.batch.map_or(true, |batch| c.batch == batch))
            .filter(|c| query.division.map_or(true, |d| c.division == Some(d)))
            .filter(|c| {
                search.as_ref().map_or(true, |needle| {
                    c.name.to_lowercase().contains(needle)
                        || c.reg_no.to_lowercase().contains(needle)
                })
            })
            .collect();
        cadets.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| Cadet::reg_no_key(&a.reg_no).cmp(&Cadet::reg_no_key(&b.reg_no)))
                .then_with(|| a.id.cmp(&b.id))
        });
        let total = cadets.len();

        if let Some(after_id) = query.after.as_deref() {
            let idx = cadets
                .iter()
                .position(|c| c.id == after_id)
                .ok_or_else(|| CadetValidationError::UnknownCursor(after_id.to_string()))?;
            cadets.drain(..=idx);
        }

        let has_more = cadets.len() > limit;
        cadets.truncate(limit);
        let next_cursor = if has_more {
            cadets.last().map(|c| c.id.clone())
        } else {
            None
        };

        debug!(
            "Listed {} of {} cadets for {}",
            cadets.len(),
            total,
            query.institution_id
        );
        Ok(CadetListResult {
            cadets,
            pagination: PaginationInfo { has_more, next_cursor },
            total,
        })
    }

    /// ETag of the institution's listing; fails when the institution is unknown
    pub async fn listing_etag(&self, institution_id: &str) -> Result<String> {
        self.ensure_institution(institution_id).await?;
        Ok(self.revisions.etag(institution_id))
    }

    async fn ensure_institution(&self, institution_id: &str) -> Result<()> {
        if self.institutions.get_institution(institution_id).await?.is_none() {
            return Err(RecordError::institution_not_found(institution_id).into());
        }
        Ok(())
    }

    async fn ensure_reg_no_available(
        &self,
        institution_id: &str,
        reg_no: &str,
        except_id: Option<&str>,
    ) -> Result<()> {
        let key = Cadet::reg_no_key(reg_no);
        let taken = self
            .cadets
            .list_cadets(institution_id)
            .await?
            .iter()
            .any(|c| Cadet::reg_no_key(&c.reg_no) == key && Some(c.id.as_str()) != except_id);
        if taken {
            return Err(RecordError::Conflict(format!(
                "A cadet with registration number {} already exists",
                reg_no
            ))
            .into());
        }
        Ok(())
    }
}

fn validate_reg_no(reg_no: &str) -> Result<String, CadetValidationError> {
    let reg_no = reg_no.trim();
    if reg_no.is_empty() {
        return Err(CadetValidationError::EmptyRegNo);
    }
    if reg_no.chars().count() > MAX_REG_NO_LEN {
        return Err(CadetValidationError::RegNoTooLong);
    }
    Ok(reg_no.to_string())
}

fn validate_name(name: &str) -> Result<String, CadetValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CadetValidationError::EmptyName);
    }
    if name.chars().count() > MAX_CADET_NAME_LEN {
        return Err(CadetValidationError::NameTooLong);
    }
    Ok(name.to_string())
}

fn validate_batch(batch: i32) -> Result<(), CadetValidationError> {
    if !BATCH_YEAR_RANGE.contains(&batch) {
        return Err(CadetValidationError::BatchOutOfRange(batch));
    }
    Ok(())
}

fn validate_certificates(certificates: &[Certificate]) -> Result<(), CadetValidationError> {
    match certificates
        .iter()
        .find(|c| !BATCH_YEAR_RANGE.contains(&c.year))
    {
        Some(c) => Err(CadetValidationError::CertificateYearOutOfRange(c.year)),
        None => Ok(()),
    }
}

fn normalize_camps(camps: Vec<Camp>) -> Vec<Camp> {
    camps.into_iter().map(Camp::normalized).collect()
}
