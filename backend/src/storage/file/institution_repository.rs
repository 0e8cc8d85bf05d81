use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::connection::{FileConnection, DATA_FORMAT_VERSION};
use crate::domain::models::{Institution, RecordError};
use crate::storage::traits::InstitutionStorage;

/// On-disk layout of `institutions.yaml`
#[derive(Debug, Default, Serialize, Deserialize)]
struct InstitutionDocument {
    #[serde(default)]
    data_format_version: String,
    #[serde(default)]
    institutions: Vec<Institution>,
}

/// YAML-backed institution repository
#[derive(Clone, Debug)]
pub struct InstitutionRepository {
    connection: FileConnection,
}

impl InstitutionRepository {
    pub fn new(connection: FileConnection) -> Self {
        Self { connection }
    }

    fn load(&self) -> Result<Vec<Institution>> {
        let document: InstitutionDocument = self
            .connection
            .read_document(&self.connection.institutions_file_path())?;
        Ok(document.institutions)
    }

    fn save(&self, institutions: Vec<Institution>) -> Result<()> {
        let document = InstitutionDocument {
            data_format_version: DATA_FORMAT_VERSION.to_string(),
            institutions,
        };
        self.connection
            .write_document(&self.connection.institutions_file_path(), &document)
    }
}

#[async_trait]
impl InstitutionStorage for InstitutionRepository {
    async fn store_institution(&self, institution: &Institution) -> Result<()> {
        let _guard = self.connection.lock_for_write().await;
        let mut institutions = self.load()?;

        if institutions.iter().any(|i| i.id == institution.id) {
            return Err(RecordError::Conflict(format!(
                "Institution already exists: {}",
                institution.id
            ))
            .into());
        }

        institutions.push(institution.clone());
        self.save(institutions)?;
        info!("Stored institution {} ({})", institution.name, institution.id);
        Ok(())
    }

    async fn get_institution(&self, institution_id: &str) -> Result<Option<Institution>> {
        Ok(self.load()?.into_iter().find(|i| i.id == institution_id))
    }

    async fn list_institutions(&self) -> Result<Vec<Institution>> {
        let mut institutions = self.load()?;
        institutions.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(institutions)
    }

    async fn update_institution(&self, institution: &Institution) -> Result<()> {
        let _guard = self.connection.lock_for_write().await;
        let mut institutions = self.load()?;

        let slot = institutions
            .iter_mut()
            .find(|i| i.id == institution.id)
            .ok_or_else(|| RecordError::institution_not_found(&institution.id))?;
        *slot = institution.clone();

        self.save(institutions)?;
        info!("Updated institution {} ({})", institution.name, institution.id);
        Ok(())
    }
}
