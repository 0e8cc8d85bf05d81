use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use tracing::{debug, info, warn};

use super::connection::{FileConnection, DATA_FORMAT_VERSION};
use crate::domain::models::{Cadet, RecordError};
use crate::storage::traits::{BatchWrite, CadetStorage};

/// On-disk layout of `cadets/<institution>.yaml`
#[derive(Debug, Default, Serialize, Deserialize)]
struct CadetDocument {
    #[serde(default)]
    data_format_version: String,
    #[serde(default)]
    institution_id: String,
    #[serde(default)]
    cadets: Vec<Cadet>,
}

/// YAML-backed cadet repository, one document per institution
#[derive(Clone, Debug)]
pub struct CadetRepository {
    connection: FileConnection,
}

impl CadetRepository {
    pub fn new(connection: FileConnection) -> Self {
        Self { connection }
    }

    fn load(&self, institution_id: &str) -> Result<Vec<Cadet>> {
        let document: CadetDocument = self
            .connection
            .read_document(&self.connection.cadets_file_path(institution_id))?;
        Ok(document.cadets)
    }

    fn save(&self, institution_id: &str, cadets: Vec<Cadet>) -> Result<()> {
        let document = CadetDocument {
            data_format_version: DATA_FORMAT_VERSION.to_string(),
            institution_id: institution_id.to_string(),
            cadets,
        };
        self.connection
            .write_document(&self.connection.cadets_file_path(institution_id), &document)
    }

    /// Discover every cadet document in the data directory
    fn discover_documents(&self) -> Result<Vec<CadetDocument>> {
        let cadets_dir = self.connection.cadets_directory();
        if !cadets_dir.exists() {
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();
        for entry in fs::read_dir(&cadets_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            match self.connection.read_document::<CadetDocument>(&path) {
                Ok(document) => documents.push(document),
                Err(e) => warn!("Skipping unreadable cadet document {}: {:#}", path.display(), e),
            }
        }

        debug!("Discovered {} cadet documents", documents.len());
        Ok(documents)
    }

    fn find_institution_of(&self, cadet_id: &str) -> Result<Option<String>> {
        Ok(self
            .discover_documents()?
            .into_iter()
            .find(|doc| doc.cadets.iter().any(|c| c.id == cadet_id))
            .map(|doc| doc.institution_id))
    }
}

#[async_trait]
impl CadetStorage for CadetRepository {
    async fn store_cadet(&self, cadet: &Cadet) -> Result<()> {
        self.commit_batch(&cadet.institution_id, &[BatchWrite::Insert(cadet.clone())])
            .await
            .map(|_| ())
    }

    async fn get_cadet(&self, cadet_id: &str) -> Result<Option<Cadet>> {
        Ok(self
            .discover_documents()?
            .into_iter()
            .flat_map(|doc| doc.cadets)
            .find(|c| c.id == cadet_id))
    }

    async fn list_cadets(&self, institution_id: &str) -> Result<Vec<Cadet>> {
        self.load(institution_id)
    }

    async fn list_all_cadets(&self) -> Result<Vec<Cadet>> {
        Ok(self
            .discover_documents()?
            .into_iter()
            .flat_map(|doc| doc.cadets)
            .collect())
    }

    async fn count_cadets(&self, institution_id: &str) -> Result<usize> {
        Ok(self.load(institution_id)?.len())
    }

    async fn update_cadet(&self, cadet: &Cadet) -> Result<()> {
        self.commit_batch(&cadet.institution_id, &[BatchWrite::Update(cadet.clone())])
            .await
            .map(|_| ())
    }

    async fn delete_cadet(&self, cadet_id: &str) -> Result<bool> {
        let _guard = self.connection.lock_for_write().await;

        let institution_id = match self.find_institution_of(cadet_id)? {
            Some(id) => id,
            None => return Ok(false),
        };

        let mut cadets = self.load(&institution_id)?;
        let before = cadets.len();
        cadets.retain(|c| c.id != cadet_id);
        let deleted = cadets.len() != before;

        if deleted {
            self.save(&institution_id, cadets)?;
            info!("Deleted cadet {} from {}", cadet_id, institution_id);
        }
        Ok(deleted)
    }

    async fn commit_batch(&self, institution_id: &str, writes: &[BatchWrite]) -> Result<usize> {
        let _guard = self.connection.lock_for_write().await;
        let mut cadets = self.load(institution_id)?;

        // Apply everything in memory first; any failure leaves the document untouched.
        let mut known_ids: HashSet<String> = cadets.iter().map(|c| c.id.clone()).collect();
        for write in writes {
            let cadet = write.cadet();
            if cadet.institution_id != institution_id {
                bail!(
                    "Cadet {} belongs to {}, not {}",
                    cadet.id,
                    cadet.institution_id,
                    institution_id
                );
            }
            match write {
                BatchWrite::Insert(cadet) => {
                    if !known_ids.insert(cadet.id.clone()) {
                        return Err(RecordError::Conflict(format!(
                            "Cadet already exists: {}",
                            cadet.id
                        ))
                        .into());
                    }
                    cadets.push(cadet.clone());
                }
                BatchWrite::Update(cadet) => {
                    let slot = cadets
                        .iter_mut()
                        .find(|c| c.id == cadet.id)
                        .ok_or_else(|| RecordError::cadet_not_found(&cadet.id))?;
                    *slot = cadet.clone();
                }
            }
        }

        // Registration numbers stay unique per institution, checked under the write lock
        for write in writes {
            let cadet = write.cadet();
            let key = Cadet::reg_no_key(&cadet.reg_no);
            if cadets
                .iter()
                .any(|c| c.id != cadet.id && Cadet::reg_no_key(&c.reg_no) == key)
            {
                return Err(RecordError::Conflict(format!(
                    "A cadet with registration number {} already exists",
                    cadet.reg_no
                ))
                .into());
            }
        }

        self.save(institution_id, cadets)?;
        debug!("Committed {} writes for {}", writes.len(), institution_id);
        Ok(writes.len())
    }
}
