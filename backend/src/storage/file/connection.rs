use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use super::cadet_repository::CadetRepository;
use super::institution_repository::InstitutionRepository;
use crate::storage::traits::Connection;

/// Version written into every document so later layouts can be migrated
pub const DATA_FORMAT_VERSION: &str = "1.0";

/// FileConnection owns the data directory layout and serializes writers
#[derive(Clone, Debug)]
pub struct FileConnection {
    base_directory: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileConnection {
    /// Create a new connection rooted at `base_directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();
        let cadets_dir = base_path.join("cadets");

        if !cadets_dir.exists() {
            fs::create_dir_all(&cadets_dir).with_context(|| {
                format!("Failed to create data directory {}", cadets_dir.display())
            })?;
            info!("📁 Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn institutions_file_path(&self) -> PathBuf {
        self.base_directory.join("institutions.yaml")
    }

    pub fn cadets_directory(&self) -> PathBuf {
        self.base_directory.join("cadets")
    }

    /// Path of the document holding one institution's cadets
    pub fn cadets_file_path(&self, institution_id: &str) -> PathBuf {
        self.cadets_directory()
            .join(format!("{}.yaml", Self::generate_safe_file_name(institution_id)))
    }

    /// Generate a filesystem-safe name from an identifier
    /// Converts "institution::9f2c" -> "institution__9f2c"
    pub fn generate_safe_file_name(id: &str) -> String {
        id.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect::<String>()
            .trim_matches('_')
            .to_string()
    }

    /// Hold this guard across a read-modify-write cycle
    pub async fn lock_for_write(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Read a YAML document, returning the default value when the file is absent
    pub fn read_document<T>(&self, path: &Path) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        if !path.exists() {
            debug!("Document {} does not exist yet", path.display());
            return Ok(T::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let document = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(document)
    }

    /// Atomic write using temp file
    pub fn write_document<T: Serialize>(&self, path: &Path, document: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml_content = serde_yaml::to_string(document)?;
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        Ok(())
    }
}

impl Connection for FileConnection {
    type InstitutionRepository = InstitutionRepository;
    type CadetRepository = CadetRepository;

    fn create_institution_repository(&self) -> Self::InstitutionRepository {
        InstitutionRepository::new(self.clone())
    }

    fn create_cadet_repository(&self) -> Self::CadetRepository {
        CadetRepository::new(self.clone())
    }
}
