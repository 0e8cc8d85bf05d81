//! Application configuration.
//!
//! Resolution order: built-in defaults, then the YAML file named by
//! `CADET_REGISTRY_CONFIG` (if any), then individual environment variables.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

use crate::domain::import::{BatchFallback, ImportPolicy};
use crate::domain::models::Rank;

pub const CONFIG_PATH_ENV: &str = "CADET_REGISTRY_CONFIG";
pub const DATA_DIR_ENV: &str = "CADET_REGISTRY_DATA_DIR";
pub const BIND_ENV: &str = "CADET_REGISTRY_BIND";
pub const CORS_ORIGIN_ENV: &str = "CADET_REGISTRY_CORS_ORIGIN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_directory: PathBuf,
    pub bind_address: String,
    pub cors_origin: String,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Highest `camp{N}_*` column group the importer reads
    pub max_camp_index: u32,
    pub batch_fallback: BatchFallback,
    /// Rank code given to new cadets whose row has none
    pub default_rank: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory(),
            bind_address: "127.0.0.1:3000".to_string(),
            cors_origin: "http://localhost:8080".to_string(),
            import: ImportConfig::default(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_camp_index: 10,
            batch_fallback: BatchFallback::CurrentYear,
            default_rank: Rank::default().code().to_string(),
        }
    }
}

impl ImportConfig {
    pub fn to_policy(&self) -> Result<ImportPolicy> {
        let default_rank = Rank::parse(&self.default_rank)
            .with_context(|| format!("Unknown default rank '{}'", self.default_rank))?;
        Ok(ImportPolicy {
            max_camp_index: self.max_camp_index,
            batch_fallback: self.batch_fallback,
            default_rank,
        })
    }
}

/// `~/Documents/Cadet Registry`, or `./cadet-registry-data` when there is no documents folder
fn default_data_directory() -> PathBuf {
    dirs::document_dir()
        .map(|docs| docs.join("Cadet Registry"))
        .unwrap_or_else(|| PathBuf::from("cadet-registry-data"))
}

impl AppConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Invalid configuration file")
    }

    /// Apply overrides from a variable lookup (normally `std::env::var`)
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            self.data_directory = PathBuf::from(dir);
        }
        if let Some(bind) = lookup(BIND_ENV) {
            self.bind_address = bind;
        }
        if let Some(origin) = lookup(CORS_ORIGIN_ENV) {
            self.cors_origin = origin;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.import.max_camp_index == 0 {
            bail!("import.max_camp_index must be at least 1");
        }
        self.socket_addr()?;
        self.import.to_policy()?;
        if self.cors_origin.trim().is_empty() {
            bail!("cors_origin cannot be empty");
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_address
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.bind_address))
    }

    /// Load defaults, the optional config file and environment overrides, then validate
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                info!("Loading configuration from {}", path);
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {}", path))?;
                Self::from_yaml_str(&content)?
            }
            Err(_) => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }
}
