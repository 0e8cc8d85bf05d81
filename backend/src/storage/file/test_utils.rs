//! Test utilities for the file store
//!
//! `TestEnvironment` keeps a temporary data directory alive for the duration
//! of a test and removes it on drop, even when the test panics.

use anyhow::Result;
use chrono::Utc;
use std::path::PathBuf;
use tempfile::TempDir;

use super::connection::FileConnection;
use crate::domain::models::{Cadet, Division, Institution, PersonalDetails, Rank};

pub struct TestEnvironment {
    /// The temporary directory - kept alive to prevent auto-cleanup until drop
    _temp_dir: TempDir,
    pub connection: FileConnection,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = FileConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        if std::env::var("CADET_REGISTRY_DEBUG_TESTS").is_ok() {
            println!("🧹 Cleaning up test environment: {:?}", self.base_path);
        }
    }
}

pub fn sample_institution(name: &str) -> Institution {
    let now = Utc::now();
    Institution {
        id: Institution::generate_id(),
        name: name.to_string(),
        officer_name: "Lt. K. Raman".to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_cadet(institution_id: &str, reg_no: &str, name: &str) -> Cadet {
    let now = Utc::now();
    Cadet {
        id: Cadet::generate_id(),
        institution_id: institution_id.to_string(),
        reg_no: reg_no.to_string(),
        name: name.to_string(),
        rank: Rank::Cadet,
        batch: 2022,
        division: Division::from_reg_no(reg_no),
        details: PersonalDetails::default(),
        camps: Vec::new(),
        certificates: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}
