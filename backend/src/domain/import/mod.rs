//! # Spreadsheet import pipeline
//!
//! ```text
//! source → parser → header_normalizer → row_validator
//!        → camp_reconstructor → reconciler → committer
//! ```
//!
//! Data flows strictly forward. Any stage error aborts the whole import and
//! nothing is written; invalid rows are not errors, they are dropped and
//! reported in the [`ImportSummary`].

pub mod camp_reconstructor;
pub mod committer;
pub mod header_normalizer;
pub mod parser;
pub mod reconciler;
pub mod row_validator;
pub mod source;

use chrono::{Datelike, Utc};
use shared::ImportSummary;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::listing_revisions::ListingRevisions;
use crate::storage::{CadetStorage, Connection, InstitutionStorage};
use parser::ParsedSheet;

pub use reconciler::{BatchFallback, ImportPolicy};
pub use source::{HttpRemoteSource, ImportSource, RemoteSource, SpreadsheetFormat};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Institution not found: {0}")]
    UnknownInstitution(String),
    #[error("Could not read import source: {0}")]
    SourceAcquisition(String),
    #[error("Could not parse import data: {0}")]
    Parse(String),
    #[error("Missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },
    #[error("Could not read existing cadets: {0}")]
    Snapshot(String),
    #[error("Import failed while saving: {0}")]
    Commit(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    /// Records written by the batch commit
    pub count: usize,
    pub summary: ImportSummary,
}

#[derive(Clone)]
pub struct ImportService<C: Connection> {
    institutions: C::InstitutionRepository,
    cadets: C::CadetRepository,
    revisions: ListingRevisions,
    policy: ImportPolicy,
    remote: Arc<dyn RemoteSource>,
}

impl<C: Connection> ImportService<C> {
    pub fn new(
        connection: &C,
        revisions: ListingRevisions,
        policy: ImportPolicy,
        remote: Arc<dyn RemoteSource>,
    ) -> Self {
        Self {
            institutions: connection.create_institution_repository(),
            cadets: connection.create_cadet_repository(),
            revisions,
            policy,
            remote,
        }
    }

    pub fn policy(&self) -> &ImportPolicy {
        &self.policy
    }

    pub async fn import(&self, institution_id: &str, source: ImportSource) -> Result<ImportOutcome, ImportError> {
        info!("📥 Starting import into {}", institution_id);
        self.ensure_institution(institution_id).await?;

        let sheet = source::acquire(source, self.remote.as_ref()).await?;
        self.run(institution_id, sheet).await
    }

    /// Run the pipeline on an already parsed sheet
    pub async fn import_sheet(&self, institution_id: &str, sheet: ParsedSheet) -> Result<ImportOutcome, ImportError> {
        self.ensure_institution(institution_id).await?;
        self.run(institution_id, sheet).await
    }

    async fn run(&self, institution_id: &str, sheet: ParsedSheet) -> Result<ImportOutcome, ImportError> {
        row_validator::check_schema(&sheet.headers)?;

        let rows: Vec<_> = sheet
            .rows
            .iter()
            .map(|(line, raw)| header_normalizer::normalize_row(*line, raw))
            .collect();

        let snapshot = self
            .cadets
            .list_cadets(institution_id)
            .await
            .map_err(|e| ImportError::Snapshot(format!("{:#}", e)))?;

        let now = Utc::now();
        let plan = reconciler::plan(institution_id, snapshot, &rows, &self.policy, now.year(), now);

        if !plan.summary.dropped_rows.is_empty() {
            warn!(
                "⚠️ {} of {} rows dropped from import into {}",
                plan.summary.dropped_rows.len(),
                plan.summary.rows_read,
                institution_id
            );
        }

        let count = if plan.is_empty() {
            info!("Nothing to write for {}", institution_id);
            0
        } else {
            committer::commit(&self.cadets, &self.revisions, institution_id, &plan).await?
        };

        info!(
            "✅ Import into {} finished: {} written ({} inserted, {} updated)",
            institution_id, count, plan.summary.inserted, plan.summary.updated
        );
        Ok(ImportOutcome {
            count,
            summary: plan.summary,
        })
    }

    async fn ensure_institution(&self, institution_id: &str) -> Result<(), ImportError> {
        match self.institutions.get_institution(institution_id).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(ImportError::UnknownInstitution(institution_id.to_string())),
            Err(e) => Err(ImportError::Snapshot(format!("{:#}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::domain::models::{Cadet, Rank};
    use crate::storage::file::test_utils::{sample_institution, TestEnvironment};
    use crate::storage::FileConnection;

    /// Serves a fixed CSV body for any URL
    struct FixedRemote(String);

    #[async_trait]
    impl RemoteSource for FixedRemote {
        async fn fetch_text(&self, _url: &str) -> Result<String, ImportError> {
            Ok(self.0.clone())
        }
    }

    struct FailingRemote;

    #[async_trait]
    impl RemoteSource for FailingRemote {
        async fn fetch_text(&self, url: &str) -> Result<String, ImportError> {
            Err(ImportError::SourceAcquisition(format!("{} unreachable", url)))
        }
    }

    async fn setup_test(env: &TestEnvironment, remote: Arc<dyn RemoteSource>) -> (ImportService<FileConnection>, String) {
        let institution = sample_institution("National College");
        env.connection
            .create_institution_repository()
            .store_institution(&institution)
            .await
            .unwrap();
        let service = ImportService::new(&env.connection, ListingRevisions::new(), ImportPolicy::default(), remote);
        (service, institution.id)
    }

    fn csv_file(content: &str) -> ImportSource {
        ImportSource::File {
            format: SpreadsheetFormat::Csv,
            bytes: content.as_bytes().to_vec(),
        }
    }

    async fn stored(env: &TestEnvironment, institution_id: &str) -> Vec<Cadet> {
        env.connection
            .create_cadet_repository()
            .list_cadets(institution_id)
            .await
            .unwrap()
    }

    const ROLL: &str = "Regimental No,Cadet Name,Batch,Rank,Gender,camp1_type,camp1_location\n\
TN21SDA100001,Arun Kumar,2021,SGT,Male,ATC,Trichy\n\
TN22SWA100002,Divya,2022,,Female,,\n\
,Missing Number,2022,,,,\n";

    #[tokio::test]
    async fn test_import_csv_file() {
        let env = TestEnvironment::new().unwrap();
        let (service, institution_id) = setup_test(&env, Arc::new(FailingRemote)).await;

        let outcome = service.import(&institution_id, csv_file(ROLL)).await.unwrap();

        assert_eq!(outcome.count, 2);
        assert_eq!(outcome.summary.inserted, 2);
        assert_eq!(outcome.summary.dropped_rows.len(), 1);
        assert_eq!(outcome.summary.dropped_rows[0].row_number, 4);
        assert_eq!(outcome.summary.rank_defaulted, 1);

        let cadets = stored(&env, &institution_id).await;
        assert_eq!(cadets.len(), 2);
        let arun = cadets.iter().find(|c| c.name == "Arun Kumar").unwrap();
        assert_eq!(arun.rank, Rank::Sergeant);
        assert_eq!(arun.camps.len(), 1);
        assert_eq!(arun.camps[0].location, "Trichy");
        assert_eq!(arun.camps[0].duration_days, 0);
    }

    #[tokio::test]
    async fn test_reimport_is_idempotent() {
        let env = TestEnvironment::new().unwrap();
        let (service, institution_id) = setup_test(&env, Arc::new(FailingRemote)).await;

        service.import(&institution_id, csv_file(ROLL)).await.unwrap();
        let first = stored(&env, &institution_id).await;

        let outcome = service.import(&institution_id, csv_file(ROLL)).await.unwrap();
        let second = stored(&env, &institution_id).await;

        assert_eq!(outcome.summary.updated, 2);
        assert_eq!(outcome.summary.inserted, 0);
        assert_eq!(first, second);
    }

    const SYNONYM_ROLL: &str = "Regimental No,reg no,Name,Batch\n\
TN21SDA123456,,First Spelling,2021\n\
,TN21SDA123456,Second Spelling,2021\n";

    #[tokio::test]
    async fn test_synonym_headers_for_the_same_reg_no_resolve_to_one_record() {
        let env = TestEnvironment::new().unwrap();
        let (service, institution_id) = setup_test(&env, Arc::new(FailingRemote)).await;

        let outcome = service.import(&institution_id, csv_file(SYNONYM_ROLL)).await.unwrap();

        assert_eq!(outcome.count, 1);
        assert!(outcome.summary.dropped_rows.is_empty());
        assert_eq!(outcome.summary.duplicate_reg_nos, vec!["TN21SDA123456"]);
        assert_eq!(outcome.summary.inserted, 1);
        let cadets = stored(&env, &institution_id).await;
        assert_eq!(cadets.len(), 1);
        assert_eq!(cadets[0].name, "Second Spelling");
    }

    #[tokio::test]
    async fn test_synonym_headers_update_the_existing_record() {
        let env = TestEnvironment::new().unwrap();
        let (service, institution_id) = setup_test(&env, Arc::new(FailingRemote)).await;
        service
            .import(&institution_id, csv_file("regNo,name,batch\nTN21SDA123456,Old Name,2020\n"))
            .await
            .unwrap();
        let before = stored(&env, &institution_id).await;

        let outcome = service.import(&institution_id, csv_file(SYNONYM_ROLL)).await.unwrap();

        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.summary.updated, 1);
        assert_eq!(outcome.summary.inserted, 0);
        let after = stored(&env, &institution_id).await;
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].id, before[0].id);
        assert_eq!(after[0].name, "Second Spelling");
        assert_eq!(after[0].batch, 2021);
    }

    #[tokio::test]
    async fn test_blank_duplicate_column_does_not_drop_the_row() {
        let env = TestEnvironment::new().unwrap();
        let (service, institution_id) = setup_test(&env, Arc::new(FailingRemote)).await;

        let outcome = service
            .import(
                &institution_id,
                csv_file("Regimental No,reg no,Name,Batch\nTN21SDA999999,,Only,2021\n"),
            )
            .await
            .unwrap();

        assert_eq!(outcome.count, 1);
        assert!(outcome.summary.dropped_rows.is_empty());
        assert_eq!(stored(&env, &institution_id).await[0].reg_no, "TN21SDA999999");
    }

    #[tokio::test]
    async fn test_non_numeric_batch_is_committed_as_current_year() {
        let env = TestEnvironment::new().unwrap();
        let (service, institution_id) = setup_test(&env, Arc::new(FailingRemote)).await;

        service
            .import(&institution_id, csv_file("regNo,name,batch\nR1,Arun,abc\n"))
            .await
            .unwrap();

        let cadets = stored(&env, &institution_id).await;
        assert_eq!(cadets[0].batch, Utc::now().year());
    }

    #[tokio::test]
    async fn test_import_from_url() {
        let env = TestEnvironment::new().unwrap();
        let remote = Arc::new(FixedRemote("regNo,name,batch\nR1,Arun,2021\nR2,Bala,2022\n".to_string()));
        let (service, institution_id) = setup_test(&env, remote).await;

        let outcome = service
            .import(&institution_id, ImportSource::Url("https://example.com/roll.csv".to_string()))
            .await
            .unwrap();
        assert_eq!(outcome.count, 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_aborts_before_writing() {
        let env = TestEnvironment::new().unwrap();
        let (service, institution_id) = setup_test(&env, Arc::new(FailingRemote)).await;

        let err = service
            .import(&institution_id, ImportSource::Url("https://example.com/roll.csv".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::SourceAcquisition(_)));
        assert!(stored(&env, &institution_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_columns_are_a_schema_error() {
        let env = TestEnvironment::new().unwrap();
        let (service, institution_id) = setup_test(&env, Arc::new(FailingRemote)).await;

        let err = service
            .import(&institution_id, csv_file("Name,Rank\nArun,SGT\n"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required columns: regNo, batch");
    }

    #[tokio::test]
    async fn test_unknown_institution() {
        let env = TestEnvironment::new().unwrap();
        let (service, _) = setup_test(&env, Arc::new(FailingRemote)).await;

        let err = service
            .import("institution::missing", csv_file("regNo,name,batch\nR1,Arun,2021\n"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::UnknownInstitution(_)));
    }

    #[tokio::test]
    async fn test_garbage_workbook_is_a_parse_error() {
        let env = TestEnvironment::new().unwrap();
        let (service, institution_id) = setup_test(&env, Arc::new(FailingRemote)).await;

        let err = service
            .import(
                &institution_id,
                ImportSource::File {
                    format: SpreadsheetFormat::Xlsx,
                    bytes: b"PK but not really".to_vec(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
    }

    #[tokio::test]
    async fn test_only_invalid_rows_writes_nothing() {
        let env = TestEnvironment::new().unwrap();
        let (service, institution_id) = setup_test(&env, Arc::new(FailingRemote)).await;

        let outcome = service
            .import(&institution_id, csv_file("regNo,name,batch\n,Arun,2021\nR2,,2021\n"))
            .await
            .unwrap();
        assert_eq!(outcome.count, 0);
        assert_eq!(outcome.summary.dropped_rows.len(), 2);
        assert!(stored(&env, &institution_id).await.is_empty());
    }
}
