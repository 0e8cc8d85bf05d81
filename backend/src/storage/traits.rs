//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::{Cadet, Institution};

/// Trait defining the interface for institution storage operations
#[async_trait]
pub trait InstitutionStorage: Send + Sync {
    /// Store a new institution
    async fn store_institution(&self, institution: &Institution) -> Result<()>;

    /// Retrieve a specific institution by ID
    async fn get_institution(&self, institution_id: &str) -> Result<Option<Institution>>;

    /// List all institutions ordered by name
    async fn list_institutions(&self) -> Result<Vec<Institution>>;

    /// Update an existing institution
    async fn update_institution(&self, institution: &Institution) -> Result<()>;
}

/// A single write inside an atomic batch commit
#[derive(Debug, Clone, PartialEq)]
pub enum BatchWrite {
    Insert(Cadet),
    Update(Cadet),
}

impl BatchWrite {
    pub fn cadet(&self) -> &Cadet {
        match self {
            BatchWrite::Insert(cadet) | BatchWrite::Update(cadet) => cadet,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, BatchWrite::Insert(_))
    }
}

/// Trait defining the interface for cadet storage operations
///
/// Cadets are grouped per institution. Every method that mutates the
/// store writes the whole institution group in one step, so a reader never
/// sees half of a change.
#[async_trait]
pub trait CadetStorage: Send + Sync {
    /// Store a new cadet
    async fn store_cadet(&self, cadet: &Cadet) -> Result<()>;

    /// Retrieve a specific cadet by ID
    async fn get_cadet(&self, cadet_id: &str) -> Result<Option<Cadet>>;

    /// List the cadets of one institution in storage order
    async fn list_cadets(&self, institution_id: &str) -> Result<Vec<Cadet>>;

    /// List every cadet across all institutions
    async fn list_all_cadets(&self) -> Result<Vec<Cadet>>;

    /// Count the cadets of one institution
    async fn count_cadets(&self, institution_id: &str) -> Result<usize>;

    /// Update an existing cadet
    async fn update_cadet(&self, cadet: &Cadet) -> Result<()>;

    /// Delete a cadet by ID
    /// Returns true if the cadet was found and deleted, false otherwise
    async fn delete_cadet(&self, cadet_id: &str) -> Result<bool>;

    /// Apply all writes for one institution atomically.
    /// Either every write is persisted or none is. Returns the number of writes applied.
    /// A write that would give two cadets the same registration number fails with
    /// `RecordError::Conflict`.
    async fn commit_batch(&self, institution_id: &str, writes: &[BatchWrite]) -> Result<usize>;
}

/// Trait defining the interface for storage connections
///
/// This trait abstracts away the specific connection type and provides factory
/// methods for creating repositories. The connection is built once by the
/// process bootstrap and handed to every service.
pub trait Connection: Send + Sync + Clone + 'static {
    type InstitutionRepository: InstitutionStorage + Clone + 'static;
    type CadetRepository: CadetStorage + Clone + 'static;

    fn create_institution_repository(&self) -> Self::InstitutionRepository;

    fn create_cadet_repository(&self) -> Self::CadetRepository;
}
