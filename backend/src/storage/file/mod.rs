//! # File Storage Module
//!
//! YAML document store on the local filesystem. Institutions live in a
//! single document; cadets are grouped into one document per institution so
//! that a batch commit replaces exactly one file.
//!
//! ## Features
//!
//! - Atomic writes: every document is written to a temp file and renamed into place
//! - One in-process writer at a time (read-modify-write under a lock)
//! - Implements the same storage traits the domain layer is written against
//!
//! ## File Format
//!
//! ```yaml
//! data_format_version: "1.0"
//! institution_id: institution::4f1c...
//! cadets:
//!   - id: cadet::9a0e...
//!     reg_no: TN21SDA123456
//!     name: Arun Kumar
//!     rank: CDT
//!     batch: 2021
//!     camps: []
//! ```

pub mod cadet_repository;
pub mod connection;
pub mod institution_repository;

#[cfg(test)]
pub mod test_utils;

pub use cadet_repository::CadetRepository;
pub use connection::FileConnection;
pub use institution_repository::InstitutionRepository;
