//! # Storage Module
//!
//! Handles all data persistence for the cadet registry.
//!
//! The domain layer only sees the traits in [`traits`]; the file store in
//! [`file`] is the implementation wired up at startup. Records are kept as
//! YAML documents under the data directory:
//!
//! ```text
//! <data_dir>/institutions.yaml
//! <data_dir>/cadets/<institution>.yaml
//! ```

pub mod file;
pub mod traits;

pub use file::FileConnection;
pub use traits::{BatchWrite, CadetStorage, Connection, InstitutionStorage};
