//! # Domain Layer
//!
//! Business logic of the cadet registry. Services are generic over the
//! storage [`Connection`](crate::storage::Connection) they are built from, so
//! the bootstrap decides which store backs them and tests can hand them a
//! throwaway one.
//!
//! ## Services
//!
//! - [`InstitutionService`]: institutions and their computed cadet counts
//! - [`CadetService`]: interactive cadet CRUD, filtering and pagination
//! - [`ImportService`]: the spreadsheet import pipeline
//! - [`ExportService`]: CSV export in the importer's column layout
//! - [`DashboardService`]: aggregate counts

pub mod cadet_service;
pub mod commands;
pub mod dashboard_service;
pub mod export_service;
pub mod import;
pub mod institution_service;
pub mod listing_revisions;
pub mod models;

pub use cadet_service::CadetService;
pub use dashboard_service::DashboardService;
pub use export_service::ExportService;
pub use import::ImportService;
pub use institution_service::InstitutionService;
pub use listing_revisions::ListingRevisions;
