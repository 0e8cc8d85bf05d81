//! # Cadet Registry Backend
//!
//! Record keeping for cadets, the institutions that enrol them, the camps
//! they attend and the certificates they earn, with a spreadsheet import
//! pipeline feeding the same records.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (axum REST handlers, DTO mappers)
//!     ↓
//! Domain Layer (services, import pipeline)
//!     ↓
//! Storage Layer (YAML documents on disk)
//! ```
//!
//! The storage connection is built once in [`initialize_backend`] and handed
//! to every service; nothing reaches for a global handle.

pub mod config;
pub mod domain;
pub mod io;
pub mod logging;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::import::{HttpRemoteSource, ImportPolicy, RemoteSource};
use crate::domain::{
    CadetService, DashboardService, ExportService, ImportService, InstitutionService,
    ListingRevisions,
};
use crate::storage::FileConnection;

/// Largest spreadsheet upload accepted by the import endpoint
const MAX_IMPORT_BYTES: usize = 25 * 1024 * 1024;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub institution_service: InstitutionService<FileConnection>,
    pub cadet_service: CadetService<FileConnection>,
    pub import_service: ImportService<FileConnection>,
    pub export_service: ExportService<FileConnection>,
    pub dashboard_service: DashboardService<FileConnection>,
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up data directory at {}", config.data_directory.display());
    let connection = FileConnection::new(&config.data_directory)
        .with_context(|| format!("Failed to open data directory {}", config.data_directory.display()))?;

    let policy = config.import.to_policy()?;
    let remote = Arc::new(HttpRemoteSource::new().context("Failed to build HTTP client")?);
    Ok(initialize_backend_with(connection, policy, remote))
}

/// Wire the services around an existing connection and remote source
pub fn initialize_backend_with(
    connection: FileConnection,
    policy: ImportPolicy,
    remote: Arc<dyn RemoteSource>,
) -> AppState {
    info!("Setting up domain model");
    let revisions = ListingRevisions::new();

    AppState {
        institution_service: InstitutionService::new(&connection),
        cadet_service: CadetService::new(&connection, revisions.clone()),
        import_service: ImportService::new(&connection, revisions, policy, remote),
        export_service: ExportService::new(&connection),
        dashboard_service: DashboardService::new(&connection),
    }
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin '{}'", cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/institutions",
            get(io::list_institutions).post(io::create_institution),
        )
        .route(
            "/institutions/:id",
            get(io::get_institution).put(io::update_institution),
        )
        .route(
            "/institutions/:id/cadets",
            get(io::list_cadets).post(io::create_cadet),
        )
        .route(
            "/institutions/:id/import/file",
            post(io::import_file).layer(DefaultBodyLimit::max(MAX_IMPORT_BYTES)),
        )
        .route("/institutions/:id/import/url", post(io::import_url))
        .route("/institutions/:id/export/csv", get(io::export_cadets_csv))
        .route(
            "/cadets/:id",
            get(io::get_cadet).put(io::update_cadet).delete(io::delete_cadet),
        )
        .route("/dashboard", get(io::get_dashboard))
        .route("/camps/duration", get(io::get_camp_duration));

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}
