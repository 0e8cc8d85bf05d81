use anyhow::Result;
use tracing::info;

use cadet_registry_backend::config::AppConfig;
use cadet_registry_backend::{create_router, initialize_backend, logging};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = AppConfig::load()?;
    let addr = config.socket_addr()?;

    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state, &config.cors_origin)?;

    info!("🚀 Starting cadet registry on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
