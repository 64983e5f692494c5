use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use cms_api_rust::config::AppConfig;
use cms_api_rust::database::{DatabaseManager, MemoryTenantStore, PgTenantStore, TenantStore};
use cms_api_rust::tenancy::HttpDomainProbe;
use cms_api_rust::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, TENANCY_ROOT_DOMAIN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        "Starting CMS API in {:?} mode (root domain {})",
        config.environment,
        config.tenancy.root_domain
    );

    let store: Arc<dyn TenantStore> = match config.database.url {
        Some(_) => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect tenant database")?;
            Arc::new(PgTenantStore::new(pool))
        }
        None if config.environment.is_production() => {
            anyhow::bail!("DATABASE_URL is required in production");
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory tenant store with demo data");
            Arc::new(MemoryTenantStore::seeded_for_development().await)
        }
    };

    let probe = HttpDomainProbe::new(config.tenancy.health_check_timeout())
        .context("failed to build domain probe client")?;

    let port = config.server.port;
    let state = AppState::new(config, store, Arc::new(probe));
    let app = build_router(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("CMS API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
