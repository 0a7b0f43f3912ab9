//! Library Catalog Server
//!
//! Serves the catalog API and, when enabled, the maintenance listener.

use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use library_catalog::{api, config::AppConfig, repository, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config);

    tracing::info!("Starting Library Catalog Server v{}", env!("CARGO_PKG_VERSION"));

    let store = repository::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    let state = AppState::new(config, store);
    state
        .services
        .admin
        .initialize(state.config.database.seed)
        .await
        .context("Failed to initialize database")?;

    let addr = socket_addr(&state.config.server.host, state.config.server.port)?;
    let public = serve(addr, api::router(state.clone()));

    if state.config.admin.enabled {
        let admin_addr = socket_addr(&state.config.admin.host, state.config.admin.port)?;
        tracing::warn!("Administrative endpoints enabled on http://{}", admin_addr);
        let admin = serve(admin_addr, api::admin_router(state.clone()));
        tokio::try_join!(public, admin)?;
    } else {
        public.await?;
    }

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("library_catalog={},tower_http=debug", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn socket_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let ip: IpAddr = host
        .parse()
        .with_context(|| format!("Invalid host address: {}", host))?;
    Ok(SocketAddr::new(ip, port))
}

async fn serve(addr: SocketAddr, app: axum::Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
