mod api;
mod catalog;
mod middleware;
mod scheduler;
mod session;

use std::sync::Arc;
use std::time::Duration;

use shipmates_maps::MapsClient;
use shipmates_notion::NotionClient;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    catalog::CourierCatalog,
    middleware::RateLimitState,
    session::SessionStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(shipmates_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting shipmates-server");

    let maps = MapsClient::new(
        &config.google_maps_api_key,
        &config.country_restriction,
        config.http_timeout_secs,
    )?;
    let notion = NotionClient::new(&config.notion_api_key, config.http_timeout_secs)?;

    // The first catalog fetch must succeed.
    let catalog = Arc::new(CourierCatalog::load(&notion, &config.notion_database_id).await?);

    let sessions = SessionStore::default();
    let _scheduler = scheduler::build_scheduler(
        Arc::clone(&catalog),
        notion,
        sessions.clone(),
        Arc::clone(&config),
    )
    .await?;

    let state = AppState {
        maps,
        catalog,
        sessions,
        metro: Arc::new(config.metro.clone()),
    };
    let rate_limit = RateLimitState::new(config.rate_limit_per_minute, Duration::from_secs(60));
    let app = build_app(state, rate_limit);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
