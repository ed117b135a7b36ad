mod companies;
mod config;
mod errors;
mod ml_client;
mod models;
mod recommend;
mod routes;
mod state;
mod upload;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::companies::directory::CompanyDirectory;
use crate::config::Config;
use crate::ml_client::MlClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::upload::storage::prepare_upload_dir;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting matchmaker v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.environment);

    prepare_upload_dir(&config.upload_dir)
        .await
        .with_context(|| format!("failed to prepare {}", config.upload_dir.display()))?;
    info!("Upload directory: {}", config.upload_dir.display());

    let companies = CompanyDirectory::load(config.companies_file.as_deref()).await?;
    info!("Company directory loaded ({} companies)", companies.all().len());

    let ml = MlClient::new(config.ml_service_url.clone())
        .context("failed to build ML service client")?;
    info!("ML service client initialized ({})", config.ml_service_url);

    let state = AppState {
        config: config.clone(),
        ml: Arc::new(ml),
        companies: Arc::new(companies),
        started_at: Instant::now(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
