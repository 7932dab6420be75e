mod api;
mod bootstrap;
mod health;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use esim_catalog_core::config::{AppConfig, LoadOptions};
use tokio::sync::watch;

use crate::api::ApiState;

fn init_logging(config: &AppConfig) {
    use esim_catalog_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;

    let scheduler = app
        .refresher
        .clone()
        .map(|refresher| scheduler::spawn(refresher, Arc::clone(&app.catalog)));

    let state = ApiState::new(
        Arc::clone(&app.catalog),
        app.link_builder.clone(),
        app.config.checkout.default_locale.clone(),
    );
    let router = api::router(state).merge(health::router(Arc::clone(&app.catalog)));

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        event_name = "server.started",
        bind_address = %address,
        partner_refresh = scheduler.is_some(),
        "plan catalog server listening"
    );

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        let _ = shutdown_rx.changed().await;
    });
    let server = tokio::spawn(async move { server.await });

    wait_for_shutdown().await?;
    tracing::info!(event_name = "server.stopping", "plan catalog server stopping");

    if let Some(scheduler) = scheduler {
        scheduler.abort();
    }
    let _ = shutdown_tx.send(true);

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    match tokio::time::timeout(grace, server).await {
        Ok(joined) => joined??,
        Err(_) => tracing::warn!(
            event_name = "server.shutdown.timeout",
            grace_secs = grace.as_secs(),
            "in-flight requests did not drain before the shutdown deadline"
        ),
    }

    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
