//! Server crate for the catalog service.
//!
//! This crate contains the aggregator that joins ratings with item metadata,
//! the HTTP API exposing it, and the configuration that wires the provider
//! clients together.

pub mod aggregator;
pub mod api;
pub mod config;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

pub use aggregator::{CatalogAggregator, FailurePolicy, merge_positional};
pub use api::{AppState, CatalogReport, FAILURES_HEADER, router};
pub use config::{ServiceConfig, UpstreamConfig};

/// Run the catalog service until Ctrl-C
pub async fn serve(config: ServiceConfig) -> Result<()> {
    let aggregator = config
        .upstream
        .build_aggregator()
        .context("Failed to build catalog aggregator")?;
    info!(
        "Catalog service using ratings={:?} movies={:?} policy={}",
        config.upstream.ratings_urls, config.upstream.movies_urls, config.upstream.failure_policy
    );

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Catalog service listening on {}", listener.local_addr()?);

    axum::serve(listener, router(AppState::new(aggregator)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Catalog service failed")?;

    info!("Catalog service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Keep serving rather than stopping on a broken signal handler
        std::future::pending::<()>().await;
    }
}
