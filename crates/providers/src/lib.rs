//! # Providers Crate
//!
//! Local stand-ins for the two upstream services the catalog consumes:
//! the rating-data provider and the movie-info provider.
//!
//! ## Main Components
//!
//! - **index**: `ProviderIndex`, the in-memory items and ratings
//! - **parser**: MovieLens `movies.dat` / `ratings.dat` parsing
//! - **routes**: axum routers exposing the provider endpoints
//! - **error**: error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use providers::{ProviderIndex, movies_router, ratings_router, serve_router};
//! use std::sync::Arc;
//!
//! let index = Arc::new(ProviderIndex::demo());
//! tokio::try_join!(
//!     serve_router("ratings", "127.0.0.1:8083".parse()?, ratings_router(index.clone())),
//!     serve_router("movies", "127.0.0.1:8082".parse()?, movies_router(index)),
//! )?;
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod routes;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

pub use error::LoadError;
pub use index::ProviderIndex;
pub use routes::{movies_router, ratings_router};

/// Serve one provider router until Ctrl-C
pub async fn serve_router(name: &str, addr: SocketAddr, router: Router) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {name} provider on {addr}"))?;
    info!("{} provider listening on {}", name, listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        })
        .await
        .with_context(|| format!("{name} provider failed"))
}
