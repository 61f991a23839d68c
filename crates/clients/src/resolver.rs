//! Logical service name resolution.
//!
//! Clients never hold a provider address directly. They ask a
//! [`ServiceResolver`] for a base URL on every call, which lets a static map,
//! a client-side load balancer, or a real discovery backend sit behind the
//! same seam.

use async_trait::async_trait;
use catalog_types::{CatalogError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Logical name of the ratings provider
pub const RATING_DATA_SERVICE: &str = "RATING-DATA-SERVICE";

/// Logical name of the items provider
pub const MOVIE_INFO_SERVICE: &str = "MOVIE-INFO-SERVICE";

/// Turns a logical provider name into a reachable base URL.
///
/// Failing to resolve must be reported as
/// [`CatalogError::UpstreamUnavailable`].
#[async_trait]
pub trait ServiceResolver: Send + Sync {
    async fn resolve(&self, service: &str) -> Result<String>;
}

/// Resolver backed by a fixed name → address map
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    addresses: HashMap<String, String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the address for a logical name
    pub fn with_service(mut self, service: impl Into<String>, base_url: impl Into<String>) -> Self {
        self.addresses.insert(service.into(), base_url.into());
        self
    }
}

#[async_trait]
impl ServiceResolver for StaticResolver {
    async fn resolve(&self, service: &str) -> Result<String> {
        self.addresses
            .get(service)
            .cloned()
            .ok_or_else(|| CatalogError::unavailable(service, "no address registered"))
    }
}

/// Instances of one service and its rotation cursor
#[derive(Debug, Default)]
struct Pool {
    base_urls: Vec<String>,
    next: AtomicUsize,
}

/// Client-side load balancer rotating over the instances of each service
///
/// Every service rotates independently, so interleaved calls for different
/// services never skip instances.
#[derive(Debug, Default)]
pub struct RoundRobinResolver {
    pools: HashMap<String, Pool>,
}

impl RoundRobinResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instances<I, S>(mut self, service: impl Into<String>, base_urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pools
            .entry(service.into())
            .or_default()
            .base_urls
            .extend(base_urls.into_iter().map(Into::into));
        self
    }
}

#[async_trait]
impl ServiceResolver for RoundRobinResolver {
    async fn resolve(&self, service: &str) -> Result<String> {
        let pool = self
            .pools
            .get(service)
            .filter(|pool| !pool.base_urls.is_empty())
            .ok_or_else(|| CatalogError::unavailable(service, "no instances registered"))?;

        let slot = pool.next.fetch_add(1, Ordering::Relaxed) % pool.base_urls.len();
        Ok(pool.base_urls[slot].clone())
    }
}
