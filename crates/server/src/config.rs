//! Service configuration: command-line flags with environment fallbacks.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;

use clients::{
    ClientOptions, ItemClient, MOVIE_INFO_SERVICE, RATING_DATA_SERVICE, RatingsClient,
    RoundRobinResolver, ServiceResolver, StaticResolver, build_http_client,
};

use crate::aggregator::{CatalogAggregator, FailurePolicy};

const DEFAULT_BIND: &str = "127.0.0.1:8081";
const DEFAULT_RATINGS_URL: &str = "http://127.0.0.1:8083";
const DEFAULT_MOVIES_URL: &str = "http://127.0.0.1:8082";

/// Where the providers live and how to talk to them
#[derive(Debug, Clone, Args)]
pub struct UpstreamConfig {
    /// Base URL(s) of the rating-data provider; several enable round-robin
    #[arg(long = "ratings-url", env = "RATING_DATA_SERVICE_URL", value_delimiter = ',', default_value = DEFAULT_RATINGS_URL)]
    pub ratings_urls: Vec<String>,

    /// Base URL(s) of the movie-info provider; several enable round-robin
    #[arg(long = "movies-url", env = "MOVIE_INFO_SERVICE_URL", value_delimiter = ',', default_value = DEFAULT_MOVIES_URL)]
    pub movies_urls: Vec<String>,

    /// TCP connect timeout for provider calls, in milliseconds
    #[arg(long, env = "CATALOG_CONNECT_TIMEOUT_MS", default_value_t = 1000)]
    pub connect_timeout_ms: u64,

    /// Whole-request timeout for each provider call, in milliseconds
    #[arg(long, env = "CATALOG_REQUEST_TIMEOUT_MS", default_value_t = 2000)]
    pub request_timeout_ms: u64,

    /// What to do when an item lookup fails
    #[arg(long, env = "CATALOG_FAILURE_POLICY", value_enum, default_value_t = FailurePolicy::FailFast)]
    pub failure_policy: FailurePolicy,
}

impl UpstreamConfig {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    /// One address per service gives a static map, more give round-robin
    pub fn build_resolver(&self) -> Result<Arc<dyn ServiceResolver>> {
        if self.ratings_urls.is_empty() {
            bail!("at least one --ratings-url is required");
        }
        if self.movies_urls.is_empty() {
            bail!("at least one --movies-url is required");
        }

        if self.ratings_urls.len() == 1 && self.movies_urls.len() == 1 {
            let resolver = StaticResolver::new()
                .with_service(RATING_DATA_SERVICE, self.ratings_urls[0].clone())
                .with_service(MOVIE_INFO_SERVICE, self.movies_urls[0].clone());
            return Ok(Arc::new(resolver));
        }

        let resolver = RoundRobinResolver::new()
            .with_instances(RATING_DATA_SERVICE, self.ratings_urls.iter().cloned())
            .with_instances(MOVIE_INFO_SERVICE, self.movies_urls.iter().cloned());
        Ok(Arc::new(resolver))
    }

    pub fn ratings_client(&self) -> Result<RatingsClient> {
        let options = self.client_options();
        let http = build_http_client(&options).context("Building HTTP client")?;
        Ok(RatingsClient::new(http, self.build_resolver()?, &options))
    }

    /// Wire both clients onto one connection pool and resolver
    pub fn build_aggregator(&self) -> Result<CatalogAggregator> {
        let options = self.client_options();
        let http = build_http_client(&options).context("Building HTTP client")?;
        let resolver = self.build_resolver()?;

        let ratings = RatingsClient::new(http.clone(), resolver.clone(), &options);
        let items = ItemClient::new(http, resolver, &options);

        Ok(CatalogAggregator::new(Arc::new(ratings), Arc::new(items))
            .with_policy(self.failure_policy))
    }
}

/// Everything the catalog service needs to start
#[derive(Debug, Clone, Args)]
pub struct ServiceConfig {
    /// Address the catalog service listens on
    #[arg(long, env = "CATALOG_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    #[command(flatten)]
    pub upstream: UpstreamConfig,
}
