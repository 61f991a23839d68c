//! Provider clients for the catalog aggregator.
//!
//! This crate talks to the two upstream providers over HTTP/JSON:
//! - `RATING-DATA-SERVICE`: every rating a user has made
//! - `MOVIE-INFO-SERVICE`: descriptive metadata for one item
//!
//! Both clients resolve the provider address through an injected
//! [`ServiceResolver`] on every call, carry a per-request timeout, make a
//! single attempt, and report failures as [`catalog_types::CatalogError`].
//!
//! The aggregator depends only on the [`RatingsSource`] and [`ItemSource`]
//! traits, so tests can drive it with in-memory fakes.

use async_trait::async_trait;
use catalog_types::{Item, Result, UserRatings};

pub mod http;
pub mod items;
pub mod ratings;
pub mod resolver;

pub use http::{ClientOptions, build_http_client};
pub use items::ItemClient;
pub use ratings::RatingsClient;
pub use resolver::{
    MOVIE_INFO_SERVICE, RATING_DATA_SERVICE, RoundRobinResolver, ServiceResolver, StaticResolver,
};

/// Where the aggregator gets a user's rating list from.
#[async_trait]
pub trait RatingsSource: Send + Sync {
    /// Fetch every rating of `user_id`, in provider order.
    ///
    /// An empty list is a valid answer; an unknown user is `NotFound`.
    async fn fetch_user_ratings(&self, user_id: &str) -> Result<UserRatings>;
}

/// Where the aggregator gets item metadata from.
///
/// Implementations are called concurrently for different items and must not
/// share mutable state between calls.
#[async_trait]
pub trait ItemSource: Send + Sync {
    async fn fetch_item(&self, item_id: &str) -> Result<Item>;
}
