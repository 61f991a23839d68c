//! Client for the rating-data provider.

use crate::http::{ClientOptions, ProviderHttp};
use crate::resolver::{RATING_DATA_SERVICE, ServiceResolver};
use crate::RatingsSource;
use async_trait::async_trait;
use catalog_types::{CatalogError, Rating, Result, UserRatings};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Reads ratings from `RATING-DATA-SERVICE`.
///
/// Cloning is cheap; clones share the connection pool and resolver.
#[derive(Clone)]
pub struct RatingsClient {
    http: ProviderHttp,
}

impl RatingsClient {
    pub fn new(
        client: reqwest::Client,
        resolver: Arc<dyn ServiceResolver>,
        options: &ClientOptions,
    ) -> Self {
        Self {
            http: ProviderHttp::new(client, resolver, RATING_DATA_SERVICE, options.request_timeout),
        }
    }

    /// Standalone lookup of the rating recorded for one item
    /// (`GET /rating/{itemId}`). Not part of catalog aggregation.
    #[instrument(skip(self))]
    pub async fn fetch_item_rating(&self, item_id: &str) -> Result<Rating> {
        if item_id.is_empty() {
            return Err(CatalogError::invalid_input("item_id", "must not be empty"));
        }
        self.http
            .get_json(&["rating", item_id], &format!("rating for item {item_id}"))
            .await
    }
}

#[async_trait]
impl RatingsSource for RatingsClient {
    #[instrument(skip(self))]
    async fn fetch_user_ratings(&self, user_id: &str) -> Result<UserRatings> {
        if user_id.is_empty() {
            return Err(CatalogError::invalid_input("user_id", "must not be empty"));
        }

        let ratings: UserRatings = self
            .http
            .get_json(&["rating", "users", user_id], &format!("user {user_id}"))
            .await?;

        debug!(
            service = self.http.service(),
            "Fetched {} ratings for user {}",
            ratings.len(),
            user_id
        );
        Ok(ratings)
    }
}
