//! Client for the movie-info provider.

use crate::http::{ClientOptions, ProviderHttp};
use crate::resolver::{MOVIE_INFO_SERVICE, ServiceResolver};
use crate::ItemSource;
use async_trait::async_trait;
use catalog_types::{CatalogError, Item, Result};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Reads item metadata from `MOVIE-INFO-SERVICE`, one request per item.
#[derive(Clone)]
pub struct ItemClient {
    http: ProviderHttp,
}

impl ItemClient {
    pub fn new(
        client: reqwest::Client,
        resolver: Arc<dyn ServiceResolver>,
        options: &ClientOptions,
    ) -> Self {
        Self {
            http: ProviderHttp::new(client, resolver, MOVIE_INFO_SERVICE, options.request_timeout),
        }
    }
}

#[async_trait]
impl ItemSource for ItemClient {
    #[instrument(skip(self))]
    async fn fetch_item(&self, item_id: &str) -> Result<Item> {
        if item_id.is_empty() {
            return Err(CatalogError::invalid_input("item_id", "must not be empty"));
        }

        let item: Item = self
            .http
            .get_json(&["movie", item_id], &format!("item {item_id}"))
            .await?;

        // The id is the join key; an answer about another item is unusable.
        if !item.id.is_empty() && item.id != item_id {
            return Err(CatalogError::decode(
                MOVIE_INFO_SERVICE,
                format!("asked for item {item_id}, got item {}", item.id),
            ));
        }

        debug!("Fetched item {} ({})", item_id, item.name);
        Ok(item)
    }
}
