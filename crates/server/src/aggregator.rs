//! # Catalog Aggregator
//!
//! Builds a user's catalog from two providers:
//! 1. Fetch the user's ratings (one call, must succeed)
//! 2. Fan out one item lookup per distinct rated item, concurrently
//! 3. Join every lookup into a slot indexed by rating position
//! 4. Zip ratings and items by position into catalog entries
//!
//! Output order is the rating order, never the completion order of the
//! lookups. What happens when a lookup fails is decided by [`FailurePolicy`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use clap::ValueEnum;
use tokio::task::{self, JoinSet};
use tracing::{debug, info, instrument, warn};

use catalog_types::{
    Catalog, CatalogEntry, CatalogError, Item, ItemFailure, ItemId, Rating, Result, UserRatings,
};
use clients::{ItemSource, MOVIE_INFO_SERVICE, RatingsSource};

/// What to do when an item lookup fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicy {
    /// First failed lookup aborts the whole catalog and cancels the rest
    #[default]
    FailFast,
    /// Await every lookup, substitute a placeholder entry for failures
    Placeholder,
    /// Await every lookup, leave failed entries out
    Omit,
}

impl FailurePolicy {
    pub fn is_degraded(&self) -> bool {
        !matches!(self, FailurePolicy::FailFast)
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::FailFast => write!(f, "fail-fast"),
            FailurePolicy::Placeholder => write!(f, "placeholder"),
            FailurePolicy::Omit => write!(f, "omit"),
        }
    }
}

/// Outcome of one item lookup, stored at every position the item occupies
pub type LookupSlot = Result<Item>;

/// Stateless pipeline: every `get_catalog` call is self-contained.
#[derive(Clone)]
pub struct CatalogAggregator {
    ratings: Arc<dyn RatingsSource>,
    items: Arc<dyn ItemSource>,
    policy: FailurePolicy,
}

impl CatalogAggregator {
    pub fn new(ratings: Arc<dyn RatingsSource>, items: Arc<dyn ItemSource>) -> Self {
        Self {
            ratings,
            items,
            policy: FailurePolicy::default(),
        }
    }

    /// Configure the partial-failure policy (default: fail-fast)
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Main entry point: build the catalog for one user
    #[instrument(skip(self), fields(policy = %self.policy))]
    pub async fn get_catalog(&self, user_id: &str) -> Result<Catalog> {
        let start_time = Instant::now();

        // Without the rating list there is nothing to aggregate
        let user_ratings = self.ratings.fetch_user_ratings(user_id).await?;
        if user_ratings.is_empty() {
            info!("User {} has no ratings, returning empty catalog", user_id);
            return Ok(Catalog::default());
        }

        let lookups = self.fan_out(&user_ratings).await?;
        let catalog = merge_positional(&user_ratings.ratings, lookups, self.policy)?;

        for failure in &catalog.failures {
            warn!(
                "Item {} at position {} unavailable for user {}: {}",
                failure.item_id, failure.index, user_id, failure.error
            );
        }
        info!(
            "Built catalog for user {}: {} entries, {} failures in {:.2?}",
            user_id,
            catalog.entries.len(),
            catalog.failures.len(),
            start_time.elapsed()
        );
        Ok(catalog)
    }

    /// Look up every rated item concurrently.
    ///
    /// Returns one slot per rating, in rating order. Each distinct item id
    /// is fetched once by one task, and only that task's result is written
    /// to the positions where the id occurs. Tasks are tracked by id so a
    /// lookup that panics still fills its own positions with an error.
    async fn fan_out(&self, user_ratings: &UserRatings) -> Result<Vec<LookupSlot>> {
        let owners = group_positions(&user_ratings.ratings);
        debug!(
            "Dispatching {} item lookups for {} ratings",
            owners.len(),
            user_ratings.len()
        );

        let mut tasks = JoinSet::new();
        let mut owned_by: HashMap<task::Id, (ItemId, Vec<usize>)> = HashMap::new();
        for (item_id, positions) in owners {
            let items = Arc::clone(&self.items);
            let lookup_id = item_id.clone();
            let handle = tasks.spawn(async move { items.fetch_item(&lookup_id).await });
            owned_by.insert(handle.id(), (item_id, positions));
        }

        let mut slots: Vec<Option<LookupSlot>> = vec![None; user_ratings.len()];
        while let Some(joined) = tasks.join_next_with_id().await {
            let (task_id, result) = match joined {
                Ok((task_id, result)) => (task_id, result),
                // A panicked lookup still owns its positions
                Err(e) => (
                    e.id(),
                    Err(CatalogError::unavailable(
                        MOVIE_INFO_SERVICE,
                        format!("item lookup task failed: {e}"),
                    )),
                ),
            };

            if let Err(err) = &result {
                if !self.policy.is_degraded() {
                    debug!("Item lookup failed, cancelling {} in-flight lookups", tasks.len());
                    tasks.abort_all();
                    return Err(err.clone());
                }
            }

            let Some((item_id, positions)) = owned_by.remove(&task_id) else {
                continue;
            };
            if let Err(err) = &result {
                debug!("Lookup for item {} failed: {}", item_id, err);
            }
            for position in positions {
                slots[position] = Some(result.clone());
            }
        }

        // Every position belongs to exactly one task, so all slots are filled
        slots
            .into_iter()
            .enumerate()
            .map(|(position, slot)| {
                slot.ok_or_else(|| {
                    CatalogError::unavailable(
                        MOVIE_INFO_SERVICE,
                        format!("no lookup result for position {position}"),
                    )
                })
            })
            .collect()
    }
}

/// Group rating positions by item id, in first-seen order
fn group_positions(ratings: &[Rating]) -> Vec<(ItemId, Vec<usize>)> {
    let mut owners: Vec<(ItemId, Vec<usize>)> = Vec::new();
    let mut owner_of: HashMap<&str, usize> = HashMap::new();

    for (position, rating) in ratings.iter().enumerate() {
        match owner_of.get(rating.item_id.as_str()) {
            Some(&owner) => owners[owner].1.push(position),
            None => {
                owner_of.insert(rating.item_id.as_str(), owners.len());
                owners.push((rating.item_id.clone(), vec![position]));
            }
        }
    }
    owners
}

/// Zip ratings and lookup results by position into a catalog.
///
/// `lookups[i]` must be the lookup for `ratings[i]`. Under
/// [`FailurePolicy::FailFast`] the first failure in rating order is returned.
pub fn merge_positional(
    ratings: &[Rating],
    lookups: Vec<LookupSlot>,
    policy: FailurePolicy,
) -> Result<Catalog> {
    if ratings.len() != lookups.len() {
        return Err(CatalogError::unavailable(
            MOVIE_INFO_SERVICE,
            format!(
                "expected {} lookup results, got {}",
                ratings.len(),
                lookups.len()
            ),
        ));
    }

    let mut catalog = Catalog {
        entries: Vec::with_capacity(ratings.len()),
        failures: Vec::new(),
    };

    for (index, (rating, lookup)) in ratings.iter().zip(lookups).enumerate() {
        match (lookup, policy) {
            (Ok(item), _) => catalog.entries.push(CatalogEntry::from_lookup(&item, rating)),
            (Err(error), FailurePolicy::FailFast) => return Err(error),
            (Err(error), degraded) => {
                if degraded == FailurePolicy::Placeholder {
                    catalog.entries.push(CatalogEntry::placeholder(rating));
                }
                catalog.failures.push(ItemFailure {
                    index,
                    item_id: rating.item_id.clone(),
                    error,
                });
            }
        }
    }

    Ok(catalog)
}
