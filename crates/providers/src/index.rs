//! In-memory data behind the provider endpoints.
//!
//! The index owns every item and rating the providers serve. It is built
//! once, then shared read-only behind an `Arc` by the HTTP handlers.
//!
//! Three maps are kept:
//! - `items`: item id to its metadata, served by the movie-info provider
//! - `user_ratings`: user id to that user's ratings in insertion order, so
//!   the rating-data provider answers in the order ratings were recorded
//! - `item_scores`: item id to every score it received, used for the
//!   standalone per-item rating lookup
//!
//! A user present in `user_ratings` with an empty list is a known user
//! without ratings; a user absent from it is unknown and answers 404.
//!
//! Sources:
//! - [`ProviderIndex::demo`]: a fixed four-item data set for local runs
//! - [`ProviderIndex::load_from_dir`]: a MovieLens directory, both files
//!   parsed in parallel with rayon and then validated, so a rating that
//!   points at a movie missing from `movies.dat` fails the load

use crate::error::{LoadError, Result};
use crate::parser;
use catalog_types::{Item, ItemId, Rating, UserId, UserRatings};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default)]
pub struct ProviderIndex {
    items: HashMap<ItemId, Item>,
    /// Ratings per user, in insertion order
    user_ratings: HashMap<UserId, Vec<Rating>>,
    /// Every score each item received
    item_scores: HashMap<ItemId, Vec<i32>>,
}

impl ProviderIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small fixed data set for local runs and tests
    ///
    /// - items m1 "Alpha", m2 "Beta", m3 "Gamma", m4 "Delta"
    /// - u1 rates m1:4, m2:3, m3:2
    /// - u2 rates m3:5, m1:1
    /// - u0 exists without ratings
    pub fn demo() -> Self {
        let mut index = Self::new();
        for (id, name) in [("m1", "Alpha"), ("m2", "Beta"), ("m3", "Gamma"), ("m4", "Delta")] {
            index.insert_item(Item::new(id, name));
        }

        index.insert_user("u0");
        for (item_id, score) in [("m1", 4), ("m2", 3), ("m3", 2)] {
            index.insert_rating("u1", Rating::new(item_id, score));
        }
        for (item_id, score) in [("m3", 5), ("m1", 1)] {
            index.insert_rating("u2", Rating::new(item_id, score));
        }
        index
    }

    /// Load movies.dat and ratings.dat from a MovieLens directory
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        let movies_path = data_dir.join("movies.dat");
        let ratings_path = data_dir.join("ratings.dat");

        // Both files are independent; parse them in parallel
        let (items, records) = rayon::join(
            || parser::parse_movies(&movies_path),
            || parser::parse_ratings(&ratings_path),
        );
        let items = items?;
        let records = records?;

        let mut index = Self::new();
        for item in items {
            index.insert_item(item);
        }
        for record in records {
            index.insert_rating(&record.user_id, record.rating);
        }
        index.validate()?;

        let (items, users, ratings) = index.counts();
        info!(
            "Loaded {} items, {} users, {} ratings from {}",
            items,
            users,
            ratings,
            data_dir.display()
        );
        Ok(index)
    }

    pub fn get_item(&self, item_id: &str) -> Option<&Item> {
        self.items.get(item_id)
    }

    /// `None` for an unknown user, an empty list for a user without ratings
    pub fn get_user_ratings(&self, user_id: &str) -> Option<UserRatings> {
        self.user_ratings
            .get(user_id)
            .map(|ratings| UserRatings::new(ratings.clone()))
    }

    /// Mean score an item received, rounded to the nearest integer
    pub fn mean_score(&self, item_id: &str) -> Option<i32> {
        let scores = self.item_scores.get(item_id).filter(|s| !s.is_empty())?;
        let total: i64 = scores.iter().map(|&s| i64::from(s)).sum();
        Some((total as f64 / scores.len() as f64).round() as i32)
    }

    pub fn insert_item(&mut self, item: Item) {
        self.items.insert(item.id.clone(), item);
    }

    /// Register a user, even one without ratings
    pub fn insert_user(&mut self, user_id: &str) {
        self.user_ratings.entry(user_id.to_string()).or_default();
    }

    pub fn insert_rating(&mut self, user_id: &str, rating: Rating) {
        self.item_scores
            .entry(rating.item_id.clone())
            .or_default()
            .push(rating.score);
        self.user_ratings
            .entry(user_id.to_string())
            .or_default()
            .push(rating);
    }

    /// Every rating must reference a known item and score in 1..=5
    pub fn validate(&self) -> Result<()> {
        for rating in self.user_ratings.values().flatten() {
            if !self.items.contains_key(&rating.item_id) {
                return Err(LoadError::MissingReference {
                    entity: "Movie".to_string(),
                    id: rating.item_id.clone(),
                });
            }
            if !(1..=5).contains(&rating.score) {
                return Err(LoadError::InvalidValue {
                    field: "rating".to_string(),
                    value: rating.score.to_string(),
                });
            }
        }
        Ok(())
    }

    /// (items, users, ratings) for logging
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_ratings = self.user_ratings.values().map(|v| v.len()).sum();
        (self.items.len(), self.user_ratings.len(), total_ratings)
    }
}
