//! Core domain types for catalog aggregation.
//!
//! The JSON field names follow what the rating-data and movie-info providers
//! put on the wire (`movieId`, `rating`, `userRating`), with aliases for the
//! more generic `itemId` / `score` spelling.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier of a user as understood by the ratings provider
pub type UserId = String;

/// Identifier of a rated item; the only join key between ratings and items
pub type ItemId = String;

/// Description used for every catalog entry; there is no description provider
pub const DEFAULT_DESCRIPTION: &str = "desc";

/// Description carried by entries whose item lookup failed under a degrade policy
pub const PLACEHOLDER_DESCRIPTION: &str = "unavailable";

// =============================================================================
// Provider Types
// =============================================================================

/// One user's score for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(rename = "movieId", alias = "itemId")]
    pub item_id: ItemId,
    #[serde(rename = "rating", alias = "score")]
    pub score: i32,
}

impl Rating {
    pub fn new(item_id: impl Into<ItemId>, score: i32) -> Self {
        Self {
            item_id: item_id.into(),
            score,
        }
    }
}

/// The full, ordered rating set for a user
///
/// The list field is required: a body without it is a malformed answer, not
/// a user without ratings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRatings {
    #[serde(rename = "userRating", alias = "ratings")]
    pub ratings: Vec<Rating>,
}

impl UserRatings {
    pub fn new(ratings: Vec<Rating>) -> Self {
        Self { ratings }
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

/// Descriptive metadata for a rated item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

// =============================================================================
// Catalog Types
// =============================================================================

/// One row of the final catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub desc: String,
    pub rating: i32,
}

impl CatalogEntry {
    /// Combine an item with the rating it was looked up for
    pub fn from_lookup(item: &Item, rating: &Rating) -> Self {
        Self {
            name: item.name.clone(),
            desc: DEFAULT_DESCRIPTION.to_string(),
            rating: rating.score,
        }
    }

    /// Stand-in for a rating whose item lookup failed
    pub fn placeholder(rating: &Rating) -> Self {
        Self {
            name: rating.item_id.clone(),
            desc: PLACEHOLDER_DESCRIPTION.to_string(),
            rating: rating.score,
        }
    }
}

/// A failed item lookup recorded under a degrade policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// Position of the rating in the user's rating list
    pub index: usize,
    pub item_id: ItemId,
    pub error: CatalogError,
}

/// Result of one aggregation
///
/// `failures` is always empty when the aggregator runs fail-fast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    pub failures: Vec<ItemFailure>,
}

impl Catalog {
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_ratings_decodes_provider_shape() {
        let body = r#"{"userRating":[{"movieId":"m1","rating":4},{"movieId":"m2","rating":3}]}"#;
        let decoded: UserRatings = serde_json::from_str(body).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.ratings[0], Rating::new("m1", 4));
        assert_eq!(decoded.ratings[1], Rating::new("m2", 3));
    }

    #[test]
    fn test_user_ratings_accepts_generic_field_names() {
        let body = r#"{"ratings":[{"itemId":"m7","score":5}]}"#;
        let decoded: UserRatings = serde_json::from_str(body).unwrap();

        assert_eq!(decoded.ratings, vec![Rating::new("m7", 5)]);
    }

    #[test]
    fn test_user_ratings_rejects_wrong_score_type() {
        let body = r#"{"userRating":[{"movieId":"m1","rating":"four"}]}"#;
        assert!(serde_json::from_str::<UserRatings>(body).is_err());
    }

    #[test]
    fn test_user_ratings_requires_list_field() {
        assert!(serde_json::from_str::<UserRatings>("{}").is_err());
        assert!(serde_json::from_str::<UserRatings>(r#"{"error":"boom"}"#).is_err());
        assert!(serde_json::from_str::<UserRatings>(r#"{"userRatings":[]}"#).is_err());

        let empty: UserRatings = serde_json::from_str(r#"{"userRating":[]}"#).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_catalog_entry_wire_shape() {
        let entry = CatalogEntry::from_lookup(&Item::new("m1", "Alpha"), &Rating::new("m1", 4));
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"name": "Alpha", "desc": "desc", "rating": 4})
        );
    }

    #[test]
    fn test_placeholder_keeps_score_and_item_id() {
        let entry = CatalogEntry::placeholder(&Rating::new("m2", 3));

        assert_eq!(entry.name, "m2");
        assert_eq!(entry.desc, PLACEHOLDER_DESCRIPTION);
        assert_eq!(entry.rating, 3);
    }

    #[test]
    fn test_empty_catalog_is_not_degraded() {
        assert!(!Catalog::default().is_degraded());
    }
}
