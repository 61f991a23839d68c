//! # Catalog Types Crate
//!
//! Domain types and the error taxonomy shared by every crate in the
//! workspace.
//!
//! ## Main Components
//!
//! - **types**: `Rating`, `UserRatings`, `Item`, `CatalogEntry`, `Catalog`
//! - **error**: `CatalogError` and its wire-safe `ErrorKind`

pub mod error;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CatalogError, ErrorKind, Result};
pub use types::{
    // Type aliases
    ItemId,
    UserId,
    // Core types
    Catalog,
    CatalogEntry,
    Item,
    ItemFailure,
    Rating,
    UserRatings,
    // Constants
    DEFAULT_DESCRIPTION,
    PLACEHOLDER_DESCRIPTION,
};
