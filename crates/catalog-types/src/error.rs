//! Error types shared by the clients, the aggregator and the HTTP layer.
//!
//! Every failure a provider call can produce is one of four kinds. The
//! aggregator propagates them unchanged, so the kind a caller sees is the
//! kind the failing call reported.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building a catalog
///
/// `Clone` is required because one failed lookup can fill several positions
/// of a catalog when the same item is rated more than once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Provider could not be resolved, reached, or answered in time
    #[error("{service} unavailable: {reason}")]
    UpstreamUnavailable { service: String, reason: String },

    /// Provider answered but the body did not have the expected shape
    #[error("unexpected response from {service}: {reason}")]
    Decode { service: String, reason: String },

    /// Provider explicitly reported that the resource does not exist
    #[error("{service} has no {resource}")]
    NotFound { service: String, resource: String },

    /// Caller supplied an identifier that can never be looked up
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },
}

/// Coarse classification of a [`CatalogError`], stable across releases and
/// safe to put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UpstreamUnavailable,
    DecodeError,
    NotFound,
    InvalidInput,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UpstreamUnavailable => "upstream_unavailable",
            ErrorKind::DecodeError => "decode_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidInput => "invalid_input",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            CatalogError::Decode { .. } => ErrorKind::DecodeError,
            CatalogError::NotFound { .. } => ErrorKind::NotFound,
            CatalogError::InvalidInput { .. } => ErrorKind::InvalidInput,
        }
    }

    pub fn unavailable(service: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogError::UpstreamUnavailable {
            service: service.into(),
            reason: reason.into(),
        }
    }

    pub fn decode(service: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogError::Decode {
            service: service.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(service: impl Into<String>, resource: impl Into<String>) -> Self {
        CatalogError::NotFound {
            service: service.into(),
            resource: resource.into(),
        }
    }

    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results in the catalog crates
pub type Result<T> = std::result::Result<T, CatalogError>;
