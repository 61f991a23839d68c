//! HTTP surface of the catalog service.
//!
//! - `GET /catalog/{user_id}`: JSON array of catalog entries
//! - `GET /catalog/{user_id}/report`: entries plus per-item failures
//! - `GET /health`: liveness

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use thiserror::Error;

use catalog_types::{Catalog, CatalogEntry, CatalogError, ErrorKind, ItemFailure};

use crate::aggregator::CatalogAggregator;

/// Header carrying the number of failed lookups in a degraded catalog
pub const FAILURES_HEADER: &str = "x-catalog-failures";

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<CatalogAggregator>,
}

impl AppState {
    pub fn new(aggregator: CatalogAggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/catalog/{user_id}", get(catalog_handler))
        .route("/catalog/{user_id}/report", get(report_handler))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct ApiError(#[from] CatalogError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: ErrorKind,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = match kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::UpstreamUnavailable | ErrorKind::DecodeError => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            tracing::error!("Catalog request failed: {}", self.0);
        }

        let body = ErrorBody {
            error: self.0.to_string(),
            kind,
        };
        (status, Json(body)).into_response()
    }
}

async fn catalog_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let catalog = state.aggregator.get_catalog(&user_id).await?;
    let failures = catalog.failures.len();

    let mut response = Json(catalog.entries).into_response();
    if failures > 0 {
        response
            .headers_mut()
            .insert(FAILURES_HEADER, HeaderValue::from(failures));
    }
    Ok(response)
}

/// Serialized form of an [`ItemFailure`]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub index: usize,
    pub item_id: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl From<ItemFailure> for FailureReport {
    fn from(failure: ItemFailure) -> Self {
        Self {
            index: failure.index,
            item_id: failure.item_id,
            kind: failure.error.kind(),
            message: failure.error.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogReport {
    pub entries: Vec<CatalogEntry>,
    pub failures: Vec<FailureReport>,
}

impl From<Catalog> for CatalogReport {
    fn from(catalog: Catalog) -> Self {
        Self {
            entries: catalog.entries,
            failures: catalog.failures.into_iter().map(FailureReport::from).collect(),
        }
    }
}

async fn report_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<CatalogReport>, ApiError> {
    let catalog = state.aggregator.get_catalog(&user_id).await?;
    Ok(Json(CatalogReport::from(catalog)))
}
