//! HTTP routers for the two providers.
//!
//! Rating-data provider:
//! - `GET /rating/users/{user_id}` → `{"userRating": [{"movieId", "rating"}, ...]}`
//! - `GET /rating/{item_id}` → `{"movieId", "rating"}` (mean score)
//!
//! Movie-info provider:
//! - `GET /movie/{item_id}` → `{"id", "name"}`
//!
//! Unknown users and items answer 404.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::debug;

use catalog_types::{Item, Rating, UserRatings};

use crate::index::ProviderIndex;

type SharedIndex = Arc<ProviderIndex>;

#[derive(Serialize)]
struct NotFoundBody {
    error: String,
}

fn not_found(what: String) -> Response {
    (StatusCode::NOT_FOUND, Json(NotFoundBody { error: what })).into_response()
}

pub fn ratings_router(index: SharedIndex) -> Router {
    Router::new()
        .route("/rating/users/{user_id}", get(user_ratings_handler))
        .route("/rating/{item_id}", get(item_rating_handler))
        .with_state(index)
}

pub fn movies_router(index: SharedIndex) -> Router {
    Router::new()
        .route("/movie/{item_id}", get(movie_handler))
        .with_state(index)
}

async fn user_ratings_handler(
    State(index): State<SharedIndex>,
    Path(user_id): Path<String>,
) -> Result<Json<UserRatings>, Response> {
    let ratings = index
        .get_user_ratings(&user_id)
        .ok_or_else(|| not_found(format!("user {user_id} not found")))?;
    debug!("Serving {} ratings for user {}", ratings.len(), user_id);
    Ok(Json(ratings))
}

async fn item_rating_handler(
    State(index): State<SharedIndex>,
    Path(item_id): Path<String>,
) -> Result<Json<Rating>, Response> {
    let score = index
        .mean_score(&item_id)
        .ok_or_else(|| not_found(format!("no ratings for item {item_id}")))?;
    Ok(Json(Rating::new(item_id, score)))
}

async fn movie_handler(
    State(index): State<SharedIndex>,
    Path(item_id): Path<String>,
) -> Result<Json<Item>, Response> {
    index
        .get_item(&item_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found(format!("item {item_id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn spawn(router: Router) -> (String, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind provider");
        let addr = listener.local_addr().expect("Failed to get local address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Provider failed");
        });
        (format!("http://{}", addr), handle)
    }

    #[tokio::test]
    async fn test_user_ratings_wire_shape() {
        let (addr, handle) = spawn(ratings_router(Arc::new(ProviderIndex::demo()))).await;

        let body: serde_json::Value = reqwest::get(format!("{addr}/rating/users/u2"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(
            body,
            serde_json::json!({"userRating": [
                {"movieId": "m3", "rating": 5},
                {"movieId": "m1", "rating": 1}
            ]})
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_unknown_user_is_404() {
        let (addr, handle) = spawn(ratings_router(Arc::new(ProviderIndex::demo()))).await;

        let response = reqwest::get(format!("{addr}/rating/users/u404")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        handle.abort();
    }

    #[tokio::test]
    async fn test_item_rating_lookup() {
        let (addr, handle) = spawn(ratings_router(Arc::new(ProviderIndex::demo()))).await;

        let body: serde_json::Value = reqwest::get(format!("{addr}/rating/m3"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        // m3: 2 and 5 -> 3.5 -> 4
        assert_eq!(body, serde_json::json!({"movieId": "m3", "rating": 4}));

        let response = reqwest::get(format!("{addr}/rating/m4")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        handle.abort();
    }

    #[tokio::test]
    async fn test_movie_lookup() {
        let (addr, handle) = spawn(movies_router(Arc::new(ProviderIndex::demo()))).await;

        let body: serde_json::Value = reqwest::get(format!("{addr}/movie/m1"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, serde_json::json!({"id": "m1", "name": "Alpha"}));

        let response = reqwest::get(format!("{addr}/movie/m404")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        handle.abort();
    }
}
