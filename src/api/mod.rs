//! HTTP surface: a thin pass-through from query strings to the movies DAO.

pub mod movies;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::dao::MoviesDao;

pub const MOVIES_PATH: &str = "/api/v1/movies";

#[derive(Debug, Clone)]
pub struct AppState {
    pub dao: MoviesDao,
}

/// Builds the router: the movies listing plus a JSON 404 for everything else.
pub fn router(dao: MoviesDao) -> Router {
    Router::new()
        .route(MOVIES_PATH, get(movies::list_movies))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .with_state(AppState { dao })
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}
