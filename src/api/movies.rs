use axum::Json;
use axum::extract::{Query, State};
use bson::Bson;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::dao::{DEFAULT_PAGE_SIZE, FilterSpec, MovieFilter, PageRequest};

/// Query string of `GET /api/v1/movies`. Everything arrives as text so a bad
/// number falls back to its default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviesQuery {
    pub title: Option<String>,
    pub rated: Option<String>,
    pub page: Option<String>,
    #[serde(alias = "pageSize")]
    pub movies_per_page: Option<String>,
}

impl MoviesQuery {
    #[must_use]
    pub fn filter_spec(&self) -> FilterSpec {
        let present = |v: &Option<String>| v.as_ref().filter(|s| !s.is_empty()).cloned();
        FilterSpec { title: present(&self.title), rated: present(&self.rated) }
    }

    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(parse_or(self.page.as_deref(), 0), parse_or(self.movies_per_page.as_deref(), DEFAULT_PAGE_SIZE))
    }
}

fn parse_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MoviesResponse {
    pub movies: Vec<serde_json::Value>,
    pub page: i64,
    pub filters: FilterSpec,
    pub entries_per_page: i64,
    pub total_results: u64,
}

pub async fn list_movies(State(state): State<AppState>, Query(params): Query<MoviesQuery>) -> Json<MoviesResponse> {
    let filters = params.filter_spec();
    let page = params.page_request();
    let filter = MovieFilter::from(filters.clone());
    log::debug!("GET /api/v1/movies filter={filter:?} page={} size={}", page.page, page.page_size);
    let result = state.dao.get_movies(&filter, page).await;
    Json(MoviesResponse {
        movies: result.items.into_iter().map(|d| Bson::Document(d).into_relaxed_extjson()).collect(),
        page: page.page,
        filters,
        entries_per_page: page.page_size,
        total_results: result.total_matching,
    })
}
