//! Catalog proxy handlers.
//!
//! Both endpoints relay the OpenLibrary response body unchanged. Any upstream
//! problem becomes a generic 500.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use booksearch_core::WorkId;

use crate::error::{AppError, DETAILS_FAILED, Result, SEARCH_FAILED};
use crate::state::AppState;

/// Query parameters for `/api/books/search`.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Search the catalog.
///
/// `GET /api/books/search?q=<term>`
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<serde_json::Value>> {
    let term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::BadRequest("Search term is required".to_string()))?;

    let body = state
        .openlibrary()
        .search(term)
        .await
        .map_err(|e| AppError::upstream(SEARCH_FAILED, e))?;

    Ok(Json(body))
}

/// Fetch details for one work.
///
/// `GET /api/books/{id}` where `id` is an OpenLibrary work id such as `OL45883W`.
#[instrument(skip(state))]
pub async fn details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = WorkId::parse(&id).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let body = state
        .openlibrary()
        .work(&id)
        .await
        .map_err(|e| AppError::upstream(DETAILS_FAILED, e))?;

    Ok(Json(body))
}
