//! HTTP route handlers for the BookSearch API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Catalog (proxied to OpenLibrary)
//! GET  /api/books/search?q=    - Search results, relayed as-is
//! GET  /api/books/{id}         - Work details, relayed as-is
//!
//! # Auth
//! POST /api/auth/register      - Create account, returns {token, email}
//! POST /api/auth/login         - Sign in, returns {token, email}
//! ```

pub mod auth;
pub mod books;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};

use crate::error::AppError;
use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the catalog routes router.
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(books::search))
        .route("/{id}", get(books::details))
        .layer(api_rate_limiter())
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/books", book_routes())
        .nest("/api/auth", auth_routes())
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}
