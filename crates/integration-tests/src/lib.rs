//! End-to-end tests for BookSearch.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and the server
//! booksearch migrate
//! cargo run -p booksearch-server
//!
//! # Run the live tests
//! cargo test -p booksearch-integration-tests -- --ignored
//! ```
//!
//! The server under test is `BOOKSEARCH_TEST_URL` (default
//! `http://localhost:5001`). Catalog tests also need OpenLibrary to be
//! reachable from the server.

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;
use serde::Deserialize;

/// Default server address when `BOOKSEARCH_TEST_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5001";

/// Body of every error response.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Body of a successful login or registration.
#[derive(Debug, Deserialize)]
pub struct AuthBody {
    pub token: String,
    pub email: String,
}

/// Shared client and server address for a test.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        let base_url = std::env::var("BOOKSEARCH_TEST_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Absolute URL for a server path such as `/api/books/search`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A fresh address so registration tests never collide.
#[must_use]
pub fn unique_email() -> String {
    format!("reader-{}@example.com", uuid::Uuid::new_v4().simple())
}
