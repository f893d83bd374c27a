//! Client for the BookSearch server API.
//!
//! Server-side validation messages (`{"error": "..."}`) are surfaced verbatim.
//! Transport failures collapse into one generic message; details go to the log.

use std::time::Duration;

use booksearch_core::{SearchResults, Session, WorkDetails, WorkId};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors from [`ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required input missing; no request was sent.
    #[error("{0}")]
    Validation(&'static str),

    /// The server answered with an error status.
    #[error("{0}")]
    Rejected(String),

    /// The server could not be reached.
    #[error("Could not reach the BookSearch server. Is it running?")]
    Unreachable(#[source] reqwest::Error),

    /// The server answered with a body we could not read.
    #[error("Unexpected response from the BookSearch server")]
    Parse(#[source] reqwest::Error),

    /// Endpoint URL could not be built from the base URL.
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    token: String,
    email: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for `/api/books` and `/api/auth`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`] if the HTTP client cannot be built.
    pub fn new(base_url: &Url) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("booksearch-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Client)?;

        let mut base_url = base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    /// Search the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank query, otherwise any
    /// transport or server error.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<SearchResults, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::Validation("Enter a search term"));
        }

        let url = self.base_url.join("api/books/search")?;
        self.send(self.client.get(url).query(&[("q", query)])).await
    }

    /// Fetch details for one work.
    ///
    /// # Errors
    ///
    /// Returns any transport or server error.
    #[instrument(skip(self), fields(work_id = %id))]
    pub async fn work_details(&self, id: &WorkId) -> Result<WorkDetails, ApiError> {
        let url = self.base_url.join(&format!("api/books/{id}"))?;
        self.send(self.client.get(url)).await
    }

    /// Sign in and return the session to persist.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for empty input, or the server's
    /// rejection (e.g. `Invalid credentials`).
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Session, ApiError> {
        self.authenticate("api/auth/login", email, password).await
    }

    /// Create an account and return the session to persist.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for empty input, or the server's
    /// rejection (weak password, account exists, ...).
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, ApiError> {
        self.authenticate("api/auth/register", email, password).await
    }

    async fn authenticate(
        &self,
        endpoint: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, ApiError> {
        let email = email.trim();
        if email.is_empty() || password.expose_secret().is_empty() {
            return Err(ApiError::Validation("Email and password are required"));
        }

        let url = self.base_url.join(endpoint)?;
        let body = Credentials {
            email,
            password: password.expose_secret(),
        };
        let auth: AuthResponse = self.send(self.client.post(url).json(&body)).await?;

        Ok(Session {
            token: auth.token,
            email: auth.email,
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "request to BookSearch server failed");
            ApiError::Unreachable(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => format!("Request failed ({status})"),
            };
            tracing::debug!(%status, %message, "server rejected request");
            return Err(ApiError::Rejected(message));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::warn!(error = %e, "unreadable response from BookSearch server");
            ApiError::Parse(e)
        })
    }
}
