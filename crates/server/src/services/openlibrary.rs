//! OpenLibrary catalog client.
//!
//! The catalog proxy relays upstream JSON as-is. This client only checks that
//! the upstream answered successfully with JSON; it does not reshape or cache
//! anything, and it never retries.

use std::sync::Arc;

use booksearch_core::WorkId;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::OpenLibraryConfig;

/// Errors that can occur when talking to OpenLibrary.
#[derive(Debug, Error)]
pub enum OpenLibraryError {
    /// Transport failure or timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("upstream returned {0}")]
    Status(StatusCode),

    /// Upstream body was not JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built from the base URL.
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Client for the OpenLibrary search and works APIs.
#[derive(Clone)]
pub struct OpenLibraryClient {
    inner: Arc<OpenLibraryClientInner>,
}

struct OpenLibraryClientInner {
    client: reqwest::Client,
    base_url: Url,
    search_limit: u32,
}

impl OpenLibraryClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `OpenLibraryError::Http` if the HTTP client cannot be built.
    pub fn new(config: &OpenLibraryConfig) -> Result<Self, OpenLibraryError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("booksearch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // `Url::join` replaces the last path segment unless the base ends in '/'
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(OpenLibraryClientInner {
                client,
                base_url,
                search_limit: config.search_limit,
            }),
        })
    }

    /// Search the catalog: `GET {base}/search.json?q=<query>&limit=<N>`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a non-JSON body.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(&self, query: &str) -> Result<serde_json::Value, OpenLibraryError> {
        let url = self.inner.base_url.join("search.json")?;
        let limit = self.inner.search_limit.to_string();

        let request = self
            .inner
            .client
            .get(url)
            .query(&[("q", query), ("limit", limit.as_str())]);

        self.fetch_json(request).await
    }

    /// Fetch a work record: `GET {base}/works/{id}.json`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a non-JSON body.
    #[instrument(skip(self), fields(work_id = %id))]
    pub async fn work(&self, id: &WorkId) -> Result<serde_json::Value, OpenLibraryError> {
        let url = self.inner.base_url.join(&format!("works/{id}.json"))?;
        self.fetch_json(self.inner.client.get(url)).await
    }

    async fn fetch_json(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, OpenLibraryError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "OpenLibrary request failed");
            OpenLibraryError::Http(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "OpenLibrary returned non-success status"
            );
            return Err(OpenLibraryError::Status(status));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(
                error = %e,
                body = %body.chars().take(200).collect::<String>(),
                "OpenLibrary returned a non-JSON body"
            );
            OpenLibraryError::Parse(e)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> OpenLibraryClient {
        OpenLibraryClient::new(&OpenLibraryConfig {
            base_url: Url::parse(&server.uri()).unwrap(),
            search_limit: 20,
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_relays_upstream_body() {
        let server = MockServer::start().await;
        let body = json!({
            "numFound": 1,
            "docs": [{"key": "/works/OL893415W", "title": "Dune", "cover_i": 11_481_354}]
        });
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("q", "dune messiah"))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).search("dune messiah").await.unwrap();
        assert_eq!(result, body);
    }

    #[tokio::test]
    async fn test_work_fetches_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/works/OL45883W.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"title": "Emma", "covers": [1]})),
            )
            .mount(&server)
            .await;

        let id = WorkId::parse("/works/OL45883W").unwrap();
        let result = client_for(&server).work(&id).await.unwrap();
        assert_eq!(result["title"], "Emma");
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).search("dune").await.unwrap_err();
        assert!(matches!(err, OpenLibraryError::Status(StatusCode::SERVICE_UNAVAILABLE)));
    }

    #[tokio::test]
    async fn test_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let id = WorkId::parse("OL1W").unwrap();
        let err = client_for(&server).work(&id).await.unwrap_err();
        assert!(matches!(err, OpenLibraryError::Parse(_)));
    }

    #[tokio::test]
    async fn test_base_url_with_path_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mirror/search.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"docs": []})))
            .mount(&server)
            .await;

        let client = OpenLibraryClient::new(&OpenLibraryConfig {
            base_url: Url::parse(&format!("{}/mirror", server.uri())).unwrap(),
            search_limit: 5,
            timeout: Duration::from_secs(2),
        })
        .unwrap();
        assert!(client.search("x").await.is_ok());
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = OpenLibraryClient::new(&OpenLibraryConfig {
            base_url: Url::parse(&server.uri()).unwrap(),
            search_limit: 20,
            timeout: Duration::from_millis(200),
        })
        .unwrap();
        let err = client.search("slow").await.unwrap_err();
        assert!(matches!(err, OpenLibraryError::Http(_)));
    }
}
