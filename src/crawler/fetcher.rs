//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made during discovery:
//! - Building the shared HTTP client with the configured user agent
//! - GET requests for HTML and XML documents
//! - GET requests for JSON endpoints
//! - Per-host concurrency limits
//! - Error classification
//!
//! Strategies only see the [`Fetcher`] trait, so tests can substitute a
//! canned implementation.

use crate::config::FetcherConfig;
use crate::crawler::limiter::HostLimiter;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

/// A fetched document
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status: u16,

    /// Content-Type header value (empty when absent)
    pub content_type: String,

    /// Response body
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Source of documents for the discovery strategies
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a document
    ///
    /// Any HTTP status is returned as `Ok`; only transport failures are errors.
    async fn get(&self, url: &Url, timeout: Duration) -> Result<FetchedPage, FetchError>;

    /// Fetches and parses a JSON document
    ///
    /// A non-2xx status or a body that is not JSON is an error.
    async fn get_json(&self, url: &Url, timeout: Duration)
        -> Result<serde_json::Value, FetchError>;

    /// Fetches a document, treating a non-2xx status as an error
    async fn get_success(&self, url: &Url, timeout: Duration) -> Result<FetchedPage, FetchError> {
        let page = self.get(url, timeout).await?;
        if page.is_success() {
            Ok(page)
        } else {
            Err(FetchError::Status {
                url: url.to_string(),
                status: page.status,
            })
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use dealer_locator::config::FetcherConfig;
/// use dealer_locator::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

#[derive(Debug)]
struct HttpFetcherInner {
    client: Client,
    limiter: HostLimiter,
}

/// [`Fetcher`] backed by reqwest
///
/// Cheap to clone; clones share the client and the per-host limits, so one
/// instance can serve many concurrent discovery runs.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    inner: Arc<HttpFetcherInner>,
}

impl HttpFetcher {
    /// Creates a fetcher from the `[fetcher]` config section
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        let limiter = HostLimiter::new(
            config.max_concurrent_per_host,
            config.min_request_interval(),
        );

        Ok(Self {
            inner: Arc::new(HttpFetcherInner { client, limiter }),
        })
    }

    async fn send(
        &self,
        url: &Url,
        timeout: Duration,
        accept: Option<&str>,
    ) -> Result<reqwest::Response, FetchError> {
        let started = Instant::now();
        let host = url.host_str().unwrap_or("");
        let _permit = tokio::time::timeout(timeout, self.inner.limiter.acquire(host))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
            })?;

        // waiting for the host slot spends the same budget as the request
        let remaining = timeout.saturating_sub(started.elapsed());
        let mut request = self.inner.client.get(url.clone()).timeout(remaining);
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }

        tracing::debug!("GET {}", url);
        request.send().await.map_err(|e| classify_error(url, e))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &Url, timeout: Duration) -> Result<FetchedPage, FetchError> {
        let response = self.send(url, timeout, None).await?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        tracing::trace!("{} -> {} ({} bytes)", url, status, body.len());

        Ok(FetchedPage {
            final_url,
            status,
            content_type,
            body,
        })
    }

    async fn get_json(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> Result<serde_json::Value, FetchError> {
        let response = self.send(url, timeout, Some("application/json")).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        serde_json::from_str(&body).map_err(|e| FetchError::MalformedDocument {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Maps a reqwest error onto the fetch error kinds strategies care about
fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
