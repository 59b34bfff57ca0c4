//! Dealer Locator: location discovery for multi-brand dealer group websites
//!
//! Given only the root URL of an automotive group's website, this crate finds
//! every dealership page reachable from it. Several partial discovery channels
//! (sitemaps, directory pages, JSON endpoints, a bounded crawl and a rendered
//! browser pass) are tried in a fixed fallback order and their output is
//! classified and deduplicated into a single [`CrawlResult`].

pub mod classifier;
pub mod config;
pub mod crawler;
pub mod dedupe;
pub mod model;
pub mod strategy;
pub mod url;

use thiserror::Error;

/// Main error type for dealer-locator operations
///
/// Only a handful of these ever escape [`StrategyOrchestrator::discover`]:
/// fetch and browser failures are absorbed by the strategy that hit them.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Failure of a single fetch
///
/// Always local: the page or path that failed contributes no candidates and
/// the strategy moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Malformed document at {url}: {message}")]
    MalformedDocument { url: String, message: String },
}

/// Failure reported by a [`crawler::BrowserSession`]
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation to {url} timed out")]
    Timeout { url: String },

    #[error("Script error: {0}")]
    Script(String),

    #[error("Browser session closed")]
    SessionClosed,
}

/// Result type alias for dealer-locator operations
pub type Result<T> = std::result::Result<T, LocatorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use classifier::{BrandTaxonomy, LinkClassifier};
pub use config::Config;
pub use crawler::{
    discover_locations, BrowserSession, DiscoveryRequest, Fetcher, HttpFetcher,
    StrategyOrchestrator,
};
pub use model::{CandidateLink, CrawlResult, DiscoveryMethod, LocationKind, NormalizedLocation};
pub use url::canonicalize_url;
