//! Core data types produced by discovery
//!
//! A strategy emits [`CandidateLink`]s, the deduplicator turns the accepted
//! ones into [`NormalizedLocation`]s, and the orchestrator hands a single
//! [`CrawlResult`] back to the caller.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Which discovery channel produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    Sitemap,
    KnownPages,
    Api,
    DeepCrawl,
    Rendered,
    /// No strategy found anything
    None,
}

impl DiscoveryMethod {
    /// Returns the snake_case name used in logs and JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sitemap => "sitemap",
            Self::KnownPages => "known_pages",
            Self::Api => "api",
            Self::DeepCrawl => "deep_crawl",
            Self::Rendered => "rendered",
            Self::None => "none",
        }
    }
}

impl fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a discovered location lives relative to the group's root site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// A page on the group's own site (e.g. `/dealers/kendall-mazda`)
    InternalPage,
    /// A dealership's own website (e.g. `kendallford.com`)
    ExternalSite,
    Unknown,
}

/// A raw link found by a strategy
///
/// Lives only for the duration of one strategy execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    /// Absolute URL as found (after resolving relative hrefs)
    pub raw_url: String,

    /// Visible anchor text, trimmed; empty for sitemap/JSON sources
    pub anchor_text: String,

    pub discovered_via: DiscoveryMethod,
}

impl CandidateLink {
    pub fn new(
        raw_url: impl Into<String>,
        anchor_text: impl Into<String>,
        discovered_via: DiscoveryMethod,
    ) -> Self {
        Self {
            raw_url: raw_url.into(),
            anchor_text: anchor_text.into(),
            discovered_via,
        }
    }
}

/// One real-world dealership
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedLocation {
    pub canonical_url: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealer_id: Option<String>,
    pub classification: LocationKind,
}

/// Final output of a discovery run
///
/// `total_found` is always derived from `locations`; there is no way to set
/// it independently. An empty result always reports [`DiscoveryMethod::None`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    locations: Vec<NormalizedLocation>,
    method: DiscoveryMethod,
}

impl CrawlResult {
    /// Builds a result from already-deduplicated locations
    pub fn new(locations: Vec<NormalizedLocation>, method: DiscoveryMethod) -> Self {
        let method = if locations.is_empty() {
            DiscoveryMethod::None
        } else {
            method
        };
        Self { locations, method }
    }

    /// The "all strategies exhausted" result
    pub fn empty() -> Self {
        Self::new(Vec::new(), DiscoveryMethod::None)
    }

    pub fn locations(&self) -> &[NormalizedLocation] {
        &self.locations
    }

    pub fn into_locations(self) -> Vec<NormalizedLocation> {
        self.locations
    }

    pub fn method(&self) -> DiscoveryMethod {
        self.method
    }

    pub fn total_found(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl Default for CrawlResult {
    fn default() -> Self {
        Self::empty()
    }
}

impl Serialize for CrawlResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CrawlResult", 3)?;
        state.serialize_field("locations", &self.locations)?;
        state.serialize_field("method", &self.method)?;
        state.serialize_field("total_found", &self.total_found())?;
        state.end()
    }
}
