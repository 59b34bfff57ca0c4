//! Discovery strategies
//!
//! Each strategy is one partial way of finding dealership links on a group
//! site. The orchestrator runs them in a fixed order:
//!
//! | Order | Strategy | Source |
//! |-------|----------|--------|
//! | 1 | [`SitemapStrategy`] | `sitemap.xml` and friends |
//! | 2 | [`KnownPageStrategy`] | conventional directory pages |
//! | 3 | [`ApiStrategy`] | conventional JSON endpoints |
//! | 4 | [`DeepCrawlStrategy`] | bounded same-site BFS |
//! | 5 | [`RenderedCrawlStrategy`] | a caller-supplied browser |
//!
//! A strategy never fails: fetch and browser errors are logged and the
//! affected page simply contributes nothing.

mod api;
mod deep_crawl;
mod known_pages;
mod rendered;
mod sitemap;

pub use api::ApiStrategy;
pub use deep_crawl::DeepCrawlStrategy;
pub use known_pages::KnownPageStrategy;
pub use rendered::RenderedCrawlStrategy;
pub use sitemap::{parse_sitemap, sitemap_directives, SitemapDocument, SitemapStrategy};

use crate::classifier::LinkClassifier;
use crate::config::{Config, ResolvedPaths};
use crate::crawler::{BrowserSession, Fetcher};
use crate::dedupe::Deduplicator;
use crate::model::{CandidateLink, CrawlResult, DiscoveryMethod};
use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Everything a strategy may use during one discovery run
pub struct DiscoveryContext<'a> {
    /// The root URL discovery started from
    pub root: Url,
    pub fetcher: &'a dyn Fetcher,
    pub classifier: &'a LinkClassifier,
    pub config: &'a Config,

    /// Path lists for this site, group profile paths first
    pub paths: ResolvedPaths,

    /// Pre-fetched homepage HTML, if the caller had it
    pub homepage: Option<&'a str>,
    pub browser: Option<&'a dyn BrowserSession>,
    pub cancel: CancellationToken,
    pub deadline: Option<Instant>,
}

impl<'a> DiscoveryContext<'a> {
    /// Creates a context for `root`, resolving group-specific paths from
    /// its host
    pub fn new(
        root: Url,
        fetcher: &'a dyn Fetcher,
        classifier: &'a LinkClassifier,
        config: &'a Config,
    ) -> Self {
        let paths = config.resolve_paths(root.host_str().unwrap_or(""));
        Self {
            root,
            fetcher,
            classifier,
            config,
            paths,
            homepage: None,
            browser: None,
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    pub fn with_homepage(mut self, homepage: Option<&'a str>) -> Self {
        self.homepage = homepage;
        self
    }

    pub fn with_browser(mut self, browser: Option<&'a dyn BrowserSession>) -> Self {
        self.browser = browser;
        self
    }

    pub fn with_cancellation(
        mut self,
        cancel: CancellationToken,
        deadline: Option<Instant>,
    ) -> Self {
        self.cancel = cancel;
        self.deadline = deadline;
        self
    }

    /// True once the run was cancelled or its deadline has passed
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves a configured path (e.g. `/locations`) against the root
    pub fn resolve(&self, path: &str) -> Option<Url> {
        self.root.join(path).ok()
    }
}

/// One discovery channel
#[async_trait]
pub trait Strategy: Send + Sync {
    /// The method reported when this strategy's result is chosen
    fn method(&self) -> DiscoveryMethod;

    /// Expensive strategies only run while the best result is still below
    /// the acceptance threshold
    fn is_expensive(&self) -> bool {
        false
    }

    /// Whether the strategy can run at all with this context
    fn is_available(&self, _ctx: &DiscoveryContext<'_>) -> bool {
        true
    }

    /// Gathers raw candidate links
    async fn collect(&self, ctx: &DiscoveryContext<'_>) -> Vec<CandidateLink>;

    /// Collects and deduplicates into a result
    async fn execute(&self, ctx: &DiscoveryContext<'_>) -> CrawlResult {
        let candidates = self.collect(ctx).await;
        let locations = Deduplicator::new(&ctx.root).dedupe(&candidates);
        CrawlResult::new(locations, self.method())
    }
}

/// The standard strategy order
pub fn default_strategies() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(SitemapStrategy),
        Box::new(KnownPageStrategy),
        Box::new(ApiStrategy),
        Box::new(DeepCrawlStrategy),
        Box::new(RenderedCrawlStrategy),
    ]
}
