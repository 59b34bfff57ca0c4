//! Strategy orchestration - the discovery entry point
//!
//! Runs the discovery strategies in order against one root URL and decides
//! which result to return:
//! - Validating the root URL (the only error a caller can see)
//! - Building the per-run context (resolved paths, homepage, browser)
//! - Skipping strategies that cannot or should not run
//! - Stopping early once a result is good enough
//! - Keeping the best result otherwise

use crate::classifier::LinkClassifier;
use crate::config::{Config, DiscoveryConfig};
use crate::crawler::{BrowserSession, Fetcher, HttpFetcher};
use crate::model::CrawlResult;
use crate::strategy::{default_strategies, DiscoveryContext, Strategy};
use crate::url::parse_root_url;
use crate::LocatorError;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// When a strategy's result ends the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptancePolicy {
    /// A result with more locations than this is accepted outright
    pub threshold: usize,

    /// Also accept the first non-empty result
    pub accept_first_nonempty: bool,
}

impl AcceptancePolicy {
    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self {
            threshold: config.acceptance_threshold,
            accept_first_nonempty: config.accept_first_nonempty,
        }
    }

    /// Returns true if `result` should be returned without trying the
    /// remaining strategies
    pub fn is_accepted(&self, result: &CrawlResult) -> bool {
        result.total_found() > self.threshold
            || (self.accept_first_nonempty && !result.is_empty())
    }

    /// Expensive strategies only run while the best result so far is below
    /// the threshold
    pub fn allows_expensive(&self, best: &CrawlResult) -> bool {
        best.total_found() < self.threshold
    }
}

impl Default for AcceptancePolicy {
    fn default() -> Self {
        Self::from_config(&DiscoveryConfig::default())
    }
}

/// Per-run inputs besides the root URL
///
/// Everything is optional; `DiscoveryRequest::default()` runs a plain HTTP
/// discovery with no deadline.
#[derive(Clone, Default)]
pub struct DiscoveryRequest<'a> {
    /// Homepage HTML the caller already fetched
    pub homepage: Option<&'a str>,

    /// Browser for the rendered strategy; borrowed, never closed
    pub browser: Option<&'a dyn BrowserSession>,

    pub cancel: CancellationToken,
    pub deadline: Option<Instant>,
}

impl<'a> DiscoveryRequest<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_homepage(mut self, html: &'a str) -> Self {
        self.homepage = Some(html);
        self
    }

    pub fn with_browser(mut self, browser: &'a dyn BrowserSession) -> Self {
        self.browser = Some(browser);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Runs discovery strategies in fallback order
///
/// Holds only immutable state, so one orchestrator can serve many
/// concurrent `discover` calls.
pub struct StrategyOrchestrator {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
    classifier: Arc<LinkClassifier>,
    strategies: Vec<Box<dyn Strategy>>,
    policy: AcceptancePolicy,
}

impl StrategyOrchestrator {
    /// Creates an orchestrator with the standard strategy order
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `fetcher` - Document source shared by all strategies
    pub fn new(config: Config, fetcher: Arc<dyn Fetcher>) -> Self {
        let classifier = Arc::new(LinkClassifier::from_config(&config.taxonomy));
        let policy = AcceptancePolicy::from_config(&config.discovery);

        Self {
            config: Arc::new(config),
            fetcher,
            classifier,
            strategies: default_strategies(),
            policy,
        }
    }

    /// Creates an orchestrator backed by an [`HttpFetcher`]
    ///
    /// # Returns
    ///
    /// * `Ok(StrategyOrchestrator)` - Ready to discover
    /// * `Err(LocatorError)` - The HTTP client could not be built
    pub fn from_config(config: Config) -> Result<Self, LocatorError> {
        let fetcher = HttpFetcher::new(&config.fetcher)?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    /// Replaces the strategy list
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn Strategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_policy(mut self, policy: AcceptancePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> AcceptancePolicy {
        self.policy
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn classifier(&self) -> &LinkClassifier {
        &self.classifier
    }

    /// Discovers every dealership reachable from `root_url`
    ///
    /// Strategies run in order. A result the [`AcceptancePolicy`] accepts
    /// is returned immediately; otherwise the largest result wins, earlier
    /// strategies winning ties. A cancelled run returns the best result
    /// gathered before cancellation.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - The chosen result, possibly empty
    /// * `Err(LocatorError::UrlError)` - `root_url` is not an absolute HTTP(S) URL
    pub async fn discover(
        &self,
        root_url: &str,
        request: DiscoveryRequest<'_>,
    ) -> Result<CrawlResult, LocatorError> {
        let root = parse_root_url(root_url)?;

        let ctx = DiscoveryContext::new(
            root,
            self.fetcher.as_ref(),
            self.classifier.as_ref(),
            self.config.as_ref(),
        )
        .with_homepage(request.homepage)
        .with_browser(request.browser)
        .with_cancellation(request.cancel, request.deadline);

        tracing::info!("Discovering locations under {}", ctx.root);

        let mut best = CrawlResult::empty();

        for strategy in &self.strategies {
            let method = strategy.method();

            if ctx.is_cancelled() {
                tracing::info!("Discovery cancelled before {} strategy", method);
                break;
            }

            if !strategy.is_available(&ctx) {
                tracing::debug!("Skipping {} strategy: not available", method);
                continue;
            }

            if strategy.is_expensive() && !self.policy.allows_expensive(&best) {
                tracing::debug!(
                    "Skipping {} strategy: already have {} locations",
                    method,
                    best.total_found()
                );
                continue;
            }

            tracing::info!("Running {} strategy", method);
            let result = strategy.execute(&ctx).await;
            tracing::info!("{} strategy found {} locations", method, result.total_found());

            if self.policy.is_accepted(&result) {
                tracing::info!(
                    "Accepting {} result with {} locations",
                    method,
                    result.total_found()
                );
                return Ok(result);
            }

            if result.total_found() > best.total_found() {
                best = result;
            }
        }

        tracing::info!(
            "Discovery finished: {} locations via {}",
            best.total_found(),
            best.method()
        );

        Ok(best)
    }
}

/// Runs a complete discovery with an HTTP fetcher and no browser
///
/// # Arguments
///
/// * `root_url` - The dealer group's root URL
/// * `config` - The discovery configuration
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Discovery completed (possibly with no locations)
/// * `Err(LocatorError)` - Invalid root URL or HTTP client failure
pub async fn discover_locations(
    root_url: &str,
    config: Config,
) -> Result<CrawlResult, LocatorError> {
    StrategyOrchestrator::from_config(config)?
        .discover(root_url, DiscoveryRequest::default())
        .await
}
