//! Rendered directory discovery
//!
//! Last resort for groups whose location grid only exists after client-side
//! rendering. Drives the caller's [`BrowserSession`] through the rendered
//! directory paths, clicking "load more" style controls between
//! extractions.

use super::{DiscoveryContext, Strategy};
use crate::crawler::{BrowserSession, LOAD_MORE_PATTERNS};
use crate::model::{CandidateLink, DiscoveryMethod};
use crate::url::resolve_href;
use crate::BrowserError;
use async_trait::async_trait;
use std::future::Future;
use url::Url;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderedCrawlStrategy;

impl RenderedCrawlStrategy {
    /// Renders one path, pushing every accepted link it showed into `found`
    ///
    /// Links harvested before a failure stay in `found`.
    async fn render_path(
        &self,
        ctx: &DiscoveryContext<'_>,
        browser: &dyn BrowserSession,
        url: &Url,
        found: &mut Vec<CandidateLink>,
    ) -> Result<(), BrowserError> {
        let settle = ctx.config.discovery.render_settle_ms;

        bounded(ctx, url, browser.navigate(url)).await??;
        browser.sleep(settle).await;

        found.extend(self.harvest(ctx, browser, url).await?);

        for round in 0..ctx.config.discovery.load_more_clicks {
            if ctx.is_cancelled() {
                break;
            }
            if !bounded(ctx, url, browser.click_if_present(LOAD_MORE_PATTERNS)).await?? {
                break;
            }
            browser.sleep(settle).await;

            let shown = self.harvest(ctx, browser, url).await?;
            tracing::debug!(
                "{}: load-more round {} shows {} accepted links",
                url,
                round + 1,
                shown.len()
            );
            found.extend(shown);
        }

        Ok(())
    }

    /// Reads the current DOM's links and keeps the accepted ones
    async fn harvest(
        &self,
        ctx: &DiscoveryContext<'_>,
        browser: &dyn BrowserSession,
        page_url: &Url,
    ) -> Result<Vec<CandidateLink>, BrowserError> {
        let links = bounded(ctx, page_url, browser.extract_links()).await??;

        Ok(links
            .iter()
            .filter_map(|link| {
                let url = resolve_href(&link.href, page_url)?;
                let text = link.text.split_whitespace().collect::<Vec<_>>().join(" ");
                ctx.classifier
                    .is_location_link(&url, &text, page_url)
                    .then(|| CandidateLink::new(url.as_str(), text, DiscoveryMethod::Rendered))
            })
            .collect())
    }
}

/// Runs one browser call under `render-timeout-ms`
async fn bounded<F: Future>(
    ctx: &DiscoveryContext<'_>,
    url: &Url,
    call: F,
) -> Result<F::Output, BrowserError> {
    tokio::time::timeout(ctx.config.fetcher.render_timeout(), call)
        .await
        .map_err(|_| BrowserError::Timeout {
            url: url.to_string(),
        })
}

#[async_trait]
impl Strategy for RenderedCrawlStrategy {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::Rendered
    }

    fn is_expensive(&self) -> bool {
        true
    }

    fn is_available(&self, ctx: &DiscoveryContext<'_>) -> bool {
        ctx.browser.is_some()
    }

    async fn collect(&self, ctx: &DiscoveryContext<'_>) -> Vec<CandidateLink> {
        let Some(browser) = ctx.browser else {
            return Vec::new();
        };
        let mut candidates = Vec::new();

        for path in &ctx.paths.rendered {
            if ctx.is_cancelled() {
                tracing::debug!("Rendered strategy cancelled");
                break;
            }
            let Some(url) = ctx.resolve(path) else {
                continue;
            };

            let before = candidates.len();
            let outcome = self.render_path(ctx, browser, &url, &mut candidates).await;
            tracing::debug!(
                "Rendered {}: {} accepted links",
                url,
                candidates.len() - before
            );

            match outcome {
                Ok(()) => {}
                Err(BrowserError::SessionClosed) => {
                    tracing::warn!("Browser session closed while rendering {}", url);
                    break;
                }
                Err(e) => tracing::warn!("Rendering {} failed: {}", url, e),
            }
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LinkClassifier;
    use crate::config::Config;
    use crate::crawler::RenderedLink;
    use crate::strategy::testing::StaticFetcher;
    use std::sync::Mutex;

    const ROOT: &str = "https://www.kendallautogroup.com/";

    /// Shows `per_round` dealer links per load-more click on /locations
    struct GridBrowser {
        per_round: usize,
        clicks_available: usize,
        hang_on_extract: bool,
        broken_click: Option<usize>,
        state: Mutex<(String, usize)>,
    }

    impl GridBrowser {
        fn new(per_round: usize, clicks_available: usize) -> Self {
            Self {
                per_round,
                clicks_available,
                hang_on_extract: false,
                broken_click: None,
                state: Mutex::new((String::new(), 0)),
            }
        }

        fn hanging_on_extract(mut self) -> Self {
            self.hang_on_extract = true;
            self
        }

        /// The given click (1-based) fails with a script error
        fn breaking_on_click(mut self, click: usize) -> Self {
            self.broken_click = Some(click);
            self
        }
    }

    #[async_trait]
    impl BrowserSession for GridBrowser {
        async fn navigate(&self, url: &Url) -> Result<(), BrowserError> {
            *self.state.lock().unwrap() = (url.path().to_string(), 0);
            Ok(())
        }

        async fn extract_links(&self) -> Result<Vec<RenderedLink>, BrowserError> {
            if self.hang_on_extract {
                tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            }
            let (path, clicks) = self.state.lock().unwrap().clone();
            if path != "/locations" {
                return Ok(vec![RenderedLink::new("/privacy", "Privacy")]);
            }
            let shown = self.per_round * (clicks + 1);
            Ok((0..shown)
                .map(|n| {
                    RenderedLink::new(
                        format!("/dealers/store-{:02}", n),
                        format!("Kendall Store {:02}", n),
                    )
                })
                .collect())
        }

        async fn click_if_present(&self, _patterns: &[&str]) -> Result<bool, BrowserError> {
            let mut state = self.state.lock().unwrap();
            if self.broken_click == Some(state.1 + 1) {
                return Err(BrowserError::Script("load more handler threw".to_string()));
            }
            if state.1 < self.clicks_available {
                state.1 += 1;
                Ok(true)
            } else {
                Ok(false)
            }
        }

        async fn sleep(&self, _millis: u64) {}
    }

    #[tokio::test]
    async fn test_unavailable_without_browser() {
        let fetcher = StaticFetcher::new();
        let config = Config::default();
        let classifier = LinkClassifier::default();
        let ctx = DiscoveryContext::new(Url::parse(ROOT).unwrap(), &fetcher, &classifier, &config);

        assert!(RenderedCrawlStrategy.is_expensive());
        assert!(!RenderedCrawlStrategy.is_available(&ctx));
        assert!(RenderedCrawlStrategy.collect(&ctx).await.is_empty());
    }

    #[tokio::test]
    async fn test_load_more_rounds() {
        let browser = GridBrowser::new(10, 2);
        let fetcher = StaticFetcher::new();
        let config = Config::default();
        let classifier = LinkClassifier::default();
        let ctx = DiscoveryContext::new(Url::parse(ROOT).unwrap(), &fetcher, &classifier, &config)
            .with_browser(Some(&browser));

        let result = RenderedCrawlStrategy.execute(&ctx).await;
        assert_eq!(result.method(), DiscoveryMethod::Rendered);
        assert_eq!(result.total_found(), 30);
        assert!(fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn test_click_rounds_bounded_by_config() {
        let browser = GridBrowser::new(10, 5);
        let fetcher = StaticFetcher::new();
        let mut config = Config::default();
        config.discovery.load_more_clicks = 1;
        let classifier = LinkClassifier::default();
        let ctx = DiscoveryContext::new(Url::parse(ROOT).unwrap(), &fetcher, &classifier, &config)
            .with_browser(Some(&browser));

        assert_eq!(RenderedCrawlStrategy.execute(&ctx).await.total_found(), 20);
    }

    #[tokio::test]
    async fn test_hung_extraction_times_out() {
        let browser = GridBrowser::new(10, 2).hanging_on_extract();
        let fetcher = StaticFetcher::new();
        let mut config = Config::default();
        config.fetcher.render_timeout_ms = 100;
        config.discovery.render_settle_ms = 0;
        let classifier = LinkClassifier::default();
        let ctx = DiscoveryContext::new(Url::parse(ROOT).unwrap(), &fetcher, &classifier, &config)
            .with_browser(Some(&browser));

        let started = std::time::Instant::now();
        let candidates = RenderedCrawlStrategy.collect(&ctx).await;
        assert!(candidates.is_empty());
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_failed_click_keeps_harvested_links() {
        let browser = GridBrowser::new(10, 3).breaking_on_click(2);
        let fetcher = StaticFetcher::new();
        let config = Config::default();
        let classifier = LinkClassifier::default();
        let ctx = DiscoveryContext::new(Url::parse(ROOT).unwrap(), &fetcher, &classifier, &config)
            .with_browser(Some(&browser));

        assert_eq!(RenderedCrawlStrategy.execute(&ctx).await.total_found(), 20);
    }
}
