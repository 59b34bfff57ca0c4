//! Bounded breadth-first crawl of the group site
//!
//! Used when neither sitemaps nor conventional directory pages turn up
//! enough locations. Starting from the root, pages whose path looks
//! location-related are followed breadth-first; every anchor on every
//! visited page is offered to the classifier. The crawl never leaves the
//! group's own site and stops after `max_pages` fetch attempts.

use super::{DiscoveryContext, Strategy};
use crate::crawler::{parse_html, Frontier};
use crate::model::{CandidateLink, DiscoveryMethod};
use async_trait::async_trait;
use url::Url;

#[derive(Debug, Clone, Copy, Default)]
pub struct DeepCrawlStrategy;

impl DeepCrawlStrategy {
    /// Classifies a page's anchors and queues the ones worth visiting
    fn process_page(
        &self,
        ctx: &DiscoveryContext<'_>,
        html: &str,
        page_url: &Url,
        frontier: &mut Frontier,
        candidates: &mut Vec<CandidateLink>,
    ) {
        let parsed = parse_html(html, page_url);

        for anchor in parsed.anchors {
            if ctx
                .classifier
                .is_location_link(&anchor.url, &anchor.text, page_url)
            {
                candidates.push(CandidateLink::new(
                    anchor.url.as_str(),
                    anchor.text.as_str(),
                    DiscoveryMethod::DeepCrawl,
                ));
            }

            if ctx.classifier.should_crawl(&anchor.url, &ctx.root) {
                let mut next = anchor.url;
                next.set_fragment(None);
                frontier.push(next);
            }
        }
    }
}

#[async_trait]
impl Strategy for DeepCrawlStrategy {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::DeepCrawl
    }

    async fn collect(&self, ctx: &DiscoveryContext<'_>) -> Vec<CandidateLink> {
        let timeout = ctx.config.fetcher.page_timeout();
        let mut frontier = Frontier::new(ctx.config.discovery.max_pages);
        let mut candidates = Vec::new();

        match ctx.homepage {
            Some(html) => {
                frontier.mark_seen(&ctx.root);
                frontier.record_visit();
                self.process_page(ctx, html, &ctx.root, &mut frontier, &mut candidates);
            }
            None => {
                frontier.push(ctx.root.clone());
            }
        }

        loop {
            if ctx.is_cancelled() {
                tracing::debug!("Deep crawl cancelled after {} pages", frontier.visited());
                break;
            }
            let Some(url) = frontier.next() else {
                break;
            };

            match ctx.fetcher.get_success(&url, timeout).await {
                Ok(page) => {
                    frontier.mark_seen(&page.final_url);
                    self.process_page(
                        ctx,
                        &page.body,
                        &page.final_url,
                        &mut frontier,
                        &mut candidates,
                    );
                }
                Err(e) => tracing::debug!("Skipping page {}: {}", url, e),
            }
        }

        tracing::debug!(
            "Deep crawl visited {} pages, {} still queued, {} candidates",
            frontier.visited(),
            frontier.pending(),
            candidates.len()
        );

        candidates
    }
}
