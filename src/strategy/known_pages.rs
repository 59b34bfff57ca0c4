//! Directory page discovery
//!
//! Most group sites have a "Our Locations" style page listing every store.
//! This strategy fetches the conventional directory paths (plus any
//! directory links found in the caller's homepage), keeps the anchors the
//! classifier accepts and follows the listing's pagination.

use super::{DiscoveryContext, Strategy};
use crate::crawler::{find_directory_links, parse_html};
use crate::model::{CandidateLink, DiscoveryMethod};
use crate::url::{canonicalize_parsed, is_same_site};
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use url::Url;

#[derive(Debug, Clone, Copy, Default)]
pub struct KnownPageStrategy;

impl KnownPageStrategy {
    /// Directory pages to try, homepage navigation links first
    fn directory_urls(&self, ctx: &DiscoveryContext<'_>) -> Vec<Url> {
        let mut urls: Vec<Url> = Vec::new();

        if let Some(html) = ctx.homepage {
            let page = parse_html(html, &ctx.root);
            urls = find_directory_links(&page, &ctx.root, &ctx.paths.directories);
            tracing::debug!("Homepage links to {} directory pages", urls.len());
        }

        for path in &ctx.paths.directories {
            if let Some(url) = ctx.resolve(path) {
                if !urls.contains(&url) {
                    urls.push(url);
                }
            }
        }

        urls
    }

    /// Fetches one directory and its pagination, appending accepted anchors
    async fn crawl_directory(
        &self,
        ctx: &DiscoveryContext<'_>,
        directory: Url,
        fetched: &mut HashSet<String>,
        candidates: &mut Vec<CandidateLink>,
    ) {
        let max_pages = ctx.config.discovery.max_pagination_pages.max(1);
        let timeout = ctx.config.fetcher.page_timeout();
        let mut pending = VecDeque::from([directory.clone()]);
        let mut pages = 0;

        while let Some(url) = pending.pop_front() {
            if pages >= max_pages || ctx.is_cancelled() {
                break;
            }

            let key = canonicalize_parsed(url.clone()).unwrap_or_else(|_| url.to_string());
            if !fetched.insert(key) {
                continue;
            }
            pages += 1;

            let page = match ctx.fetcher.get_success(&url, timeout).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::debug!("Skipping directory page {}: {}", url, e);
                    continue;
                }
            };

            let parsed = parse_html(&page.body, &page.final_url);
            let before = candidates.len();

            for anchor in &parsed.anchors {
                if ctx
                    .classifier
                    .is_location_link(&anchor.url, &anchor.text, &page.final_url)
                {
                    candidates.push(CandidateLink::new(
                        anchor.url.as_str(),
                        anchor.text.as_str(),
                        DiscoveryMethod::KnownPages,
                    ));
                }
            }

            tracing::debug!(
                "Directory page {}: {} of {} anchors accepted",
                url,
                candidates.len() - before,
                parsed.anchors.len()
            );

            for next in parsed.pagination {
                if is_same_site(&next, &directory) {
                    pending.push_back(next);
                }
            }
        }
    }
}

#[async_trait]
impl Strategy for KnownPageStrategy {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::KnownPages
    }

    async fn collect(&self, ctx: &DiscoveryContext<'_>) -> Vec<CandidateLink> {
        let mut candidates = Vec::new();
        let mut fetched: HashSet<String> = HashSet::new();

        for directory in self.directory_urls(ctx) {
            if ctx.is_cancelled() {
                tracing::debug!("Known-page strategy cancelled");
                break;
            }
            self.crawl_directory(ctx, directory, &mut fetched, &mut candidates)
                .await;
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LinkClassifier;
    use crate::config::Config;
    use crate::strategy::testing::StaticFetcher;

    const ROOT: &str = "https://www.kendallautogroup.com/";

    fn listing(dealers: &[(&str, &str)], pagination: &str) -> String {
        let anchors: String = dealers
            .iter()
            .map(|(href, text)| {
                format!(r#"<div class="card"><a href="{}">{}</a></div>"#, href, text)
            })
            .collect();
        format!(
            r#"<html><body><nav><a href="/careers">Careers</a></nav>{}{}</body></html>"#,
            anchors, pagination
        )
    }

    #[tokio::test]
    async fn test_collects_accepted_anchors() {
        let html = listing(
            &[
                ("https://www.kendallford.com/", "Kendall Ford"),
                ("https://www.kendallford.com/", "Visit Site"),
                ("https://www.hondaofseattle.com/", "Honda of Seattle"),
                ("/new-inventory", "New Inventory"),
            ],
            "",
        );
        let fetcher = StaticFetcher::new().page("https://www.kendallautogroup.com/locations", &html);
        let config = Config::default();
        let classifier = LinkClassifier::default();
        let ctx = DiscoveryContext::new(Url::parse(ROOT).unwrap(), &fetcher, &classifier, &config);

        let result = KnownPageStrategy.execute(&ctx).await;
        assert_eq!(result.method(), DiscoveryMethod::KnownPages);
        assert_eq!(result.total_found(), 2);
        assert_eq!(result.locations()[0].display_name, "Kendall Ford");
    }

    #[tokio::test]
    async fn test_department_links_in_cards_ignored() {
        let domains = [
            "kendallford",
            "kendalltoyota",
            "kendallhonda",
            "kendallkia",
            "kendallmazda",
        ];
        let cards: String = domains
            .iter()
            .map(|domain| {
                format!(
                    r#"<div class="card">
                        <a href="https://www.{d}.com/">Kendall {d}</a>
                        <a href="https://www.{d}.com/service">Schedule Service</a>
                        <a href="https://www.{d}.com/new-inventory">New Inventory</a>
                        <a href="https://www.{d}.com/parts-department">Order Parts</a>
                    </div>"#,
                    d = domain
                )
            })
            .collect();
        let html = format!("<html><body>{}</body></html>", cards);
        let fetcher = StaticFetcher::new().page("https://www.kendallautogroup.com/locations", &html);
        let config = Config::default();
        let classifier = LinkClassifier::default();
        let ctx = DiscoveryContext::new(Url::parse(ROOT).unwrap(), &fetcher, &classifier, &config);

        let result = KnownPageStrategy.execute(&ctx).await;
        assert_eq!(result.total_found(), 5);
        assert!(result
            .locations()
            .iter()
            .all(|l| !l.canonical_url.contains("service") && !l.canonical_url.contains("parts")));
    }

    #[tokio::test]
    async fn test_follows_pagination_with_bound() {
        let page = |n: u32| {
            let href = format!("https://www.city{}ford.com/", n);
            let text = format!("City{} Ford", n);
            listing(
                &[(href.as_str(), text.as_str())],
                &format!(r#"<a rel="next" href="/locations?page={}">Next</a>"#, n + 1),
            )
        };
        let mut fetcher = StaticFetcher::new();
        fetcher = fetcher.page("https://www.kendallautogroup.com/locations", &page(1));
        for n in 2..=6 {
            fetcher = fetcher.page(
                &format!("https://www.kendallautogroup.com/locations?page={}", n),
                &page(n),
            );
        }

        let mut config = Config::default();
        config.discovery.max_pagination_pages = 3;
        config.paths.directories = vec!["/locations".to_string()];
        let classifier = LinkClassifier::default();
        let ctx = DiscoveryContext::new(Url::parse(ROOT).unwrap(), &fetcher, &classifier, &config);

        let candidates = KnownPageStrategy.collect(&ctx).await;
        assert_eq!(candidates.len(), 3);
        assert!(!fetcher
            .requested()
            .contains(&"https://www.kendallautogroup.com/locations?page=4".to_string()));
    }

    #[tokio::test]
    async fn test_homepage_directory_links_first_and_fetched_once() {
        let homepage = r#"<html><body><nav>
            <a href="/our-family-of-stores">Our Locations</a>
            <a href="/locations">Locations</a>
        </nav></body></html>"#;
        let fetcher = StaticFetcher::new()
            .page(
                "https://www.kendallautogroup.com/our-family-of-stores",
                &listing(&[("https://www.kendallkia.com/", "Kendall Kia")], ""),
            )
            .page(
                "https://www.kendallautogroup.com/locations",
                &listing(&[("https://www.kendallmazda.com/", "Kendall Mazda")], ""),
            );
        let config = Config::default();
        let classifier = LinkClassifier::default();
        let ctx = DiscoveryContext::new(Url::parse(ROOT).unwrap(), &fetcher, &classifier, &config)
            .with_homepage(Some(homepage));

        let candidates = KnownPageStrategy.collect(&ctx).await;
        let texts: Vec<&str> = candidates.iter().map(|c| c.anchor_text.as_str()).collect();
        assert_eq!(texts, vec!["Kendall Kia", "Kendall Mazda"]);

        let requested = fetcher.requested();
        assert_eq!(
            requested[0],
            "https://www.kendallautogroup.com/our-family-of-stores"
        );
        let locations_fetches = requested
            .iter()
            .filter(|u| *u == "https://www.kendallautogroup.com/locations")
            .count();
        assert_eq!(locations_fetches, 1);
    }

    #[tokio::test]
    async fn test_failed_paths_skipped() {
        let fetcher = StaticFetcher::new().status("https://www.kendallautogroup.com/locations", 503);
        let config = Config::default();
        let classifier = LinkClassifier::default();
        let ctx = DiscoveryContext::new(Url::parse(ROOT).unwrap(), &fetcher, &classifier, &config);

        let result = KnownPageStrategy.execute(&ctx).await;
        assert!(result.is_empty());
        assert_eq!(result.method(), DiscoveryMethod::None);
        assert_eq!(fetcher.requested().len(), config.paths.directories.len());
    }
}
