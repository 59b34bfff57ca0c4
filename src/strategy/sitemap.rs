//! Sitemap discovery
//!
//! Reads `sitemap.xml` and its common variants plus any `Sitemap:` lines in
//! `robots.txt`. Sitemap indexes are followed into child sitemaps whose URL
//! looks location-related. Leaf URLs are kept when their path names a dealer,
//! location, store or showroom.

use super::{DiscoveryContext, Strategy};
use crate::classifier::LinkClassifier;
use crate::model::{CandidateLink, DiscoveryMethod};
use crate::FetchError;
use async_trait::async_trait;
use quick_xml::events::Event;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Child sitemaps are only followed when their URL contains one of these
const LOCATION_SITEMAP_KEYWORDS: &[&str] = &["store", "location", "dealer"];

/// Contents of one sitemap document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDocument {
    /// True for a `<sitemapindex>` root
    pub is_index: bool,

    /// `<loc>` values of `<sitemap>` entries
    pub sitemaps: Vec<String>,

    /// `<loc>` values of `<url>` entries
    pub urls: Vec<String>,
}

/// Parses a sitemap or sitemap index
///
/// Namespace prefixes are ignored and `<loc>` values are trimmed. A
/// document without a `<urlset>` or `<sitemapindex>` element (for example
/// an HTML error page served with status 200) is malformed.
pub fn parse_sitemap(xml: &str, source: &Url) -> Result<SitemapDocument, FetchError> {
    let mut document = SitemapDocument::default();
    let mut root_seen = false;
    let mut in_sitemap = false;
    let mut in_loc = false;
    let mut loc = String::new();

    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"urlset" => root_seen = true,
                b"sitemapindex" => {
                    root_seen = true;
                    document.is_index = true;
                }
                b"sitemap" => in_sitemap = true,
                b"loc" => {
                    in_loc = true;
                    loc.clear();
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_loc => {
                loc.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::CData(ref e)) if in_loc => {
                loc.push_str(&String::from_utf8_lossy(e));
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"loc" => {
                    in_loc = false;
                    let value = loc.trim();
                    if !value.is_empty() {
                        if in_sitemap {
                            document.sitemaps.push(value.to_string());
                        } else {
                            document.urls.push(value.to_string());
                        }
                    }
                }
                b"sitemap" => in_sitemap = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FetchError::MalformedDocument {
                    url: source.to_string(),
                    message: format!("at byte {}: {}", reader.buffer_position(), e),
                })
            }
            _ => {}
        }
        buf.clear();
    }

    if !root_seen {
        return Err(FetchError::MalformedDocument {
            url: source.to_string(),
            message: "no <urlset> or <sitemapindex> element".to_string(),
        });
    }

    Ok(document)
}

/// Returns the `Sitemap:` directive values of a robots.txt file
pub fn sitemap_directives(robots_txt: &str) -> Vec<String> {
    robots_txt
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .filter_map(|line| line.split_once(':'))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("sitemap"))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn is_location_sitemap(url: &Url) -> bool {
    let target = url.as_str().to_lowercase();
    LOCATION_SITEMAP_KEYWORDS.iter().any(|k| target.contains(k))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SitemapStrategy;

impl SitemapStrategy {
    /// Sitemap URLs to start from: configured paths, then robots.txt entries
    async fn seed_urls(&self, ctx: &DiscoveryContext<'_>) -> Vec<Url> {
        let mut seeds: Vec<Url> = ctx
            .paths
            .sitemaps
            .iter()
            .filter_map(|path| ctx.resolve(path))
            .collect();

        let Some(robots_url) = ctx.resolve("/robots.txt") else {
            return seeds;
        };

        match ctx
            .fetcher
            .get_success(&robots_url, ctx.config.fetcher.page_timeout())
            .await
        {
            Ok(page) => {
                for directive in sitemap_directives(&page.body) {
                    if let Ok(url) = ctx.root.join(&directive) {
                        if !seeds.contains(&url) {
                            seeds.push(url);
                        }
                    }
                }
            }
            Err(e) => tracing::debug!("No robots.txt sitemaps: {}", e),
        }

        seeds
    }

    async fn fetch_sitemap(
        &self,
        ctx: &DiscoveryContext<'_>,
        url: &Url,
    ) -> Result<SitemapDocument, FetchError> {
        let page = ctx
            .fetcher
            .get_success(url, ctx.config.fetcher.page_timeout())
            .await?;
        parse_sitemap(&page.body, url)
    }
}

#[async_trait]
impl Strategy for SitemapStrategy {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::Sitemap
    }

    async fn collect(&self, ctx: &DiscoveryContext<'_>) -> Vec<CandidateLink> {
        let max_depth = ctx.config.discovery.max_sitemap_depth;
        let mut candidates = Vec::new();
        let mut fetched: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(Url, u32)> = self
            .seed_urls(ctx)
            .await
            .into_iter()
            .map(|url| (url, 0))
            .collect();

        while let Some((url, depth)) = queue.pop_front() {
            if ctx.is_cancelled() {
                tracing::debug!("Sitemap strategy cancelled");
                break;
            }
            if !fetched.insert(url.to_string()) {
                continue;
            }

            let document = match self.fetch_sitemap(ctx, &url).await {
                Ok(document) => document,
                Err(e) => {
                    tracing::debug!("Skipping sitemap {}: {}", url, e);
                    continue;
                }
            };

            tracing::debug!(
                "Sitemap {}: {} child sitemaps, {} urls",
                url,
                document.sitemaps.len(),
                document.urls.len()
            );

            if depth < max_depth {
                for loc in &document.sitemaps {
                    if let Ok(child) = url.join(loc) {
                        if is_location_sitemap(&child) {
                            queue.push_back((child, depth + 1));
                        }
                    }
                }
            }

            for loc in &document.urls {
                let Ok(target) = url.join(loc) else {
                    continue;
                };
                if LinkClassifier::is_location_path(&target) {
                    candidates.push(CandidateLink::new(
                        target.as_str(),
                        "",
                        DiscoveryMethod::Sitemap,
                    ));
                }
            }
        }

        candidates
    }
}
