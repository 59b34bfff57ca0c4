//! JSON endpoint discovery
//!
//! Dealer locator widgets are often fed by an unauthenticated JSON endpoint.
//! This strategy tries the conventional ones and mines every URL-looking
//! string out of whatever structure comes back.

use super::{DiscoveryContext, Strategy};
use crate::model::{CandidateLink, DiscoveryMethod};
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

/// Sibling fields whose value names the dealership an object describes
const NAME_FIELDS: &[&str] = &[
    "name",
    "dealerName",
    "dealer_name",
    "title",
    "displayName",
    "storeName",
    "locationName",
];

/// Fields holding the dealership's own site, read before any other field of
/// the object so they become the location's representative URL
const URL_FIELDS: &[&str] = &[
    "url",
    "website",
    "websiteUrl",
    "website_url",
    "siteUrl",
    "homepage",
    "link",
];

/// A URL-looking string found in a JSON document, with the display name
/// of the object it sat in
#[derive(Debug, Clone, PartialEq, Eq)]
struct JsonLink {
    href: String,
    name: Option<String>,
}

fn looks_like_url(value: &str) -> bool {
    value.starts_with("http://")
        || value.starts_with("https://")
        || value.starts_with("//")
        || (value.starts_with('/') && value.len() > 1)
}

fn object_name(map: &serde_json::Map<String, Value>) -> Option<String> {
    NAME_FIELDS
        .iter()
        .filter_map(|field| map.get(*field).and_then(Value::as_str))
        .map(str::trim)
        .find(|name| !name.is_empty() && !looks_like_url(name))
        .map(str::to_string)
}

/// Walks a JSON tree collecting URL-looking strings, an object's site
/// fields first and then the rest in document order
fn collect_links(value: &Value, name: Option<&str>, links: &mut Vec<JsonLink>) {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if looks_like_url(s) {
                links.push(JsonLink {
                    href: s.to_string(),
                    name: name.map(str::to_string),
                });
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_links(item, None, links);
            }
        }
        Value::Object(map) => {
            let own_name = object_name(map);
            let preferred = URL_FIELDS.iter().filter_map(|field| map.get(*field));
            let rest = map
                .iter()
                .filter(|(key, _)| !URL_FIELDS.contains(&key.as_str()))
                .map(|(_, value)| value);

            for child in preferred.chain(rest) {
                match child {
                    Value::String(_) => collect_links(child, own_name.as_deref(), links),
                    _ => collect_links(child, None, links),
                }
            }
        }
        _ => {}
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiStrategy;

impl ApiStrategy {
    fn candidates_from(
        &self,
        ctx: &DiscoveryContext<'_>,
        endpoint: &Url,
        document: &Value,
    ) -> Vec<CandidateLink> {
        let mut links = Vec::new();
        collect_links(document, None, &mut links);

        links
            .into_iter()
            .filter_map(|link| {
                let url = endpoint.join(&link.href).ok()?;
                let text = link.name.unwrap_or_default();
                ctx.classifier
                    .is_location_link(&url, &text, endpoint)
                    .then(|| CandidateLink::new(url.as_str(), text, DiscoveryMethod::Api))
            })
            .collect()
    }
}

#[async_trait]
impl Strategy for ApiStrategy {
    fn method(&self) -> DiscoveryMethod {
        DiscoveryMethod::Api
    }

    async fn collect(&self, ctx: &DiscoveryContext<'_>) -> Vec<CandidateLink> {
        let timeout = ctx.config.fetcher.json_timeout();
        let mut candidates = Vec::new();

        for path in &ctx.paths.api {
            if ctx.is_cancelled() {
                tracing::debug!("API strategy cancelled");
                break;
            }
            let Some(endpoint) = ctx.resolve(path) else {
                continue;
            };

            match ctx.fetcher.get_json(&endpoint, timeout).await {
                Ok(document) => {
                    let found = self.candidates_from(ctx, &endpoint, &document);
                    tracing::debug!("Endpoint {}: {} candidate links", endpoint, found.len());
                    candidates.extend(found);
                }
                Err(e) => tracing::debug!("Skipping endpoint {}: {}", endpoint, e),
            }
        }

        candidates
    }
}
