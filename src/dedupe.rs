//! Candidate deduplication
//!
//! Turns the raw links a strategy collected into one [`NormalizedLocation`]
//! per dealership. Candidates are merged on the first available key:
//!
//! 1. a dealer identifier query parameter (`dealer=123`)
//! 2. the anchor text with everything but letters and digits removed,
//!    when that leaves more than 3 characters
//! 3. the canonical URL
//!
//! The first candidate seen for a key wins. A candidate whose canonical URL
//! has already been kept is a duplicate as well, so canonical URLs stay
//! unique in the output.

use crate::model::{CandidateLink, NormalizedLocation};
use crate::url::{canonicalize_parsed, classify_location, dealer_id, strip_www};
use std::collections::HashSet;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MergeKey {
    DealerId(String),
    AnchorText(String),
    Url(String),
}

/// Merges candidates found under one root URL
#[derive(Debug, Clone)]
pub struct Deduplicator {
    root: Url,
}

impl Deduplicator {
    pub fn new(root: &Url) -> Self {
        Self { root: root.clone() }
    }

    /// Deduplicates candidates, preserving discovery order
    ///
    /// Candidates whose URL cannot be parsed or canonicalized are dropped.
    pub fn dedupe(&self, candidates: &[CandidateLink]) -> Vec<NormalizedLocation> {
        let mut seen_keys: HashSet<MergeKey> = HashSet::new();
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut locations = Vec::new();

        for candidate in candidates {
            let url = match Url::parse(candidate.raw_url.trim()) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Dropping unparseable candidate {}: {}", candidate.raw_url, e);
                    continue;
                }
            };

            let canonical_url = match canonicalize_parsed(url.clone()) {
                Ok(canonical) => canonical,
                Err(e) => {
                    tracing::debug!("Dropping candidate {}: {}", candidate.raw_url, e);
                    continue;
                }
            };

            let id = dealer_id(&url);
            let key = merge_key(id.as_deref(), &candidate.anchor_text, &canonical_url);

            if seen_keys.contains(&key) || seen_urls.contains(&canonical_url) {
                continue;
            }
            seen_keys.insert(key);
            seen_urls.insert(canonical_url.clone());

            locations.push(NormalizedLocation {
                display_name: display_name(&candidate.anchor_text, &url),
                classification: classify_location(&url, &self.root),
                dealer_id: id,
                canonical_url,
            });
        }

        tracing::debug!(
            "Deduplicated {} candidates into {} locations",
            candidates.len(),
            locations.len()
        );

        locations
    }
}

fn merge_key(dealer_id: Option<&str>, anchor_text: &str, canonical_url: &str) -> MergeKey {
    if let Some(id) = dealer_id {
        return MergeKey::DealerId(id.to_string());
    }

    let text = normalize_text(anchor_text);
    if text.chars().count() > 3 {
        return MergeKey::AnchorText(text);
    }

    MergeKey::Url(canonical_url.to_string())
}

/// Lowercases and drops everything that is not a letter or digit
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Picks a human-readable name: the anchor text when present, otherwise
/// the last path segment title-cased, otherwise the host
fn display_name(anchor_text: &str, url: &Url) -> String {
    let text = anchor_text.split_whitespace().collect::<Vec<_>>().join(" ");
    if !text.is_empty() {
        return text;
    }

    let slug = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|segment| segment.split('.').next().unwrap_or(segment))
        .filter(|segment| !segment.is_empty());

    if let Some(slug) = slug {
        return title_case(slug);
    }

    url.host_str()
        .map(|host| strip_www(host).to_string())
        .unwrap_or_else(|| url.to_string())
}

fn title_case(slug: &str) -> String {
    slug.split(|c: char| c == '-' || c == '_' || c == '+')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
