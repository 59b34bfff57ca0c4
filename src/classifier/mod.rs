//! Link classification
//!
//! Decides whether a (url, anchor text) pair points at a real dealership.
//! Rules run in a fixed precedence order and the first rule with an opinion
//! decides; a link no rule accepts is rejected.

mod rules;
mod taxonomy;

pub use rules::{
    AnchorTextBrandRule, DomainPatternRule, LinkFacts, PathRule, Rule, RuleKind, SkipListRule,
    Verdict, SOCIAL_AND_MAP_DOMAINS,
};
pub use taxonomy::{tokenize, Brand, BrandMatch, BrandTaxonomy};

use crate::config::TaxonomyConfig;
use crate::url::is_same_site;
use std::sync::Arc;
use url::Url;

/// Path keywords that make a page worth visiting during the deep crawl
const CRAWL_KEYWORDS: &[&str] = &["location", "dealer", "store", "our-", "find-"];

/// Path fragments that mark location pages in sitemaps and rendered grids
const LOCATION_PATH_MARKERS: &[&str] = &["/dealer", "/location", "/store", "/showroom"];

const INVENTORY_MARKERS: &[&str] = &["inventory", "vehicle"];

/// Result of classifying one link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub accepted: bool,

    /// The rule that decided, or None when every rule abstained
    pub rule: Option<RuleKind>,
}

/// Ordered set of classification rules sharing one brand taxonomy
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    rules: Vec<Rule>,
    taxonomy: Arc<BrandTaxonomy>,
}

impl LinkClassifier {
    /// Builds the standard rule order:
    /// SkipList, DomainPattern, AnchorTextBrand, Path
    pub fn new(taxonomy: Arc<BrandTaxonomy>) -> Self {
        Self::with_skip_domains(taxonomy, &[])
    }

    /// Like [`LinkClassifier::new`] with extra never-a-location domains
    pub fn with_skip_domains(taxonomy: Arc<BrandTaxonomy>, extra_skip_domains: &[String]) -> Self {
        let rules = vec![
            Rule::SkipList(SkipListRule::new(&taxonomy, extra_skip_domains)),
            Rule::DomainPattern(DomainPatternRule::new(&taxonomy)),
            Rule::AnchorTextBrand(AnchorTextBrandRule::new(Arc::clone(&taxonomy))),
            Rule::Path(PathRule),
        ];
        Self { rules, taxonomy }
    }

    /// Builds a classifier from the `[taxonomy]` config section
    pub fn from_config(config: &TaxonomyConfig) -> Self {
        let taxonomy = Arc::new(BrandTaxonomy::with_extra(&config.brands));
        Self::with_skip_domains(taxonomy, &config.extra_skip_domains)
    }

    pub fn taxonomy(&self) -> &Arc<BrandTaxonomy> {
        &self.taxonomy
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Runs the rules in order and reports which one decided
    pub fn evaluate(&self, url: &Url, anchor_text: &str, base_url: &Url) -> Decision {
        let facts = LinkFacts::new(url, anchor_text, base_url);

        for rule in &self.rules {
            match rule.evaluate(&facts) {
                Verdict::Accept => {
                    return Decision {
                        accepted: true,
                        rule: Some(rule.kind()),
                    }
                }
                Verdict::Reject => {
                    return Decision {
                        accepted: false,
                        rule: Some(rule.kind()),
                    }
                }
                Verdict::Abstain => {}
            }
        }

        Decision {
            accepted: false,
            rule: None,
        }
    }

    /// Returns true if the link points at a dealership
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute link target
    /// * `anchor_text` - Visible text of the link (may be empty)
    /// * `base_url` - The page the link was found on
    pub fn is_location_link(&self, url: &Url, anchor_text: &str, base_url: &Url) -> bool {
        let decision = self.evaluate(url, anchor_text, base_url);
        tracing::trace!(
            "{} {:?} -> {} ({})",
            url,
            anchor_text,
            if decision.accepted { "accept" } else { "reject" },
            decision.rule.map(|r| r.as_str()).unwrap_or("default")
        );
        decision.accepted
    }

    /// Looser test used to pick pages for the deep crawl: same site, a
    /// location-ish keyword in the path, and not an inventory page
    pub fn should_crawl(&self, url: &Url, root: &Url) -> bool {
        if !is_same_site(url, root) {
            return false;
        }

        let target = path_and_query(url);
        CRAWL_KEYWORDS.iter().any(|k| target.contains(k))
            && !INVENTORY_MARKERS.iter().any(|m| target.contains(m))
    }

    /// Keyword filter for sitemap entries: the path names a dealer,
    /// location, store or showroom and is not an inventory page
    pub fn is_location_path(url: &Url) -> bool {
        let target = path_and_query(url);
        LOCATION_PATH_MARKERS.iter().any(|m| target.contains(m))
            && !INVENTORY_MARKERS
                .iter()
                .any(|m| target.contains(&format!("/{}", m)))
    }
}

impl Default for LinkClassifier {
    fn default() -> Self {
        Self::new(Arc::new(BrandTaxonomy::builtin()))
    }
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query).to_lowercase(),
        None => url.path().to_lowercase(),
    }
}
