use super::taxonomy::{tokenize, BrandTaxonomy};
use crate::url::{
    dealer_id, extract_domain, matches_any, matches_wildcard, registrable_label, same_site,
};
use std::sync::Arc;
use url::Url;

/// Social, review and map hosts that never point at a dealership page
pub const SOCIAL_AND_MAP_DOMAINS: &[&str] = &[
    "*.facebook.com",
    "*.fb.com",
    "*.twitter.com",
    "*.x.com",
    "*.instagram.com",
    "*.youtube.com",
    "*.youtu.be",
    "*.linkedin.com",
    "*.tiktok.com",
    "*.pinterest.com",
    "*.vimeo.com",
    "*.yelp.com",
    "*.waze.com",
    "maps.google.com",
    "maps.apple.com",
    "goo.gl",
    "maps.app.goo.gl",
];

/// Path segments for legal and utility pages
const SKIP_PATH_MARKERS: &[&str] = &[
    "careers",
    "career",
    "jobs",
    "employment",
    "privacy",
    "terms",
    "legal",
    "about",
    "contact",
    "blog",
    "news",
    "login",
    "signin",
    "sign-in",
    "register",
    "account",
    "accessibility",
    "sitemap",
];

/// File types that are never a location page
const SKIP_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".zip", ".doc", ".docx", ".xls",
    ".xlsx", ".mp4", ".mov",
];

/// Anchor text that says nothing about where the link goes
const BOILERPLATE_TEXT: &[&str] = &[
    "click here",
    "here",
    "visit site",
    "visit website",
    "visit our website",
    "website",
    "visit",
    "home",
    "learn more",
    "read more",
    "more info",
    "more information",
    "view details",
    "details",
    "directions",
    "get directions",
    "view map",
    "map",
    "call",
    "call now",
    "shop now",
    "view inventory",
    "hours",
];

/// Words that turn a brand mention into a department or inventory link
const DEPARTMENT_WORDS: &[&str] = &[
    "inventory",
    "service",
    "parts",
    "specials",
    "special",
    "finance",
    "financing",
    "lease",
    "leasing",
    "offers",
    "offer",
    "incentives",
    "deals",
    "accessories",
    "collision",
    "rebates",
    "tires",
    "schedule",
    "apply",
    "credit",
    "trade",
    "research",
    "compare",
    "reviews",
    "models",
    "vehicles",
    "coupons",
    "warranty",
    "recalls",
];

/// Words that cannot be the place name in front of a brand
const GENERIC_MODIFIERS: &[&str] = &[
    "new", "used", "certified", "pre", "owned", "cpo", "shop", "browse", "all", "buy", "view",
    "search", "find", "our", "the", "your", "a", "an", "to", "at", "of", "in", "for", "and",
    "genuine", "explore", "visit", "about",
];

const LOCATION_PREPOSITIONS: &[&str] = &["of", "at", "in"];

/// Words that make a brand hostname a marketing or owner site
/// (`buyatoyota.com`, `myhonda.com`) when they are all that precedes the brand
const HOST_FILLER_WORDS: &[&str] = &[
    "buy", "a", "my", "go", "get", "shop", "drive", "new", "used", "the", "your", "our", "all",
    "find", "lease",
];

/// Host labels of schools and government sites (`stanford.edu`)
const INSTITUTIONAL_LABELS: &[&str] = &["edu", "gov", "mil"];

/// Path words of inventory listings on a dealer's own site
const INVENTORY_PATH_WORDS: &[&str] = &["new", "used", "owned", "cpo", "certified", "cars"];

/// First path segments of location detail pages (`/dealers/<slug>`)
const DIRECTORY_SEGMENTS: &[&str] = &[
    "locations",
    "location",
    "dealers",
    "dealer",
    "dealerships",
    "dealership",
    "stores",
    "store",
    "showrooms",
    "showroom",
];

/// Slugs under a directory segment that are listing views, not locations
const NON_LOCATION_SLUGS: &[&str] = &[
    "search",
    "map",
    "list",
    "all",
    "near-me",
    "page",
    "filter",
    "index.html",
    "index.htm",
    "index.php",
];

/// Query keys naming one dealer, compared with `-`/`_` removed
const ID_PARAMS: &[&str] = &[
    "dealer",
    "dealerid",
    "dealercode",
    "location",
    "locationid",
    "store",
    "storeid",
    "storenumber",
];

/// Query keys of search and listing pages
const SEARCH_PARAMS: &[&str] = &[
    "q", "query", "search", "s", "keyword", "sort", "zip", "zipcode", "postal", "radius", "page",
];

const SEARCH_PATH_MARKERS: &[&str] = &["search", "inventory", "vehicle", "filter", "compare"];

/// Outcome of a single rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
    /// The rule has no opinion; the next rule decides
    Abstain,
}

/// Which rule decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    SkipList,
    DomainPattern,
    AnchorTextBrand,
    Path,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkipList => "skip_list",
            Self::DomainPattern => "domain_pattern",
            Self::AnchorTextBrand => "anchor_text_brand",
            Self::Path => "path",
        }
    }
}

/// Everything the rules look at, computed once per link
#[derive(Debug, Clone)]
pub struct LinkFacts {
    /// Lowercase host, if the URL has one
    pub host: Option<String>,

    /// Lowercase path
    pub path: String,

    /// Query pairs with lowercase keys
    pub query: Vec<(String, String)>,

    pub dealer_id: Option<String>,

    /// Lowercase alphanumeric tokens of the anchor text
    pub tokens: Vec<String>,

    /// Character length of the trimmed anchor text
    pub text_len: usize,

    /// Same site as the page the link was found on
    pub internal: bool,
}

impl LinkFacts {
    pub fn new(url: &Url, anchor_text: &str, base_url: &Url) -> Self {
        let host = extract_domain(url);
        let internal = match (&host, extract_domain(base_url)) {
            (Some(host), Some(base_host)) => same_site(host, &base_host),
            _ => false,
        };
        let text = anchor_text.trim();

        Self {
            host,
            path: url.path().to_lowercase(),
            query: url
                .query_pairs()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect(),
            dealer_id: dealer_id(url),
            tokens: tokenize(text),
            text_len: text.chars().count(),
            internal,
        }
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }

    fn normalized_text(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Rejects links that are never locations, whatever their text says
#[derive(Debug, Clone)]
pub struct SkipListRule {
    domains: Vec<String>,
}

impl SkipListRule {
    /// Builds the rule from the social/map list, the manufacturers' own
    /// sites and any extra patterns
    pub fn new(taxonomy: &BrandTaxonomy, extra_domains: &[String]) -> Self {
        let mut domains: Vec<String> = SOCIAL_AND_MAP_DOMAINS
            .iter()
            .map(|d| d.to_string())
            .collect();
        domains.extend(taxonomy.manufacturer_domains());
        domains.extend(extra_domains.iter().map(|d| d.to_lowercase()));
        Self { domains }
    }

    pub fn evaluate(&self, facts: &LinkFacts) -> Verdict {
        if let Some(host) = &facts.host {
            if matches_any(self.domains.iter().map(String::as_str), host) {
                return Verdict::Reject;
            }
            if matches_wildcard("*.google.com", host) && facts.path.starts_with("/maps") {
                return Verdict::Reject;
            }
        }

        if facts.segments().any(is_skip_segment) {
            return Verdict::Reject;
        }

        if SKIP_EXTENSIONS.iter().any(|ext| facts.path.ends_with(ext)) {
            return Verdict::Reject;
        }

        if BOILERPLATE_TEXT.contains(&facts.normalized_text().as_str()) {
            return Verdict::Reject;
        }

        Verdict::Abstain
    }
}

fn is_skip_segment(segment: &str) -> bool {
    SKIP_PATH_MARKERS.iter().any(|marker| {
        segment == *marker
            || segment
                .strip_prefix(marker)
                .is_some_and(|rest| rest.starts_with('-') || rest.starts_with('.'))
    })
}

/// Accepts external dealer hostnames such as `kendallford.com` or
/// `hondaofseattle.com`, unless the link is to one of the dealer's
/// departments (`/service`, "Schedule Service"), which is rejected
#[derive(Debug, Clone)]
pub struct DomainPatternRule {
    host_variants: Vec<String>,
}

impl DomainPatternRule {
    pub fn new(taxonomy: &BrandTaxonomy) -> Self {
        Self {
            host_variants: taxonomy.host_variants().collect(),
        }
    }

    pub fn evaluate(&self, facts: &LinkFacts) -> Verdict {
        if facts.internal {
            return Verdict::Abstain;
        }
        let Some(host) = facts.host.as_deref() else {
            return Verdict::Abstain;
        };
        if host
            .split('.')
            .any(|label| INSTITUTIONAL_LABELS.contains(&label))
        {
            return Verdict::Abstain;
        }
        let Some(label) = registrable_label(host) else {
            return Verdict::Abstain;
        };
        let label = label.replace('-', "");

        let is_dealer_host = self.host_variants.iter().any(|variant| {
            let city_brand = label
                .strip_suffix(variant.as_str())
                .is_some_and(|city| !city.is_empty() && !is_generic_prefix(city));
            let brand_of_city = ["of", "at"].iter().any(|prep| {
                label
                    .strip_prefix(variant.as_str())
                    .and_then(|rest| rest.strip_prefix(prep))
                    .is_some_and(|city| !city.is_empty())
            });
            city_brand || brand_of_city
        });

        if !is_dealer_host {
            Verdict::Abstain
        } else if is_department_link(facts) {
            Verdict::Reject
        } else {
            Verdict::Accept
        }
    }
}

/// True when `prefix` is made only of host filler words (`buya`, `my`)
fn is_generic_prefix(prefix: &str) -> bool {
    prefix.is_empty()
        || HOST_FILLER_WORDS.iter().any(|word| {
            prefix
                .strip_prefix(word)
                .is_some_and(is_generic_prefix)
        })
}

/// Department wording in the anchor text or in any path segment
fn is_department_link(facts: &LinkFacts) -> bool {
    let department_word = |word: &str| {
        DEPARTMENT_WORDS.contains(&word)
            || SEARCH_PATH_MARKERS.contains(&word)
            || INVENTORY_PATH_WORDS.contains(&word)
    };

    facts.tokens.iter().any(|t| DEPARTMENT_WORDS.contains(&t.as_str()))
        || facts
            .segments()
            .flat_map(|segment| segment.split(|c: char| !c.is_ascii_alphanumeric()))
            .any(department_word)
}

/// Accepts anchor text shaped like a dealership name:
/// `<Location> <Brand>` or `<Brand> of|at|in <Location>`
#[derive(Debug, Clone)]
pub struct AnchorTextBrandRule {
    taxonomy: Arc<BrandTaxonomy>,
}

impl AnchorTextBrandRule {
    pub fn new(taxonomy: Arc<BrandTaxonomy>) -> Self {
        Self { taxonomy }
    }

    pub fn evaluate(&self, facts: &LinkFacts) -> Verdict {
        let tokens = &facts.tokens;
        if tokens.len() < 2 || facts.text_len > 100 {
            return Verdict::Abstain;
        }

        if tokens
            .iter()
            .any(|t| DEPARTMENT_WORDS.contains(&t.as_str()))
        {
            return Verdict::Abstain;
        }

        let mut i = 0;
        while i < tokens.len() {
            let Some(found) = self.taxonomy.match_at(tokens, i) else {
                i += 1;
                continue;
            };

            if i == 0 {
                // "Chrysler Dodge Jeep Ram of Bend": skip the whole brand run
                let mut end = found.len;
                while let Some(next) = self.taxonomy.match_at(tokens, end) {
                    end += next.len;
                }
                if end + 1 < tokens.len() && LOCATION_PREPOSITIONS.contains(&tokens[end].as_str())
                {
                    return Verdict::Accept;
                }
            } else if is_place_word(&tokens[i - 1]) {
                return Verdict::Accept;
            }

            i += found.len;
        }

        Verdict::Abstain
    }
}

fn is_place_word(token: &str) -> bool {
    !GENERIC_MODIFIERS.contains(&token) && !token.chars().all(|c| c.is_ascii_digit())
}

/// Accepts internal URLs shaped like a location detail page
#[derive(Debug, Clone, Default)]
pub struct PathRule;

impl PathRule {
    pub fn evaluate(&self, facts: &LinkFacts) -> Verdict {
        if !facts.internal {
            return Verdict::Abstain;
        }

        if is_search_page(facts) {
            return Verdict::Reject;
        }

        if facts.path.contains("dealer-info") && facts.dealer_id.is_some() {
            return Verdict::Accept;
        }

        let has_id_param = facts.query.iter().any(|(key, value)| {
            let key: String = key.chars().filter(|c| *c != '-' && *c != '_').collect();
            ID_PARAMS.contains(&key.as_str()) && !value.trim().is_empty()
        });
        if has_id_param {
            return Verdict::Accept;
        }

        let has_keyword = ["dealer", "location", "store"]
            .iter()
            .any(|k| facts.path.contains(k));
        if has_keyword
            && facts
                .query
                .iter()
                .any(|(key, value)| key == "id" && !value.trim().is_empty())
        {
            return Verdict::Accept;
        }

        let segments: Vec<&str> = facts.segments().collect();
        let is_detail_page = segments.windows(2).any(|pair| {
            DIRECTORY_SEGMENTS.contains(&pair[0])
                && pair[1].len() > 3
                && !NON_LOCATION_SLUGS.contains(&pair[1])
        });
        if is_detail_page {
            return Verdict::Accept;
        }

        Verdict::Abstain
    }
}

fn is_search_page(facts: &LinkFacts) -> bool {
    let search_path = facts
        .segments()
        .any(|segment| SEARCH_PATH_MARKERS.iter().any(|m| segment.contains(m)));
    let search_query = facts
        .query
        .iter()
        .any(|(key, _)| SEARCH_PARAMS.contains(&key.as_str()) || key.starts_with("filter"));
    search_path || search_query
}

/// One named classification rule
#[derive(Debug, Clone)]
pub enum Rule {
    SkipList(SkipListRule),
    DomainPattern(DomainPatternRule),
    AnchorTextBrand(AnchorTextBrandRule),
    Path(PathRule),
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::SkipList(_) => RuleKind::SkipList,
            Self::DomainPattern(_) => RuleKind::DomainPattern,
            Self::AnchorTextBrand(_) => RuleKind::AnchorTextBrand,
            Self::Path(_) => RuleKind::Path,
        }
    }

    pub fn evaluate(&self, facts: &LinkFacts) -> Verdict {
        match self {
            Self::SkipList(rule) => rule.evaluate(facts),
            Self::DomainPattern(rule) => rule.evaluate(facts),
            Self::AnchorTextBrand(rule) => rule.evaluate(facts),
            Self::Path(rule) => rule.evaluate(facts),
        }
    }
}
