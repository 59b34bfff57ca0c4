use crate::url::matches_wildcard;
use serde::Deserialize;
use std::time::Duration;

/// Sitemap locations tried on every site
pub const DEFAULT_SITEMAP_PATHS: &[&str] = &[
    "/sitemap.xml",
    "/sitemap-index.xml",
    "/sitemap_index.xml",
    "/sitemap-stores.xml",
    "/sitemap-locations.xml",
    "/sitemap-dealers.xml",
];

/// Conventional location directory pages
pub const DEFAULT_DIRECTORY_PATHS: &[&str] = &[
    "/locations",
    "/dealerships",
    "/dealers",
    "/stores",
    "/our-locations",
    "/find-a-dealer",
    "/find-a-store",
    "/dealer-locator",
    "/store-locator",
    "/all-locations",
    "/location-directory",
];

/// Conventional JSON directory endpoints
pub const DEFAULT_API_PATHS: &[&str] = &[
    "/api/dealers",
    "/api/locations",
    "/api/stores",
    "/api/dealer/locator",
    "/api/v1/dealers",
    "/api/v1/locations",
    "/api/v2/dealers",
    "/ajax/dealers",
    "/ajax/locations",
];

/// Pages worth rendering in a browser
pub const DEFAULT_RENDERED_PATHS: &[&str] =
    &["/locations", "/dealerships", "/stores", "/our-locations"];

/// Main configuration structure
///
/// Every section is optional; `Config::default()` is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub fetcher: FetcherConfig,
    pub paths: PathsConfig,
    pub taxonomy: TaxonomyConfig,
    #[serde(rename = "group")]
    pub groups: Vec<GroupProfile>,
}

/// Orchestration and traversal bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DiscoveryConfig {
    /// A strategy returning more locations than this ends the run
    pub acceptance_threshold: usize,

    /// Stop at the first strategy that finds anything
    pub accept_first_nonempty: bool,

    /// Upper bound on pages visited by the deep crawl
    pub max_pages: usize,

    /// Upper bound on pages followed per directory listing
    pub max_pagination_pages: usize,

    /// Nesting depth for sitemap indexes
    pub max_sitemap_depth: u32,

    /// Load-more rounds per rendered path
    pub load_more_clicks: u32,

    /// Wait after navigation and after each click (milliseconds)
    pub render_settle_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 50,
            accept_first_nonempty: false,
            max_pages: 100,
            max_pagination_pages: 10,
            max_sitemap_depth: 2,
            load_more_clicks: 3,
            render_settle_ms: 2000,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetcherConfig {
    pub user_agent: String,
    pub page_timeout_ms: u64,
    pub json_timeout_ms: u64,
    pub render_timeout_ms: u64,
    pub connect_timeout_ms: u64,

    /// In-flight requests allowed per host
    pub max_concurrent_per_host: usize,

    /// Minimum gap between request starts to one host (milliseconds)
    pub min_request_interval_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: format!(
                "DealerLocator/{} (+https://github.com/dealer-locator)",
                env!("CARGO_PKG_VERSION")
            ),
            page_timeout_ms: 10_000,
            json_timeout_ms: 10_000,
            render_timeout_ms: 15_000,
            connect_timeout_ms: 5_000,
            max_concurrent_per_host: 2,
            min_request_interval_ms: 0,
        }
    }
}

impl FetcherConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.page_timeout_ms)
    }

    pub fn json_timeout(&self) -> Duration {
        Duration::from_millis(self.json_timeout_ms)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }
}

/// Conventional path lists, replaceable per deployment
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub sitemaps: Vec<String>,
    pub directories: Vec<String>,
    pub api: Vec<String>,
    pub rendered: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sitemaps: to_owned_list(DEFAULT_SITEMAP_PATHS),
            directories: to_owned_list(DEFAULT_DIRECTORY_PATHS),
            api: to_owned_list(DEFAULT_API_PATHS),
            rendered: to_owned_list(DEFAULT_RENDERED_PATHS),
        }
    }
}

/// Additions to the built-in brand and skip lists
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TaxonomyConfig {
    /// Domain patterns (e.g. "*.dealerrater.com") that are never locations
    pub extra_skip_domains: Vec<String>,

    #[serde(rename = "brand")]
    pub brands: Vec<BrandEntry>,
}

/// A brand and the spellings it appears under in text and hostnames
#[derive(Debug, Clone, Deserialize)]
pub struct BrandEntry {
    pub canonical: String,
    #[serde(default)]
    pub variants: Vec<String>,
}

/// Paths known for one dealer group, tried before the conventional lists
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupProfile {
    /// Domain pattern (e.g., "autonation.com" or "*.autonation.com")
    pub domain: String,
    #[serde(default)]
    pub sitemaps: Vec<String>,
    #[serde(default)]
    pub directories: Vec<String>,
    #[serde(default)]
    pub api: Vec<String>,
    #[serde(default)]
    pub rendered: Vec<String>,
}

/// Path lists for one run, group-specific paths first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub sitemaps: Vec<String>,
    pub directories: Vec<String>,
    pub api: Vec<String>,
    pub rendered: Vec<String>,
}

impl Config {
    /// Returns the group profiles whose domain pattern matches `host`
    pub fn profiles_for<'a>(&'a self, host: &'a str) -> impl Iterator<Item = &'a GroupProfile> {
        let host = host.to_lowercase();
        self.groups
            .iter()
            .filter(move |group| matches_wildcard(&group.domain.to_lowercase(), &host))
    }

    /// Builds the path lists for a site, merging any matching group profile
    /// ahead of the conventional paths
    pub fn resolve_paths(&self, host: &str) -> ResolvedPaths {
        let mut resolved = ResolvedPaths::default();

        for profile in self.profiles_for(host) {
            resolved.sitemaps.extend(profile.sitemaps.iter().cloned());
            resolved.directories.extend(profile.directories.iter().cloned());
            resolved.api.extend(profile.api.iter().cloned());
            resolved.rendered.extend(profile.rendered.iter().cloned());
        }

        resolved.sitemaps.extend(self.paths.sitemaps.iter().cloned());
        resolved.directories.extend(self.paths.directories.iter().cloned());
        resolved.api.extend(self.paths.api.iter().cloned());
        resolved.rendered.extend(self.paths.rendered.iter().cloned());

        dedupe_in_place(&mut resolved.sitemaps);
        dedupe_in_place(&mut resolved.directories);
        dedupe_in_place(&mut resolved.api);
        dedupe_in_place(&mut resolved.rendered);

        resolved
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn dedupe_in_place(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}
