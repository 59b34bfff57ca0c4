use crate::config::types::{
    BrandEntry, Config, DiscoveryConfig, FetcherConfig, GroupProfile, PathsConfig, TaxonomyConfig,
};
use crate::ConfigError;

const TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_discovery_config(&config.discovery)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_paths_config(&config.paths)?;
    validate_taxonomy_config(&config.taxonomy)?;
    validate_groups(&config.groups)?;
    Ok(())
}

/// Validates traversal bounds
fn validate_discovery_config(config: &DiscoveryConfig) -> Result<(), ConfigError> {
    if config.acceptance_threshold < 1 {
        return Err(ConfigError::Validation(format!(
            "acceptance-threshold must be >= 1, got {}",
            config.acceptance_threshold
        )));
    }

    if config.max_pages < 1 || config.max_pages > 10_000 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be between 1 and 10000, got {}",
            config.max_pages
        )));
    }

    if config.max_pagination_pages > 10 {
        return Err(ConfigError::Validation(format!(
            "max-pagination-pages must be <= 10, got {}",
            config.max_pagination_pages
        )));
    }

    if config.max_sitemap_depth > 5 {
        return Err(ConfigError::Validation(format!(
            "max-sitemap-depth must be <= 5, got {}",
            config.max_sitemap_depth
        )));
    }

    if config.load_more_clicks > 10 {
        return Err(ConfigError::Validation(format!(
            "load-more-clicks must be <= 10, got {}",
            config.load_more_clicks
        )));
    }

    if config.render_settle_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "render-settle-ms must be <= 60000, got {}",
            config.render_settle_ms
        )));
    }

    Ok(())
}

/// Validates HTTP client settings
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("page-timeout-ms", config.page_timeout_ms),
        ("json-timeout-ms", config.json_timeout_ms),
        ("render-timeout-ms", config.render_timeout_ms),
        ("connect-timeout-ms", config.connect_timeout_ms),
    ] {
        if !TIMEOUT_RANGE_MS.contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 100 and 60000, got {}",
                name, value
            )));
        }
    }

    if config.max_concurrent_per_host < 1 || config.max_concurrent_per_host > 16 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-per-host must be between 1 and 16, got {}",
            config.max_concurrent_per_host
        )));
    }

    Ok(())
}

fn validate_paths_config(config: &PathsConfig) -> Result<(), ConfigError> {
    validate_paths(&config.sitemaps)?;
    validate_paths(&config.directories)?;
    validate_paths(&config.api)?;
    validate_paths(&config.rendered)?;
    Ok(())
}

fn validate_taxonomy_config(config: &TaxonomyConfig) -> Result<(), ConfigError> {
    for pattern in &config.extra_skip_domains {
        validate_domain_pattern(pattern)?;
    }

    for brand in &config.brands {
        validate_brand(brand)?;
    }

    Ok(())
}

fn validate_brand(brand: &BrandEntry) -> Result<(), ConfigError> {
    if brand.canonical.trim().is_empty() {
        return Err(ConfigError::Validation(
            "brand canonical name cannot be empty".to_string(),
        ));
    }

    if brand.variants.iter().any(|v| v.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "brand '{}' has an empty variant",
            brand.canonical
        )));
    }

    Ok(())
}

fn validate_groups(groups: &[GroupProfile]) -> Result<(), ConfigError> {
    for group in groups {
        validate_domain_pattern(&group.domain)?;
        validate_paths(&group.sitemaps)?;
        validate_paths(&group.directories)?;
        validate_paths(&group.api)?;
        validate_paths(&group.rendered)?;
    }
    Ok(())
}

/// Every configured path is site-relative
fn validate_paths(paths: &[String]) -> Result<(), ConfigError> {
    for path in paths {
        if !path.starts_with('/') {
            return Err(ConfigError::InvalidPath(format!(
                "'{}' must start with '/'",
                path
            )));
        }
    }
    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(domain) => validate_domain_string(domain),
        None => validate_domain_string(pattern),
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'autonation.com')",
            domain
        )));
    }

    Ok(())
}
