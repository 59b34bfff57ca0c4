/// Checks if a host matches a domain pattern
///
/// Two pattern forms are supported:
/// 1. Exact: "kendallautogroup.com" matches only that host
/// 2. Wildcard: "*.ford.com" matches "ford.com" and any subdomain of it,
///    but not "kendallford.com"
///
/// Both sides are expected to be lowercase already.
///
/// # Examples
///
/// ```
/// use dealer_locator::url::matches_wildcard;
///
/// assert!(matches_wildcard("*.ford.com", "ford.com"));
/// assert!(matches_wildcard("*.ford.com", "owner.ford.com"));
/// assert!(!matches_wildcard("*.ford.com", "kendallford.com"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => candidate == pattern,
    }
}

/// Checks a host against a list of patterns
pub fn matches_any<'a, I>(patterns: I, candidate: &str) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    patterns
        .into_iter()
        .any(|pattern| matches_wildcard(pattern, candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact() {
        assert!(matches_wildcard("facebook.com", "facebook.com"));
        assert!(!matches_wildcard("facebook.com", "m.facebook.com"));
        assert!(!matches_wildcard("maps.google.com", "google.com"));
    }

    #[test]
    fn test_wildcard_bare_and_subdomains() {
        assert!(matches_wildcard("*.facebook.com", "facebook.com"));
        assert!(matches_wildcard("*.facebook.com", "www.facebook.com"));
        assert!(matches_wildcard("*.toyota.com", "shop.owners.toyota.com"));
    }

    #[test]
    fn test_wildcard_does_not_match_embedded_brand() {
        // dealer sites often embed the manufacturer name
        assert!(!matches_wildcard("*.toyota.com", "anchoragetoyota.com"));
        assert!(!matches_wildcard("*.kia.com", "kendallkia.com"));
        assert!(!matches_wildcard("*.ford.com", "ford.com.evil.net"));
    }

    #[test]
    fn test_empty() {
        assert!(!matches_wildcard("*.ford.com", ""));
        assert!(!matches_wildcard("", "ford.com"));
    }

    #[test]
    fn test_matches_any() {
        let patterns = ["*.youtube.com", "*.instagram.com", "x.com"];
        assert!(matches_any(patterns.iter().copied(), "www.youtube.com"));
        assert!(matches_any(patterns.iter().copied(), "x.com"));
        assert!(!matches_any(patterns.iter().copied(), "kendallhonda.com"));
    }
}
