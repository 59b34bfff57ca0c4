use crate::UrlError;
use url::form_urlencoded::{self, Serializer};
use url::Url;

/// List of tracking query parameters to remove during canonicalization
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "msclkid",
    "mc_eid",
    "_ga",
];

/// Query parameter names that carry a dealer identifier, compared after
/// lowercasing and removing `-`/`_`
const DEALER_ID_PARAMS: &[&str] = &["dealer", "dealerid", "dealercode"];

/// Canonicalizes a URL into the form used as a dedup key
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed or not HTTP(S)
/// 2. Normalize the path (dot segments, repeated slashes, trailing slash)
/// 3. Remove the fragment
/// 4. Remove tracking query parameters and sort the rest
/// 5. Lowercase the whole URL
/// 6. Strip a trailing slash
///
/// # Examples
///
/// ```
/// use dealer_locator::url::canonicalize_url;
///
/// let url = canonicalize_url("https://www.KendallFord.com/").unwrap();
/// assert_eq!(url, "https://www.kendallford.com");
///
/// let url = canonicalize_url("https://group.com/Dealers/Kendall-Acura/#map").unwrap();
/// assert_eq!(url, "https://group.com/dealers/kendall-acura");
/// ```
pub fn canonicalize_url(url_str: &str) -> Result<String, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize_parsed(url)
}

/// Parses the root URL a discovery run starts from
///
/// A bare host such as `kendallautogroup.com` is read as `https://`.
///
/// # Returns
///
/// * `Ok(Url)` - An absolute HTTP(S) URL with a host
/// * `Err(UrlError)` - Empty input, unparseable input, a non-HTTP scheme, or no host
pub fn parse_root_url(input: &str) -> Result<Url, UrlError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlError::Parse("empty URL".to_string()));
    }

    let url = if input.contains("://") {
        Url::parse(input)
    } else {
        Url::parse(&format!("https://{}", input))
    }
    .map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingDomain),
    }
}

/// Canonicalizes an already-parsed URL
pub fn canonicalize_parsed(mut url: Url) -> Result<String, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let filtered_params = filter_and_sort_query_params(&url);

        if filtered_params.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&encode_query(&filtered_params)));
        }
    }

    let mut canonical = url.as_str().to_lowercase();
    if canonical.ends_with('/') {
        canonical.pop();
    }

    Ok(canonical)
}

/// Resolves an href found on a page against the page's URL
///
/// Returns None if the link can never be a location:
/// - javascript:, mailto:, tel:, data: schemes
/// - fragment-only links (same page anchors)
/// - invalid URLs
/// - non-HTTP(S) URLs after resolution
pub fn resolve_href(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("sms:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" => {
            Some(absolute_url)
        }
        _ => None,
    }
}

/// Extracts a dealer identifier from a `dealer=<id>`-style query parameter
///
/// # Examples
///
/// ```
/// use dealer_locator::url::dealer_id;
/// use url::Url;
///
/// let url = Url::parse("https://group.com/dealer-info?dealer=123&tab=hours").unwrap();
/// assert_eq!(dealer_id(&url), Some("123".to_string()));
/// ```
pub fn dealer_id(url: &Url) -> Option<String> {
    url.query_pairs().find_map(|(key, value)| {
        let key: String = key
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        let value = value.trim();
        if DEALER_ID_PARAMS.contains(&key.as_str()) && !value.is_empty() {
            Some(value.to_lowercase())
        } else {
            None
        }
    })
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let mut normalized_segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    if normalized_segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", normalized_segments.join("/"))
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort();

    params
}

/// Re-encodes decoded query pairs; a valueless flag stays `a`, not `a=`
fn encode_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| {
            if value.is_empty() {
                // Serializer always writes `=`
                form_urlencoded::byte_serialize(key.as_bytes()).collect()
            } else {
                Serializer::new(String::new()).append_pair(key, value).finish()
            }
        })
        .collect::<Vec<String>>()
        .join("&")
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
