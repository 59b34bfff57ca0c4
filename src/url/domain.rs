use url::Url;

/// Two-label public suffixes common enough among dealer sites to matter
const TWO_PART_SUFFIXES: &[&str] = &["co.uk", "com.au", "co.nz", "com.mx", "co.za"];

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use dealer_locator::url::extract_domain;
///
/// let url = Url::parse("https://WWW.KendallFord.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.kendallford.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Strips a leading `www.` from a host
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Checks whether two hosts belong to the same site
///
/// Hosts match when they are equal after dropping `www.`, or when one is a
/// subdomain of the other (`locations.group.com` and `group.com`).
///
/// # Examples
///
/// ```
/// use dealer_locator::url::same_site;
///
/// assert!(same_site("www.group.com", "group.com"));
/// assert!(same_site("locations.group.com", "www.group.com"));
/// assert!(!same_site("kendallford.com", "group.com"));
/// ```
pub fn same_site(a: &str, b: &str) -> bool {
    let a = strip_www(a);
    let b = strip_www(b);

    a == b || a.ends_with(&format!(".{}", b)) || b.ends_with(&format!(".{}", a))
}

/// Returns the label directly below the public suffix
///
/// `www.kendallford.com` yields `kendallford`, `shop.hondaofbend.co.uk`
/// yields `hondaofbend`. IP addresses and single-label hosts yield None.
pub fn registrable_label(host: &str) -> Option<&str> {
    if host.parse::<std::net::IpAddr>().is_ok() {
        return None;
    }

    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 2 {
        return None;
    }

    let tail = format!("{}.{}", labels[labels.len() - 2], labels[labels.len() - 1]);
    let suffix_len = if labels.len() >= 3 && TWO_PART_SUFFIXES.contains(&tail.as_str()) {
        2
    } else {
        1
    };

    labels.len().checked_sub(suffix_len + 1).map(|i| labels[i])
}
