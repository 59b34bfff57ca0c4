//! URL handling for location discovery
//!
//! Canonicalization (the dedup key), href resolution, host comparison,
//! wildcard matching and placement of a location relative to the group's
//! root site.

mod domain;
mod matcher;
mod normalize;

use crate::model::LocationKind;
use url::Url;

pub use domain::{extract_domain, registrable_label, same_site, strip_www};
pub use matcher::{matches_any, matches_wildcard};
pub use normalize::{
    canonicalize_parsed, canonicalize_url, dealer_id, parse_root_url, resolve_href,
};

/// Decides where a location lives relative to the group's root site
///
/// # Arguments
///
/// * `url` - The location URL
/// * `root` - The root URL discovery started from
///
/// # Returns
///
/// * `InternalPage` - same host as the root (ignoring `www.`) or a subdomain of it
/// * `ExternalSite` - any other host
/// * `Unknown` - the URL has no host
pub fn classify_location(url: &Url, root: &Url) -> LocationKind {
    let (Some(host), Some(root_host)) = (extract_domain(url), extract_domain(root)) else {
        return LocationKind::Unknown;
    };

    if same_site(&host, &root_host) {
        LocationKind::InternalPage
    } else {
        LocationKind::ExternalSite
    }
}

/// Checks whether `url` belongs to the same site as `root`
pub fn is_same_site(url: &Url, root: &Url) -> bool {
    match (extract_domain(url), extract_domain(root)) {
        (Some(host), Some(root_host)) => same_site(&host, &root_host),
        _ => false,
    }
}
