//! Integration tests for location discovery
//!
//! These tests use wiremock to create mock dealer group sites and run the
//! full strategy chain end-to-end over HTTP.

use dealer_locator::config::{Config, GroupProfile};
use dealer_locator::crawler::{DiscoveryRequest, StrategyOrchestrator};
use dealer_locator::{discover_locations, DiscoveryMethod, LocationKind, LocatorError, UrlError};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{any, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BRANDS: &[&str] = &["ford", "toyota", "honda", "subaru", "mazda"];
const CITIES: &[&str] = &[
    "anchorage", "eugene", "bend", "salem", "boise", "fairbanks", "spokane", "tacoma", "olympia",
];

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Directory grid: 8 dealership cards, 6 of them with an extra "Visit Site"
/// button pointing at the same dealer and 3 with a service department link
fn directory_grid() -> String {
    let dealers = [
        ("kendallford", "Kendall Ford"),
        ("kendalltoyota", "Kendall Toyota"),
        ("kendallhonda", "Kendall Honda"),
        ("kendallsubaru", "Kendall Subaru"),
        ("kendallmazda", "Kendall Mazda"),
        ("kendallkia", "Kendall Kia"),
        ("kendallnissan", "Kendall Nissan"),
        ("kendallhyundai", "Kendall Hyundai"),
    ];

    let mut body = String::from(
        r#"<nav><a href="/">Home</a><a href="/careers">Careers</a><a href="/privacy">Privacy</a></nav>"#,
    );
    for (i, (domain, name)) in dealers.iter().enumerate() {
        body.push_str(&format!(
            r#"<div class="dealer-card"><h3><a href="https://www.{}.com/">{}</a></h3>"#,
            domain, name
        ));
        if i < 3 {
            body.push_str(&format!(
                r#"<a href="https://www.{}.com/service-appointment">Schedule Service</a>"#,
                domain
            ));
        }
        if i < 6 {
            body.push_str(&format!(
                r#"<a class="btn" href="https://www.{}.com/?utm_source=group">Visit Site</a>"#,
                domain
            ));
        }
        body.push_str("</div>");
    }
    body
}

#[tokio::test]
async fn test_sitemap_discovery() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let mut entries = String::new();
    for n in 0..500 {
        let loc = match n % 25 {
            0..=5 => format!("{}/dealer/store-{}", base_url, n),
            6..=12 => format!("{}/blog/post-{}", base_url, n),
            _ => format!("{}/specials/offer-{}", base_url, n),
        };
        entries.push_str(&format!("<url><loc>{}</loc></url>", loc));
    }
    let sitemap = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    );

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(sitemap)
                .insert_header("content-type", "application/xml"),
        )
        .mount(&mock_server)
        .await;

    // The sitemap result is accepted, so no directory page is ever fetched
    Mock::given(method("GET"))
        .and(path("/locations"))
        .respond_with(html(""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = discover_locations(&base_url, Config::default())
        .await
        .expect("Discovery failed");

    assert_eq!(result.method(), DiscoveryMethod::Sitemap);
    assert_eq!(result.total_found(), 120);
    assert!(result
        .locations()
        .iter()
        .all(|l| l.canonical_url.contains("/dealer/store-")
            && l.classification == LocationKind::InternalPage));
}

#[tokio::test]
async fn test_directory_page_discovery() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/locations"))
        .respond_with(html(&directory_grid()))
        .mount(&mock_server)
        .await;

    let orchestrator = StrategyOrchestrator::from_config(Config::default()).unwrap();
    let result = orchestrator
        .discover(&base_url, DiscoveryRequest::default())
        .await
        .expect("Discovery failed");

    assert_eq!(result.method(), DiscoveryMethod::KnownPages);
    assert_eq!(result.total_found(), 8);
    assert_eq!(result.locations()[0].display_name, "Kendall Ford");
    assert_eq!(result.locations()[0].canonical_url, "https://www.kendallford.com");
    assert!(result
        .locations()
        .iter()
        .all(|l| l.classification == LocationKind::ExternalSite));

    // Same documents, same answer
    let again = orchestrator
        .discover(&base_url, DiscoveryRequest::default())
        .await
        .expect("Discovery failed");
    assert_eq!(again, result);
}

#[tokio::test]
async fn test_homepage_directory_link() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let homepage = r#"<html><body><nav>
        <a href="/new-inventory">New Inventory</a>
        <a href="/the-family">Our Dealerships</a>
    </nav></body></html>"#;

    Mock::given(method("GET"))
        .and(path("/the-family"))
        .respond_with(html(&directory_grid()))
        .expect(1)
        .mount(&mock_server)
        .await;

    // The supplied homepage is used instead of fetching the root
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(homepage))
        .expect(0)
        .mount(&mock_server)
        .await;

    let orchestrator = StrategyOrchestrator::from_config(Config::default()).unwrap();
    let result = orchestrator
        .discover(&base_url, DiscoveryRequest::new().with_homepage(homepage))
        .await
        .expect("Discovery failed");

    assert_eq!(result.method(), DiscoveryMethod::KnownPages);
    assert_eq!(result.total_found(), 8);
}

#[tokio::test]
async fn test_api_discovery() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let mut dealers = Vec::new();
    for city in CITIES {
        for brand in BRANDS {
            dealers.push(json!({
                "dealerName": format!("{} {}", capitalize(city), capitalize(brand)),
                "url": format!("https://www.{}{}.com/", city, brand),
                "logo": format!("https://cdn.example.net/logos/{}.png", brand),
                "phone": "555-0100",
            }));
        }
    }
    assert_eq!(dealers.len(), 45);

    Mock::given(method("GET"))
        .and(path("/api/dealers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "dealers": dealers })))
        .mount(&mock_server)
        .await;

    // Not JSON: skipped without failing the run
    Mock::given(method("GET"))
        .and(path("/api/locations"))
        .respond_with(html("<p>Page not found</p>"))
        .mount(&mock_server)
        .await;

    let result = discover_locations(&base_url, Config::default())
        .await
        .expect("Discovery failed");

    assert_eq!(result.method(), DiscoveryMethod::Api);
    assert_eq!(result.total_found(), 45);
    assert!(result
        .locations()
        .iter()
        .any(|l| l.display_name == "Anchorage Ford"
            && l.canonical_url == "https://www.anchorageford.com"));
}

#[tokio::test]
async fn test_group_profile_endpoint() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let host = url::Url::parse(&base_url)
        .expect("Failed to parse base URL")
        .host_str()
        .expect("Failed to extract host")
        .to_string();

    Mock::given(method("GET"))
        .and(path("/v3/dealer-feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Kendall Ford", "website": "https://www.kendallford.com"},
            {"name": "Kendall Kia", "website": "https://www.kendallkia.com"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.groups.push(GroupProfile {
        domain: host,
        api: vec!["/v3/dealer-feed".to_string()],
        ..Default::default()
    });

    let result = discover_locations(&base_url, config)
        .await
        .expect("Discovery failed");

    assert_eq!(result.method(), DiscoveryMethod::Api);
    assert_eq!(result.total_found(), 2);
}

#[tokio::test]
async fn test_deep_crawl_is_bounded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Every page links to 20 more location-ish pages, including itself
    let links: String = (1..=20)
        .map(|n| format!(r#"<a href="/our-dealers/{}">Group page {}</a>"#, n, n))
        .collect();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"{}<a href="https://www.kendallford.com/">Kendall Ford</a>"#,
            links
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/our-dealers/\d+$"))
        .respond_with(html(&links))
        .expect(4)
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.discovery.max_pages = 5;

    let result = discover_locations(&base_url, config)
        .await
        .expect("Discovery failed");

    assert_eq!(result.method(), DiscoveryMethod::DeepCrawl);
    assert_eq!(result.total_found(), 1);
    assert_eq!(result.locations()[0].canonical_url, "https://www.kendallford.com");
}

#[tokio::test]
async fn test_nothing_found() {
    let mock_server = MockServer::start().await;

    let result = discover_locations(&mock_server.uri(), Config::default())
        .await
        .expect("Discovery failed");

    assert!(result.is_empty());
    assert_eq!(result.method(), DiscoveryMethod::None);
    assert_eq!(result.total_found(), 0);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(html(&directory_grid()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let token = CancellationToken::new();
    token.cancel();

    let orchestrator = StrategyOrchestrator::from_config(Config::default()).unwrap();
    let result = orchestrator
        .discover(
            &mock_server.uri(),
            DiscoveryRequest::new().with_cancellation(token),
        )
        .await
        .expect("Discovery failed");

    assert!(result.is_empty());
}

#[tokio::test]
async fn test_invalid_root_url() {
    let result = discover_locations("http://", Config::default()).await;
    assert!(matches!(result, Err(LocatorError::UrlError(_))));

    let result = discover_locations("ftp://files.kendallautogroup.com/", Config::default()).await;
    assert!(matches!(
        result,
        Err(LocatorError::UrlError(UrlError::InvalidScheme(_)))
    ));
}

#[tokio::test]
async fn test_config_file_drives_discovery() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/our-stores-list"))
        .respond_with(html(&directory_grid()))
        .mount(&mock_server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(
        &mut file,
        br#"
[discovery]
acceptance-threshold = 5

[paths]
sitemaps = []
directories = ["/our-stores-list"]
api = []
"#,
    )
    .unwrap();

    let config = dealer_locator::config::load_config(file.path()).unwrap();
    let result = discover_locations(&base_url, config)
        .await
        .expect("Discovery failed");

    // 8 > 5, so the directory result is accepted before the deep crawl
    assert_eq!(result.method(), DiscoveryMethod::KnownPages);
    assert_eq!(result.total_found(), 8);
}
