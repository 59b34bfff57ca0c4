//! Integration tests for the rendered (browser) fallback
//!
//! The HTTP side runs against a wiremock site; the browser is a scripted
//! session that reveals dealer cards as "load more" is clicked.

use async_trait::async_trait;
use dealer_locator::config::Config;
use dealer_locator::crawler::{BrowserSession, DiscoveryRequest, RenderedLink, StrategyOrchestrator};
use dealer_locator::{BrowserError, DiscoveryMethod};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// What the fake browser does when it lands on a path
#[derive(Clone)]
enum Page {
    /// `per_round` cards, `clicks` more rounds behind a "Load More" button
    Grid { per_round: usize, clicks: usize },
    Hang,
    Crash,
}

struct ScriptedBrowser {
    script: Vec<(&'static str, Page)>,
    state: Mutex<BrowserState>,
}

#[derive(Default)]
struct BrowserState {
    visited: Vec<String>,
    current: Option<(String, Page)>,
    clicks: usize,
}

impl ScriptedBrowser {
    fn new(script: Vec<(&'static str, Page)>) -> Self {
        Self {
            script,
            state: Mutex::new(BrowserState::default()),
        }
    }

    fn visited(&self) -> Vec<String> {
        self.state.lock().unwrap().visited.clone()
    }
}

#[async_trait]
impl BrowserSession for ScriptedBrowser {
    async fn navigate(&self, url: &Url) -> Result<(), BrowserError> {
        let page = self
            .script
            .iter()
            .find(|(p, _)| *p == url.path())
            .map(|(_, page)| page.clone());

        {
            let mut state = self.state.lock().unwrap();
            state.visited.push(url.path().to_string());
            state.clicks = 0;
            state.current = page.clone().map(|page| (url.to_string(), page));
        }

        match page {
            Some(Page::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            }
            Some(Page::Crash) => Err(BrowserError::SessionClosed),
            _ => Ok(()),
        }
    }

    async fn extract_links(&self) -> Result<Vec<RenderedLink>, BrowserError> {
        let state = self.state.lock().unwrap();
        let mut links = vec![
            RenderedLink::new("/", "Home"),
            RenderedLink::new("/privacy-policy", "Privacy Policy"),
        ];
        if let Some((_, Page::Grid { per_round, .. })) = &state.current {
            let shown = per_round * (state.clicks + 1);
            links.extend((0..shown).map(|n| {
                RenderedLink::new(
                    format!("/dealers/kendall-store-{:02}", n),
                    format!("Kendall Store {:02}", n),
                )
            }));
        }
        Ok(links)
    }

    async fn click_if_present(&self, patterns: &[&str]) -> Result<bool, BrowserError> {
        assert!(patterns.contains(&"load more"));
        let mut state = self.state.lock().unwrap();
        let available = match &state.current {
            Some((_, Page::Grid { clicks, .. })) => *clicks,
            _ => 0,
        };
        if state.clicks < available {
            state.clicks += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn fast_config() -> Config {
    let mut config = Config::default();
    config.discovery.render_settle_ms = 0;
    config.fetcher.render_timeout_ms = 200;
    config
}

#[tokio::test]
async fn test_load_more_grid() {
    let mock_server = MockServer::start().await;
    let browser = ScriptedBrowser::new(vec![(
        "/locations",
        Page::Grid {
            per_round: 10,
            clicks: 2,
        },
    )]);

    let orchestrator = StrategyOrchestrator::from_config(fast_config()).unwrap();
    let result = orchestrator
        .discover(
            &mock_server.uri(),
            DiscoveryRequest::new().with_browser(&browser),
        )
        .await
        .expect("Discovery failed");

    assert_eq!(result.method(), DiscoveryMethod::Rendered);
    assert_eq!(result.total_found(), 30);
    assert_eq!(
        browser.visited(),
        vec!["/locations", "/dealerships", "/stores", "/our-locations"]
    );
}

#[tokio::test]
async fn test_session_crash_keeps_partial_result() {
    let mock_server = MockServer::start().await;
    let browser = ScriptedBrowser::new(vec![
        (
            "/locations",
            Page::Grid {
                per_round: 12,
                clicks: 0,
            },
        ),
        ("/dealerships", Page::Crash),
        (
            "/stores",
            Page::Grid {
                per_round: 40,
                clicks: 0,
            },
        ),
    ]);

    let orchestrator = StrategyOrchestrator::from_config(fast_config()).unwrap();
    let result = orchestrator
        .discover(
            &mock_server.uri(),
            DiscoveryRequest::new().with_browser(&browser),
        )
        .await
        .expect("Discovery failed");

    assert_eq!(result.method(), DiscoveryMethod::Rendered);
    assert_eq!(result.total_found(), 12);
    assert_eq!(browser.visited(), vec!["/locations", "/dealerships"]);
}

#[tokio::test]
async fn test_navigation_timeout_moves_on() {
    let mock_server = MockServer::start().await;
    let browser = ScriptedBrowser::new(vec![
        ("/locations", Page::Hang),
        (
            "/dealerships",
            Page::Grid {
                per_round: 5,
                clicks: 1,
            },
        ),
    ]);

    let orchestrator = StrategyOrchestrator::from_config(fast_config()).unwrap();
    let result = orchestrator
        .discover(
            &mock_server.uri(),
            DiscoveryRequest::new().with_browser(&browser),
        )
        .await
        .expect("Discovery failed");

    assert_eq!(result.method(), DiscoveryMethod::Rendered);
    assert_eq!(result.total_found(), 10);
}

#[tokio::test]
async fn test_browser_skipped_when_http_result_is_good_enough() {
    let mock_server = MockServer::start().await;

    let cards: String = ["kendallford", "kendalltoyota", "kendallhonda", "kendallkia"]
        .iter()
        .map(|domain| format!(r#"<a href="https://www.{}.com/">{}</a>"#, domain, domain))
        .collect();
    Mock::given(method("GET"))
        .and(path("/locations"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("<html><body>{}</body></html>", cards))
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let browser = ScriptedBrowser::new(vec![(
        "/locations",
        Page::Grid {
            per_round: 100,
            clicks: 0,
        },
    )]);

    // 4 found: not above the threshold, but not below it either
    let mut config = fast_config();
    config.discovery.acceptance_threshold = 4;

    let orchestrator = StrategyOrchestrator::from_config(config).unwrap();
    let result = orchestrator
        .discover(
            &mock_server.uri(),
            DiscoveryRequest::new().with_browser(&browser),
        )
        .await
        .expect("Discovery failed");

    assert_eq!(result.method(), DiscoveryMethod::KnownPages);
    assert_eq!(result.total_found(), 4);
    assert!(browser.visited().is_empty());
}
