//! Crawler module for document fetching and strategy orchestration
//!
//! This module contains the plumbing the discovery strategies share:
//! - HTTP fetching with per-host limits
//! - HTML parsing and anchor extraction
//! - The deep-crawl frontier
//! - The browser session abstraction
//! - Overall discovery orchestration

mod browser;
mod fetcher;
mod frontier;
mod limiter;
mod orchestrator;
mod parser;

pub use browser::{BrowserSession, RenderedLink, LOAD_MORE_PATTERNS};
pub use fetcher::{build_http_client, FetchedPage, Fetcher, HttpFetcher};
pub use frontier::Frontier;
pub use limiter::{HostLimiter, HostPermit};
pub use orchestrator::{
    discover_locations, AcceptancePolicy, DiscoveryRequest, StrategyOrchestrator,
};
pub use parser::{find_directory_links, find_pagination_links, parse_html, Anchor, ParsedPage};
