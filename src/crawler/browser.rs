//! Browser session abstraction for script-rendered directories
//!
//! Some dealer groups build their location grid entirely in JavaScript, so
//! plain fetching sees an empty page. The rendered strategy drives a
//! [`BrowserSession`] instead. No browser ships with this crate; callers
//! plug in their own automation (a CDP client, a WebDriver session) or a
//! scripted fake in tests.

use crate::BrowserError;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Button and link texts that reveal more locations when clicked
pub const LOAD_MORE_PATTERNS: &[&str] = &["load more", "show more", "view all"];

/// A link as read from the rendered DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLink {
    /// The `href` attribute, possibly relative
    pub href: String,

    /// Visible text of the element
    pub text: String,
}

impl RenderedLink {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }
}

/// One live page in a headless browser
///
/// The orchestrator borrows the session for a single run and never closes
/// it; the caller owns its lifecycle.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Loads `url` and waits for the document to finish loading
    async fn navigate(&self, url: &Url) -> Result<(), BrowserError>;

    /// Returns every `<a href>` currently in the DOM, in document order
    async fn extract_links(&self) -> Result<Vec<RenderedLink>, BrowserError>;

    /// Clicks the first visible button or link whose text contains one of
    /// `patterns` (case-insensitive)
    ///
    /// Returns false when nothing matched.
    async fn click_if_present(&self, patterns: &[&str]) -> Result<bool, BrowserError>;

    /// Waits for client-side rendering to settle
    async fn sleep(&self, millis: u64) {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}
