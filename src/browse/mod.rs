//! # Navigation layer
//! The capability the crawler needs from a browser: navigate, fill a field,
//! click something and wait for the network response it causes, read the
//! rendered markup, and clear leftover overlays.
//!
//! Timeouts are applied by callers (`tokio::time::timeout`), so an
//! implementation may simply wait until the matching response arrives.

pub mod http;

use anyhow::Result;

/// Which network response a click is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMatch {
    /// Substring of the response URL, e.g. `/list.do`.
    pub url_contains: String,
    pub status: u16,
}

impl ResponseMatch {
    pub fn ok(url_contains: impl Into<String>) -> Self {
        Self {
            url_contains: url_contains.into(),
            status: 200,
        }
    }

    pub fn matches(&self, url: &str, status: u16) -> bool {
        status == self.status && url.contains(&self.url_contains)
    }
}

/// One page/tab. Used strictly sequentially by a single cycle.
#[async_trait::async_trait]
pub trait Page: Send {
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Set the value of the input matched by `selector`.
    async fn fill(&mut self, selector: &str, value: &str) -> Result<()>;

    /// Click the element matched by `selector` and return the body of the first
    /// response that satisfies `expect`.
    async fn click_and_await(&mut self, selector: &str, expect: &ResponseMatch) -> Result<String>;

    /// Markup as currently rendered.
    async fn content(&mut self) -> Result<String>;

    /// Close any modal/overlay left open by a previous click.
    async fn reset_interaction_surface(&mut self) -> Result<()>;
}

#[async_trait::async_trait]
pub trait Browser: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn Page>>;
}
