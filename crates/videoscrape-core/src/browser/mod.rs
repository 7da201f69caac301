//! Browser automation boundary
//!
//! The scraper only needs three things from a browser: navigate somewhere,
//! hand back the rendered document, and shut down. [`BrowserLauncher`] and
//! [`BrowserSession`] capture exactly that so the rest of the crate can be
//! driven by a real Chromium ([`ChromeLauncher`]) or by a test double.

mod chrome;
mod remote;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

pub use chrome::{ChromeLauncher, ChromeSession};
pub use remote::resolve_websocket_url;

/// Options applied to a single navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigateOptions {
    /// User agent installed on the page before the request goes out
    pub user_agent: String,
    /// Budget for reaching DOM-ready; enforced by the caller as well
    pub timeout: Duration,
}

/// Rendered document handed back by the browser
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageSnapshot {
    /// Final document URL after redirects
    pub url: Option<String>,
    /// Serialized post-render DOM
    pub html: String,
}

/// An open browser with one fresh page
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate the page and wait for DOM-ready
    ///
    /// # Errors
    /// - `Navigation` for network errors or a non-2xx document
    async fn navigate(&mut self, url: &str, options: &NavigateOptions) -> Result<()>;

    /// Serialize the document in its current state
    ///
    /// # Errors
    /// - `Evaluation` if the page could not be read
    async fn snapshot(&mut self) -> Result<PageSnapshot>;

    /// Release the page and browser
    ///
    /// Calling it again after a successful close is a no-op.
    async fn close(&mut self) -> Result<()>;
}

/// Acquires a fresh browser session per scrape
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// # Errors
    /// - `Launch` if the browser cannot be started or reached
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}
