//! Main scraper API
//!
//! Ties the browser session, the settle strategy and the extractor together.
//! Each call to [`VideoScraper::scrape`] gets its own browser, and that
//! browser is released exactly once whatever happens in between.

use std::sync::Arc;

use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

use crate::browser::{
    BrowserLauncher, BrowserSession, ChromeLauncher, NavigateOptions, PageSnapshot,
};
use crate::config::{ScraperConfig, SettleStrategy};
use crate::error::{Result, ScrapeError};
use crate::extractor::extract_from_html;
use crate::types::{PageWindow, VideoRecord};
use crate::url::build_page_url;

/// Scrapes video records from the upstream listing
///
/// Cheap to share behind an `Arc`; it holds no per-request state.
pub struct VideoScraper {
    launcher: Arc<dyn BrowserLauncher>,
    config: ScraperConfig,
}

impl VideoScraper {
    /// Create a scraper with default configuration and a local Chromium
    pub fn new() -> Self {
        Self::with_config(ScraperConfig::default())
    }

    /// Create a scraper that launches Chromium per `config.browser`
    ///
    /// # Arguments
    /// * `config` - Upstream, timing and browser settings
    pub fn with_config(config: ScraperConfig) -> Self {
        let launcher = Arc::new(ChromeLauncher::new(config.launcher_settings()));
        Self::with_launcher(launcher, config)
    }

    /// Create a scraper driving an arbitrary browser implementation
    ///
    /// `config.browser` is ignored; the launcher decides how browsers start.
    pub fn with_launcher(launcher: Arc<dyn BrowserLauncher>, config: ScraperConfig) -> Self {
        Self { launcher, config }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Load one page of the listing and extract its video records
    ///
    /// # Arguments
    /// * `window` - `start`/`limit`, forwarded verbatim to the upstream URL
    ///
    /// # Returns
    /// Media-element records followed by container records, all complete
    ///
    /// # Errors
    /// - `Launch` if no browser could be acquired
    /// - `Navigation` / `NavigationTimeout` if the page never reached DOM-ready
    /// - `Evaluation` if the rendered document could not be read
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> videoscrape_core::Result<()> {
    /// use videoscrape_core::{PageWindow, VideoScraper};
    /// let scraper = VideoScraper::new();
    /// let window = PageWindow::new(Some("40".into()), Some("20".into()));
    /// for video in scraper.scrape(&window).await? {
    ///     println!("{} -> {}", video.title, video.video_url);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn scrape(&self, window: &PageWindow) -> Result<Vec<VideoRecord>> {
        let url = build_page_url(&self.config.upstream_url, window);
        info!(%url, "starting scrape");

        let mut session = self.launcher.launch().await?;
        let outcome = self.run_session(session.as_mut(), &url).await;

        if let Err(error) = session.close().await {
            warn!(%error, "failed to release browser");
        }

        match outcome {
            Ok(ref records) => info!(count = records.len(), "scrape finished"),
            Err(ref error) => warn!(%error, "scrape failed"),
        }
        outcome
    }

    async fn run_session(
        &self,
        session: &mut dyn BrowserSession,
        url: &str,
    ) -> Result<Vec<VideoRecord>> {
        let options = NavigateOptions {
            user_agent: self.config.user_agent.clone(),
            timeout: self.config.navigation_timeout,
        };

        match timeout(options.timeout, session.navigate(url, &options)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ScrapeError::NavigationTimeout {
                    url: url.to_string(),
                    timeout: options.timeout,
                });
            }
        }

        match self.config.settle {
            SettleStrategy::Fixed(delay) => {
                debug!(delay_ms = delay.as_millis() as u64, "settling");
                sleep(delay).await;
                extract_snapshot(&session.snapshot().await?)
            }
            SettleStrategy::UntilRecords {
                timeout: settle_timeout,
                poll_interval,
            } => {
                let deadline = Instant::now() + settle_timeout;
                let mut polls = 0u32;
                loop {
                    polls += 1;
                    let records = extract_snapshot(&session.snapshot().await?)?;
                    let now = Instant::now();
                    if !records.is_empty() || now >= deadline {
                        debug!(polls, count = records.len(), "settled");
                        return Ok(records);
                    }
                    sleep(poll_interval.min(deadline - now)).await;
                }
            }
        }
    }
}

impl Default for VideoScraper {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_snapshot(snapshot: &PageSnapshot) -> Result<Vec<VideoRecord>> {
    extract_from_html(&snapshot.html, snapshot.url.as_deref())
}
