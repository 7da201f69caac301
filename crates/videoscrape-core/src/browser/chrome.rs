//! Chromium sessions over the DevTools protocol

use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::handler::HandlerConfig;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::remote::resolve_websocket_url;
use super::{BrowserLauncher, BrowserSession, NavigateOptions, PageSnapshot};
use crate::config::BrowserSettings;
use crate::error::{Result, ScrapeError};

/// Resolves once the document has parsed (`DOMContentLoaded` or later)
const DOM_READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'interactive' || document.readyState === 'complete') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState), { once: true });
        }
    })
"#;

/// HTTP status of the main document, 0 when the browser does not expose it
const DOCUMENT_STATUS_SCRIPT: &str = r#"
    (() => {
        const entry = performance.getEntriesByType('navigation')[0];
        return entry && typeof entry.responseStatus === 'number' ? entry.responseStatus : 0;
    })()
"#;

const PROFILE_DIR_PREFIX: &str = "videoscrape-profile-";

/// Launches (or connects to) Chromium for each scrape
pub struct ChromeLauncher {
    settings: BrowserSettings,
    http: reqwest::Client,
}

impl ChromeLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
        }
    }

    /// Fresh, empty user-data directory for one launched browser
    fn new_profile_dir() -> Result<TempDir> {
        tempfile::Builder::new()
            .prefix(PROFILE_DIR_PREFIX)
            .tempdir()
            .map_err(|e| ScrapeError::Launch(format!("Failed to create profile directory: {}", e)))
    }

    fn browser_config(&self, profile_dir: &Path) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .args(self.settings.args())
            .user_data_dir(profile_dir)
            .request_timeout(self.settings.request_timeout);

        if let Some(ref path) = self.settings.executable {
            builder = builder.chrome_executable(path);
        }
        if !self.settings.headless {
            builder = builder.with_head();
        }

        builder
            .build()
            .map_err(|e| ScrapeError::Launch(format!("Failed to build browser config: {}", e)))
    }

    fn handler_config(&self) -> HandlerConfig {
        HandlerConfig {
            request_timeout: self.settings.request_timeout,
            ..HandlerConfig::default()
        }
    }

    async fn start_browser(&self) -> Result<ChromeSession> {
        let (browser, mut handler, ownership) = match self.settings.remote_url {
            Some(ref endpoint) => {
                let ws_url = resolve_websocket_url(&self.http, endpoint).await?;
                info!(%ws_url, "connecting to remote browser");
                let (browser, handler) = Browser::connect_with_config(ws_url, self.handler_config())
                    .await
                    .map_err(|e| ScrapeError::Launch(e.to_string()))?;
                (browser, handler, Ownership::Remote { context: None })
            }
            None => {
                let profile = Self::new_profile_dir()?;
                info!(
                    profile = ?self.settings.profile,
                    headless = self.settings.headless,
                    user_data_dir = %profile.path().display(),
                    "launching browser"
                );
                let (browser, handler) = Browser::launch(self.browser_config(profile.path())?)
                    .await
                    .map_err(|e| ScrapeError::Launch(e.to_string()))?;
                (browser, handler, Ownership::Owned { profile: Some(profile) })
            }
        };

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(ChromeSession {
            browser: Some(browser),
            page: None,
            handler_task,
            ownership,
        })
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let mut session = self.start_browser().await?;

        match session.open_page().await {
            Ok(()) => Ok(Box::new(session)),
            Err(error) => {
                if let Err(close_error) = session.close().await {
                    warn!(error = %close_error, "failed to close browser after launch error");
                }
                Err(error)
            }
        }
    }
}

/// What the session may tear down when it closes
enum Ownership {
    /// Browser launched for this session, with its own profile directory
    Owned { profile: Option<TempDir> },
    /// Shared remote browser; only the context created for this session is ours
    Remote { context: Option<BrowserContextId> },
}

/// One browser plus the page a scrape runs in
pub struct ChromeSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
    ownership: Ownership,
}

impl ChromeSession {
    async fn open_page(&mut self) -> Result<()> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| ScrapeError::Launch("Browser already closed".to_string()))?;

        let target = match self.ownership {
            Ownership::Owned { .. } => CreateTargetParams::new("about:blank"),
            Ownership::Remote { ref mut context } => {
                let id = browser
                    .execute(CreateBrowserContextParams::default())
                    .await
                    .map_err(|e| ScrapeError::Launch(format!("Failed to create browser context: {}", e)))?
                    .result
                    .browser_context_id;
                *context = Some(id.clone());
                CreateTargetParams::builder()
                    .url("about:blank")
                    .browser_context_id(id)
                    .build()
                    .map_err(ScrapeError::Launch)?
            }
        };

        let page = browser
            .new_page(target)
            .await
            .map_err(|e| ScrapeError::Launch(format!("Failed to open page: {}", e)))?;
        self.page = Some(page);
        Ok(())
    }

    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| ScrapeError::Evaluation("Page is closed".to_string()))
    }

    async fn evaluate<T>(&self, script: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(ScrapeError::Evaluation)?;

        self.page()?
            .evaluate_expression(params)
            .await
            .map_err(|e| ScrapeError::Evaluation(e.to_string()))?
            .into_value()
            .map_err(|e| ScrapeError::Evaluation(e.to_string()))
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&mut self, url: &str, options: &NavigateOptions) -> Result<()> {
        let page = self.page()?;

        page.execute(SetUserAgentOverrideParams::new(options.user_agent.clone()))
            .await
            .map_err(|e| ScrapeError::Navigation(format!("Failed to set user agent: {}", e)))?;

        info!(%url, "navigating");
        let response = page
            .execute(NavigateParams::new(url))
            .await
            .map_err(|e| ScrapeError::Navigation(e.to_string()))?;
        if let Some(ref error_text) = response.result.error_text {
            return Err(ScrapeError::Navigation(format!("{} at {}", error_text, url)));
        }

        let ready_state: String = self
            .evaluate(DOM_READY_SCRIPT)
            .await
            .map_err(|e| ScrapeError::Navigation(e.to_string()))?;
        debug!(%ready_state, "document ready");

        let status: u16 = self.evaluate(DOCUMENT_STATUS_SCRIPT).await.unwrap_or(0);
        if status != 0 && !(200..300).contains(&status) {
            return Err(ScrapeError::Navigation(format!(
                "Upstream responded with HTTP {} for {}",
                status, url
            )));
        }

        Ok(())
    }

    async fn snapshot(&mut self) -> Result<PageSnapshot> {
        let page = self.page()?;
        let html = page
            .content()
            .await
            .map_err(|e| ScrapeError::Evaluation(e.to_string()))?;
        let url = page
            .url()
            .await
            .map_err(|e| ScrapeError::Evaluation(e.to_string()))?;
        Ok(PageSnapshot { url, html })
    }

    async fn close(&mut self) -> Result<()> {
        let page = self.page.take();
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };

        let result = match self.ownership {
            Ownership::Owned { ref mut profile } => {
                drop(page);
                let result = match browser.close().await {
                    Ok(_) => browser
                        .wait()
                        .await
                        .map(|_| ())
                        .map_err(ScrapeError::Io),
                    Err(e) => Err(ScrapeError::Launch(format!("Failed to close browser: {}", e))),
                };
                if let Some(dir) = profile.take() {
                    if let Err(error) = dir.close() {
                        warn!(%error, "failed to remove profile directory");
                    }
                }
                result
            }
            Ownership::Remote { ref mut context } => {
                let result = match page {
                    Some(page) => page
                        .close()
                        .await
                        .map_err(|e| ScrapeError::Launch(format!("Failed to close page: {}", e))),
                    None => Ok(()),
                };
                if let Some(id) = context.take() {
                    if let Err(error) = browser.execute(DisposeBrowserContextParams::new(id)).await {
                        warn!(%error, "failed to dispose browser context");
                    }
                }
                result
            }
        };

        self.handler_task.abort();
        info!("browser closed");
        result
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn launcher(settings: BrowserSettings) -> ChromeLauncher {
        ChromeLauncher::new(BrowserSettings {
            executable: Some(PathBuf::from("/usr/bin/chromium")),
            ..settings
        })
    }

    #[test]
    fn test_each_launch_gets_its_own_profile_dir() {
        let launcher = launcher(BrowserSettings::default());
        let first = ChromeLauncher::new_profile_dir().unwrap();
        let second = ChromeLauncher::new_profile_dir().unwrap();

        let a = launcher.browser_config(first.path()).unwrap();
        let b = launcher.browser_config(second.path()).unwrap();

        assert_eq!(a.user_data_dir.as_deref(), Some(first.path()));
        assert_eq!(b.user_data_dir.as_deref(), Some(second.path()));
        assert_ne!(a.user_data_dir, b.user_data_dir);
    }

    #[test]
    fn test_profile_dir_removed_on_close() {
        let dir = ChromeLauncher::new_profile_dir().unwrap();
        let path = dir.path().to_path_buf();
        assert!(path.is_dir());
        assert!(
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(PROFILE_DIR_PREFIX))
        );

        dir.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_request_timeout_follows_settings() {
        let launcher = launcher(BrowserSettings {
            request_timeout: Duration::from_secs(45),
            ..BrowserSettings::default()
        });
        let dir = ChromeLauncher::new_profile_dir().unwrap();
        let config = launcher.browser_config(dir.path()).unwrap();

        let rendered = format!("{:?}", config);
        assert!(
            rendered.contains("request_timeout: 45s"),
            "unexpected config: {rendered}"
        );
        assert_eq!(launcher.handler_config().request_timeout, Duration::from_secs(45));
    }

    #[test]
    fn test_default_request_timeout_matches_navigation_budget() {
        let launcher = launcher(BrowserSettings::default());
        assert_eq!(launcher.handler_config().request_timeout, Duration::from_secs(60));
    }
}
