//! Scraper configuration
//!
//! Defaults reproduce the production behaviour (60 s navigation budget,
//! 3 s settle delay, desktop Chrome user agent). Every value can be
//! overridden from environment variables through [`ScraperConfig::from_env`].

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ::config::{Config, Environment, Map};
use serde::Deserialize;

use crate::error::{Result, ScrapeError};
use crate::url::DEFAULT_UPSTREAM_URL;

/// Desktop Chrome user agent sent with every navigation
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Flags used when launching a local Chromium
const LOCAL_CHROME_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--no-first-run",
    "--no-zygote",
    "--single-process",
    "--disable-gpu",
];

/// Flags for sandboxed serverless runtimes (read-only fs, no /dev/shm, no GPU)
const SERVERLESS_CHROME_ARGS: &[&str] = &[
    "--allow-running-insecure-content",
    "--autoplay-policy=user-gesture-required",
    "--disable-component-update",
    "--disable-domain-reliability",
    "--disable-features=AudioServiceOutOfProcess,IsolateOrigins,site-per-process",
    "--disable-print-preview",
    "--disable-setuid-sandbox",
    "--disable-site-isolation-trials",
    "--disable-speech-api",
    "--disable-web-security",
    "--disk-cache-size=33554432",
    "--enable-features=SharedArrayBuffer",
    "--hide-scrollbars",
    "--ignore-gpu-blocklist",
    "--in-process-gpu",
    "--mute-audio",
    "--no-default-browser-check",
    "--no-pings",
    "--no-sandbox",
    "--no-zygote",
    "--use-gl=angle",
    "--use-angle=swiftshader",
    "--window-size=1920,1080",
    "--single-process",
];

/// How long to let client-side rendering run before extracting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleStrategy {
    /// Sleep for a fixed duration after DOM-ready
    Fixed(Duration),
    /// Re-extract every `poll_interval` until a record qualifies or `timeout` passes
    UntilRecords {
        timeout: Duration,
        poll_interval: Duration,
    },
}

impl Default for SettleStrategy {
    fn default() -> Self {
        Self::Fixed(Duration::from_secs(3))
    }
}

/// Where the browser runs, which decides its launch flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchProfile {
    #[default]
    Local,
    Serverless,
}

impl LaunchProfile {
    /// Chromium command-line flags for this profile
    pub fn chrome_args(self) -> Vec<String> {
        let args = match self {
            Self::Local => LOCAL_CHROME_ARGS,
            Self::Serverless => SERVERLESS_CHROME_ARGS,
        };
        args.iter().map(|a| a.to_string()).collect()
    }
}

impl FromStr for LaunchProfile {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "serverless" | "lambda" | "vercel" => Ok(Self::Serverless),
            other => Err(ScrapeError::Config(format!(
                "DEPLOY_TARGET must be `local` or `serverless`, got `{}`",
                other
            ))),
        }
    }
}

/// Browser launch settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserSettings {
    /// Launch flag set (default: local)
    pub profile: LaunchProfile,
    /// Explicit Chromium executable; auto-detected when `None`
    pub executable: Option<PathBuf>,
    /// Run without a window (default: true)
    pub headless: bool,
    /// Existing DevTools endpoint (`ws://…` or `http://host:9222`) to connect to
    pub remote_url: Option<String>,
    /// Extra flags appended after the profile flags
    pub extra_args: Vec<String>,
    /// Per-command DevTools deadline (default: 60 s)
    pub request_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            profile: LaunchProfile::Local,
            executable: None,
            headless: true,
            remote_url: None,
            extra_args: Vec::new(),
            request_timeout: DEFAULT_NAVIGATION_TIMEOUT,
        }
    }
}

impl BrowserSettings {
    /// Profile flags followed by any extra flags
    pub fn args(&self) -> Vec<String> {
        let mut args = self.profile.chrome_args();
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// Configuration for a scrape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    /// Listing endpoint, without query string
    pub upstream_url: String,
    /// User agent set on the page before navigation
    pub user_agent: String,
    /// Budget for navigation up to DOM-ready (default: 60 s)
    pub navigation_timeout: Duration,
    /// Post-DOM-ready wait (default: fixed 3 s)
    pub settle: SettleStrategy,
    pub browser: BrowserSettings,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            settle: SettleStrategy::default(),
            browser: BrowserSettings::default(),
        }
    }
}

/// Environment keys, lower-cased by the `config` environment source
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    upstream_base_url: Option<String>,
    scraper_user_agent: Option<String>,
    navigation_timeout_secs: Option<u64>,
    settle_mode: Option<String>,
    settle_ms: Option<u64>,
    settle_poll_ms: Option<u64>,
    deploy_target: Option<String>,
    chrome_executable: Option<String>,
    chrome_remote_url: Option<String>,
    chrome_headless: Option<bool>,
    chrome_extra_args: Option<String>,
}

impl ScraperConfig {
    /// Build a configuration from process environment variables
    ///
    /// Unset or blank keys keep their defaults. Recognised keys:
    /// `UPSTREAM_BASE_URL`, `SCRAPER_USER_AGENT`, `NAVIGATION_TIMEOUT_SECS`,
    /// `SETTLE_MODE`, `SETTLE_MS`, `SETTLE_POLL_MS`, `DEPLOY_TARGET`,
    /// `CHROME_EXECUTABLE`, `CHROME_REMOTE_URL`, `CHROME_HEADLESS`,
    /// `CHROME_EXTRA_ARGS` (whitespace-separated flags).
    pub fn from_env() -> Result<Self> {
        Self::from_source(Environment::default())
    }

    /// Same as [`from_env`](Self::from_env), reading from `vars` instead of the process
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Map<String, String> = vars.into_iter().collect();
        Self::from_source(Environment::default().source(Some(vars)))
    }

    fn from_source(source: Environment) -> Result<Self> {
        let overrides: EnvOverrides = Config::builder()
            .add_source(source.ignore_empty(true))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| ScrapeError::Config(format!("environment: {}", e)))?;

        overrides.apply(Self::default())
    }

    /// Browser settings whose DevTools deadline never undercuts the navigation budget
    pub fn launcher_settings(&self) -> BrowserSettings {
        let mut settings = self.browser.clone();
        settings.request_timeout = settings.request_timeout.max(self.navigation_timeout);
        settings
    }
}

impl EnvOverrides {
    fn apply(self, mut config: ScraperConfig) -> Result<ScraperConfig> {
        if let Some(url) = non_blank(self.upstream_base_url) {
            url::Url::parse(&url)
                .map_err(|e| ScrapeError::InvalidUrl(format!("UPSTREAM_BASE_URL `{}`: {}", url, e)))?;
            config.upstream_url = url;
        }
        if let Some(agent) = non_blank(self.scraper_user_agent) {
            config.user_agent = agent;
        }
        if let Some(secs) = self.navigation_timeout_secs {
            config.navigation_timeout = Duration::from_secs(secs);
        }

        let settle_ms = self.settle_ms.unwrap_or(3_000);
        let poll_ms = self.settle_poll_ms.unwrap_or(250);
        config.settle = match non_blank(self.settle_mode).as_deref() {
            None | Some("fixed") => SettleStrategy::Fixed(Duration::from_millis(settle_ms)),
            Some("until-records") => {
                if poll_ms == 0 {
                    return Err(ScrapeError::Config(
                        "SETTLE_POLL_MS must be greater than zero".to_string(),
                    ));
                }
                SettleStrategy::UntilRecords {
                    timeout: Duration::from_millis(settle_ms),
                    poll_interval: Duration::from_millis(poll_ms),
                }
            }
            Some(other) => {
                return Err(ScrapeError::Config(format!(
                    "SETTLE_MODE must be `fixed` or `until-records`, got `{}`",
                    other
                )));
            }
        };

        if let Some(target) = non_blank(self.deploy_target) {
            config.browser.profile = target.parse()?;
        }
        config.browser.executable = non_blank(self.chrome_executable).map(PathBuf::from);
        config.browser.remote_url = non_blank(self.chrome_remote_url);
        if let Some(headless) = self.chrome_headless {
            config.browser.headless = headless;
        }
        if let Some(args) = self.chrome_extra_args {
            config.browser.extra_args = args.split_whitespace().map(str::to_string).collect();
        }

        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
