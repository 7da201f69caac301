//! Video Scraper Core Library
//!
//! Loads a dynamically rendered listing page in a headless browser and
//! extracts `{type, videoUrl, thumbnail, title}` records from the result.
//!
//! # Overview
//!
//! This crate provides:
//! - A browser boundary ([`BrowserLauncher`] / [`BrowserSession`]) with a
//!   Chromium implementation over the DevTools protocol
//! - A two-pass extraction heuristic over an abstract DOM, backed by
//!   [`scraper`](https://docs.rs/scraper) for rendered snapshots
//! - A high-level [`VideoScraper`] that launches, navigates, settles,
//!   extracts and always releases the browser
//!
//! # Example
//!
//! ```no_run
//! use videoscrape_core::{PageWindow, Result, ScraperConfig, VideoScraper, save_records};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let scraper = VideoScraper::with_config(ScraperConfig::from_env()?);
//!
//!     let videos = scraper.scrape(&PageWindow::default()).await?;
//!     for video in &videos {
//!         println!("[{}] {}: {}", video.kind, video.title, video.video_url);
//!     }
//!
//!     save_records("videos.json", &videos).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Offline extraction
//!
//! The extractor does not need a browser. Any serialized document can be
//! fed to [`extract_from_html`], which is also how the heuristic is tested.

pub mod browser;
pub mod config;
pub mod dom;
mod error;
pub mod extractor;
mod output;
mod scrape;
mod types;
pub mod url;

// Re-export browser boundary
pub use browser::{BrowserLauncher, BrowserSession, ChromeLauncher, NavigateOptions, PageSnapshot};

// Re-export configuration
pub use self::config::{BrowserSettings, LaunchProfile, ScraperConfig, SettleStrategy};

// Re-export error types
pub use error::{Result, ScrapeError};

// Re-export extraction entry points
pub use extractor::{extract_from_html, extract_videos};

// Re-export main scraper API
pub use scrape::VideoScraper;

// Re-export dump helpers
pub use output::{DEFAULT_OUTPUT_FILE, save_records};

// Re-export data types
pub use types::{PageWindow, VideoRecord};

// Re-export URL helpers for convenience
pub use url::{DEFAULT_UPSTREAM_URL, build_page_url};
