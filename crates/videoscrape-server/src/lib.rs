//! Video Scraper HTTP service
//!
//! Exposes [`videoscrape_core::VideoScraper`] over a small JSON API:
//!
//! | Method | Path | Response |
//! |---|---|---|
//! | GET | `/` | service banner |
//! | GET | `/health` | liveness check with timestamp |
//! | GET | `/api/scrape-videos?start&limit` | scraped records or failure envelope |
//! | GET | `/api/scrape.js?start&limit` | same as above |
//!
//! Everything else answers `404 {"error": "Not found"}`.

pub mod config;
pub mod server;

// Re-export server entry points
pub use self::config::ServerConfig;
pub use server::{AppState, ServerError, build_api_router, build_app_router, serve};
