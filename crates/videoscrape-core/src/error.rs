//! Error types for the video scraper
//!
//! One enum covers every failure a scrape can hit, from launching the
//! browser to writing the one-shot dump. Display strings are what callers
//! see in the failure envelope.

use std::time::Duration;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for all scraping operations
///
/// Implements Display for human-readable messages and Serialize
/// so it can be embedded directly in JSON responses.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Browser process could not be started or connected to
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    /// Navigation failed (network error, non-2xx document status)
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Navigation did not reach DOM-ready within the allotted time
    #[error("Navigation timeout of {} ms exceeded: {url}", .timeout.as_millis())]
    NavigationTimeout { url: String, timeout: Duration },

    /// Script evaluation or DOM snapshot inside the page failed
    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    /// A configured URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration value could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// HTTP request to a DevTools endpoint failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Writing the record dump failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding records as JSON failed
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Serialize for ScrapeError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for scraping operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_launch() {
        let error = ScrapeError::Launch("chrome not found".to_string());
        assert_eq!(error.to_string(), "Failed to launch browser: chrome not found");
    }

    #[test]
    fn test_error_display_navigation() {
        let error = ScrapeError::Navigation("net::ERR_NAME_NOT_RESOLVED".to_string());
        assert_eq!(
            error.to_string(),
            "Navigation failed: net::ERR_NAME_NOT_RESOLVED"
        );
    }

    #[test]
    fn test_error_display_navigation_timeout() {
        let error = ScrapeError::NavigationTimeout {
            url: "https://example.com/list".to_string(),
            timeout: Duration::from_secs(60),
        };
        assert_eq!(
            error.to_string(),
            "Navigation timeout of 60000 ms exceeded: https://example.com/list"
        );
    }

    #[test]
    fn test_error_display_evaluation() {
        let error = ScrapeError::Evaluation("target closed".to_string());
        assert_eq!(error.to_string(), "Evaluation failed: target closed");
    }

    #[test]
    fn test_error_display_invalid_url() {
        let error = ScrapeError::InvalidUrl("UPSTREAM_BASE_URL `list`: relative URL without a base".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid URL: UPSTREAM_BASE_URL `list`: relative URL without a base"
        );
    }

    #[test]
    fn test_error_display_config() {
        let error = ScrapeError::Config("SETTLE_MS must be an integer".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid configuration: SETTLE_MS must be an integer"
        );
    }

    #[test]
    fn test_error_serialize() {
        let error = ScrapeError::Launch("boom".to_string());
        let json = serde_json::to_string(&error).expect("Serialization should succeed");
        assert_eq!(json, "\"Failed to launch browser: boom\"");
    }
}
