//! Core data types for the video scraper
//!
//! Contains the record produced by the extractor and the pagination
//! window requested by callers.

use serde::{Deserialize, Serialize};

/// Type tag used for records found by the container pass
pub const CONTAINER_TYPE: &str = "container";

/// A single video discovered on the page
///
/// Serialized with the field names API consumers expect:
/// `{"type", "videoUrl", "thumbnail", "title"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    /// Lowercased media tag name (`video`, `iframe`) or `container`
    #[serde(rename = "type")]
    pub kind: String,

    /// URL of the playable media, absolute when it could be resolved
    pub video_url: String,

    /// URL of the preview image
    pub thumbnail: String,

    /// Human-readable title
    pub title: String,
}

impl VideoRecord {
    /// Returns true when `videoUrl`, `thumbnail` and `title` are all non-empty
    pub fn is_complete(&self) -> bool {
        !self.video_url.is_empty() && !self.thumbnail.is_empty() && !self.title.is_empty()
    }
}

/// Pagination window forwarded to the upstream listing
///
/// Values are kept as the caller sent them and interpolated verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub start: String,
    pub limit: String,
}

impl PageWindow {
    pub const DEFAULT_START: &'static str = "0";
    pub const DEFAULT_LIMIT: &'static str = "20";

    /// Build a window, falling back to the defaults for absent values
    pub fn new(start: Option<String>, limit: Option<String>) -> Self {
        Self {
            start: start.unwrap_or_else(|| Self::DEFAULT_START.to_string()),
            limit: limit.unwrap_or_else(|| Self::DEFAULT_LIMIT.to_string()),
        }
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> VideoRecord {
        VideoRecord {
            kind: "video".to_string(),
            video_url: "a.mp4".to_string(),
            thumbnail: "a.jpg".to_string(),
            title: "T".to_string(),
        }
    }

    #[test]
    fn test_video_record_serializes_with_api_field_names() {
        let json = serde_json::to_value(record()).expect("Serialization should succeed");
        assert_eq!(
            json,
            serde_json::json!({
                "type": "video",
                "videoUrl": "a.mp4",
                "thumbnail": "a.jpg",
                "title": "T"
            })
        );
    }

    #[test]
    fn test_is_complete() {
        assert!(record().is_complete());

        let mut missing_title = record();
        missing_title.title.clear();
        assert!(!missing_title.is_complete());

        let mut missing_thumb = record();
        missing_thumb.thumbnail.clear();
        assert!(!missing_thumb.is_complete());

        let mut missing_url = record();
        missing_url.video_url.clear();
        assert!(!missing_url.is_complete());
    }

    #[test]
    fn test_page_window_defaults() {
        let window = PageWindow::default();
        assert_eq!(window.start, "0");
        assert_eq!(window.limit, "20");
    }

    #[test]
    fn test_page_window_keeps_given_values() {
        let window = PageWindow::new(Some("40".to_string()), None);
        assert_eq!(window.start, "40");
        assert_eq!(window.limit, "20");
    }
}
