//! Video record extraction
//!
//! Two independent passes over a rendered document:
//! - [`media`]: `<video>` / `<iframe>` elements
//! - [`container`]: `div` / `article` / `section` cards carrying data attributes
//!
//! Each record field is resolved through an ordered fallback chain of
//! accessors; the first non-empty value wins. Records missing any field are
//! dropped. Pass 1 results precede pass 2 results and nothing is merged.

pub mod container;
pub mod media;

use tracing::debug;

use crate::dom::{DomDocument, DomElement, HtmlDocument};
use crate::error::Result;
use crate::types::VideoRecord;

pub use container::extract_containers;
pub use media::extract_media_elements;

/// One step of a fallback chain
pub type Accessor<E> = fn(&E) -> Option<String>;

/// Evaluates a chain in order and returns the first non-empty value
pub fn first_non_empty<E>(element: &E, chain: &[Accessor<E>]) -> Option<String> {
    chain
        .iter()
        .find_map(|accessor| accessor(element).filter(|value| !value.is_empty()))
}

/// Raw attribute value as an owned string
pub(crate) fn attr<E: DomElement>(element: &E, name: &str) -> Option<String> {
    element.attribute(name).map(str::to_string)
}

/// Builds a record only when every field resolved
pub(crate) fn assemble(
    kind: String,
    video_url: Option<String>,
    thumbnail: Option<String>,
    title: Option<String>,
) -> Option<VideoRecord> {
    let record = VideoRecord {
        kind,
        video_url: video_url?,
        thumbnail: thumbnail?,
        title: title?,
    };
    record.is_complete().then_some(record)
}

/// Runs both passes and the final completeness filter
pub fn extract_videos<D: DomDocument>(document: &D) -> Vec<VideoRecord> {
    let mut records = extract_media_elements(document);
    let media_count = records.len();
    records.extend(extract_containers(document));

    records.retain(VideoRecord::is_complete);
    debug!(
        media = media_count,
        containers = records.len().saturating_sub(media_count),
        "extraction finished"
    );
    records
}

/// Parses a serialized document and extracts its video records
///
/// # Arguments
/// * `html` - Post-render document markup
/// * `document_url` - URL the document was loaded from, for resolving relative URLs
///
/// # Example
/// ```
/// use videoscrape_core::extract_from_html;
/// let records = extract_from_html(
///     r#"<video src="a.mp4" poster="a.jpg" title="T"></video>"#,
///     None,
/// ).unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].kind, "video");
/// ```
pub fn extract_from_html(html: &str, document_url: Option<&str>) -> Result<Vec<VideoRecord>> {
    let document = HtmlDocument::parse(html, document_url)?;
    Ok(extract_videos(&document))
}
