//! Pass 1: explicit media elements
//!
//! Scans every `<video>` and `<iframe>` and reads source, poster and title
//! straight from the element, borrowing a title from the surrounding markup
//! when the element itself carries none.

use crate::dom::{DomDocument, DomElement, Query};
use crate::types::VideoRecord;

use super::{Accessor, assemble, attr, first_non_empty};

/// `videoUrl`: resolved `src`, then the raw attribute
pub fn video_url_chain<E: DomElement>() -> [Accessor<E>; 2] {
    [|e| e.resolved_url("src"), |e| attr(e, "src")]
}

/// `thumbnail`: resolved `poster` (only `<video>` reflects it), then the raw attribute
pub fn thumbnail_chain<E: DomElement>() -> [Accessor<E>; 2] {
    [
        |e| {
            if e.tag_name() == "video" {
                e.resolved_url("poster")
            } else {
                None
            }
        },
        |e| attr(e, "poster"),
    ]
}

/// `title`, first non-empty wins
pub fn title_chain<E: DomElement>() -> [Accessor<E>; 6] {
    [
        |e| attr(e, "title"),
        |e| attr(e, "alt"),
        |e| attr(e, "data-title"),
        |e| e.closest(Query::Div).and_then(|div| attr(&div, "data-title")),
        |e| {
            e.closest(Query::Article)
                .and_then(|article| article.query_selector(Query::Heading))
                .map(|heading| heading.inner_text())
        },
        |e| {
            e.closest(Query::Div)
                .and_then(|div| div.query_selector(Query::Heading))
                .map(|heading| heading.inner_text())
        },
    ]
}

/// Builds a record for one media element, `None` if any field stays empty
pub fn media_record<E: DomElement>(element: &E) -> Option<VideoRecord> {
    assemble(
        element.tag_name(),
        first_non_empty(element, &video_url_chain()),
        first_non_empty(element, &thumbnail_chain()),
        first_non_empty(element, &title_chain()),
    )
}

/// Runs the media pass over a document, in document order
pub fn extract_media_elements<D: DomDocument>(document: &D) -> Vec<VideoRecord> {
    document
        .query_selector_all(Query::Media)
        .iter()
        .filter_map(media_record)
        .collect()
}
