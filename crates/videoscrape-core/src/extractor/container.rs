//! Pass 2: generic containers
//!
//! Every `div`, `article` and `section` is treated as a possible video card.
//! Data attributes win; otherwise the first link, image and heading inside
//! the container fill the gaps. Containers already visited as ancestors of
//! media elements are scanned again and may yield duplicates.

use crate::dom::{DomDocument, DomElement, Query};
use crate::types::{CONTAINER_TYPE, VideoRecord};

use super::{Accessor, assemble, attr, first_non_empty};

/// `videoUrl`: `data-video-url`, `data-video`, first link's resolved `href`
pub fn video_url_chain<E: DomElement>() -> [Accessor<E>; 3] {
    [
        |e| attr(e, "data-video-url"),
        |e| attr(e, "data-video"),
        |e| {
            e.query_selector(Query::Anchor)
                .and_then(|a| a.resolved_url("href"))
        },
    ]
}

/// `thumbnail`: `data-thumbnail`, `data-poster`, first image's resolved `src`
pub fn thumbnail_chain<E: DomElement>() -> [Accessor<E>; 3] {
    [
        |e| attr(e, "data-thumbnail"),
        |e| attr(e, "data-poster"),
        |e| {
            e.query_selector(Query::Image)
                .and_then(|img| img.resolved_url("src"))
        },
    ]
}

/// `title`, first non-empty wins
pub fn title_chain<E: DomElement>() -> [Accessor<E>; 7] {
    [
        |e| attr(e, "data-title"),
        |e| attr(e, "title"),
        |e| attr(e, "aria-label"),
        |e| e.query_selector(Query::Heading).map(|h| h.inner_text()),
        |e| e.query_selector(Query::TitleLike).map(|el| el.inner_text()),
        |e| e.query_selector(Query::Image).and_then(|img| attr(&img, "alt")),
        |e| e.query_selector(Query::Anchor).and_then(|a| attr(&a, "title")),
    ]
}

/// Builds a record for one container, `None` if any field stays empty
pub fn container_record<E: DomElement>(element: &E) -> Option<VideoRecord> {
    assemble(
        CONTAINER_TYPE.to_string(),
        first_non_empty(element, &video_url_chain()),
        first_non_empty(element, &thumbnail_chain()),
        first_non_empty(element, &title_chain()),
    )
}

/// Runs the container pass over a document, in document order
pub fn extract_containers<D: DomDocument>(document: &D) -> Vec<VideoRecord> {
    document
        .query_selector_all(Query::Container)
        .iter()
        .filter_map(container_record)
        .collect()
}
