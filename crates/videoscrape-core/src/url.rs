//! URL helper functions
//!
//! Builds the upstream listing URL and resolves relative attribute values
//! the way a browser's reflected URL properties (`src`, `href`, `poster`) do.

use url::Url;

use crate::types::PageWindow;

/// Upstream listing endpoint queried when no override is configured
pub const DEFAULT_UPSTREAM_URL: &str = "https://batibot.org/load_more_random.php";

/// Builds the listing URL for a pagination window
///
/// `start` and `limit` are interpolated verbatim, without encoding.
///
/// # Example
/// ```
/// use videoscrape_core::PageWindow;
/// use videoscrape_core::url::build_page_url;
/// let window = PageWindow::new(Some("40".into()), Some("10".into()));
/// let url = build_page_url("https://host.example/load_more_random.php", &window);
/// assert_eq!(url, "https://host.example/load_more_random.php?start=40&limit=10");
/// ```
pub fn build_page_url(base: &str, window: &PageWindow) -> String {
    format!("{}?start={}&limit={}", base, window.start, window.limit)
}

/// Resolves an attribute value against a base URL
///
/// Mirrors reflected URL properties: a value that parses relative to the
/// base comes back absolute, anything else is returned as written.
///
/// # Example
/// ```
/// use url::Url;
/// use videoscrape_core::url::resolve_against;
/// let base = Url::parse("https://host.example/list/page.php").unwrap();
/// assert_eq!(resolve_against(Some(&base), "clip.mp4"), "https://host.example/list/clip.mp4");
/// assert_eq!(resolve_against(None, "clip.mp4"), "clip.mp4");
/// ```
pub fn resolve_against(base: Option<&Url>, raw: &str) -> String {
    match base {
        Some(base) => base
            .join(raw)
            .map(String::from)
            .unwrap_or_else(|_| raw.to_string()),
        None => raw.to_string(),
    }
}

/// Determines the base URL for a document
///
/// A `<base href>` value is joined onto the document URL; without a
/// document URL an absolute `<base href>` is used on its own.
pub fn document_base(document_url: Option<&str>, base_href: Option<&str>) -> Option<Url> {
    let document = document_url.and_then(|u| Url::parse(u).ok());
    match (document, base_href) {
        (Some(doc), Some(href)) => doc.join(href).ok().or(Some(doc)),
        (Some(doc), None) => Some(doc),
        (None, Some(href)) => Url::parse(href).ok(),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_page_url_defaults() {
        let url = build_page_url(DEFAULT_UPSTREAM_URL, &PageWindow::default());
        assert_eq!(
            url,
            "https://batibot.org/load_more_random.php?start=0&limit=20"
        );
    }

    #[test]
    fn test_build_page_url_verbatim_values() {
        let window = PageWindow::new(Some("5".to_string()), Some("abc".to_string()));
        let url = build_page_url(DEFAULT_UPSTREAM_URL, &window);
        assert_eq!(
            url,
            "https://batibot.org/load_more_random.php?start=5&limit=abc"
        );
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = Url::parse("https://host.example/a/b.php?start=0").unwrap();
        assert_eq!(
            resolve_against(Some(&base), "/media/x.mp4"),
            "https://host.example/media/x.mp4"
        );
    }

    #[test]
    fn test_resolve_absolute_value_untouched() {
        let base = Url::parse("https://host.example/").unwrap();
        assert_eq!(
            resolve_against(Some(&base), "https://cdn.example/v.mp4"),
            "https://cdn.example/v.mp4"
        );
    }

    #[test]
    fn test_resolve_without_base_returns_raw() {
        assert_eq!(resolve_against(None, "thumb.jpg"), "thumb.jpg");
    }

    #[test]
    fn test_document_base_prefers_base_href() {
        let base = document_base(Some("https://host.example/list.php"), Some("/static/"));
        assert_eq!(base.unwrap().as_str(), "https://host.example/static/");
    }

    #[test]
    fn test_document_base_without_any_url() {
        assert!(document_base(None, None).is_none());
        assert!(document_base(None, Some("relative/")).is_none());
    }

    #[test]
    fn test_document_base_keeps_opaque_document_url() {
        let base = document_base(Some("about:blank"), None);
        assert_eq!(base.unwrap().as_str(), "about:blank");
    }
}
