//! DOM capability used by the extractor
//!
//! The extractor never touches a concrete DOM. It talks to [`DomElement`],
//! a small element interface modelled on the browser API it replaces
//! (`getAttribute`, `closest`, `querySelector`, `innerText`), and to
//! [`DomDocument`] for the top-level `querySelectorAll`.
//!
//! [`HtmlDocument`] implements both over a `scraper` tree parsed from a
//! serialized post-render snapshot.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::url::{document_base, resolve_against};

/// Every selector the extractor issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// `video, iframe`
    Media,
    /// `div, article, section`
    Container,
    /// `div`
    Div,
    /// `article`
    Article,
    /// `h1` through `h6`
    Heading,
    /// `a`
    Anchor,
    /// `img`
    Image,
    /// Elements whose class mentions title, name or heading
    TitleLike,
}

impl Query {
    /// CSS selector text
    pub const fn css(self) -> &'static str {
        match self {
            Query::Media => "video, iframe",
            Query::Container => "div, article, section",
            Query::Div => "div",
            Query::Article => "article",
            Query::Heading => "h1, h2, h3, h4, h5, h6",
            Query::Anchor => "a",
            Query::Image => "img",
            Query::TitleLike => r#"[class*="title"], [class*="name"], [class*="heading"]"#,
        }
    }
}

/// Element capability consumed by the fallback chains
pub trait DomElement: Sized {
    /// Lowercased tag name
    fn tag_name(&self) -> String;

    /// Raw attribute value, `None` when absent
    fn attribute(&self, name: &str) -> Option<&str>;

    /// URL-typed attribute resolved against the document base
    ///
    /// `None` when the attribute is absent or empty.
    fn resolved_url(&self, name: &str) -> Option<String>;

    /// First strict descendant matching `query`
    fn query_selector(&self, query: Query) -> Option<Self>;

    /// Nearest inclusive ancestor matching `query`
    fn closest(&self, query: Query) -> Option<Self>;

    /// Text content, trimmed with inner whitespace collapsed
    fn inner_text(&self) -> String;
}

/// Document capability: selection over the whole tree
pub trait DomDocument {
    type Element<'a>: DomElement
    where
        Self: 'a;

    /// All matches for `query` in document order
    fn query_selector_all(&self, query: Query) -> Vec<Self::Element<'_>>;
}

/// Parsed selectors for every [`Query`]
struct Selectors {
    media: Selector,
    container: Selector,
    div: Selector,
    article: Selector,
    heading: Selector,
    anchor: Selector,
    image: Selector,
    title_like: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            media: parse_selector(Query::Media.css())?,
            container: parse_selector(Query::Container.css())?,
            div: parse_selector(Query::Div.css())?,
            article: parse_selector(Query::Article.css())?,
            heading: parse_selector(Query::Heading.css())?,
            anchor: parse_selector(Query::Anchor.css())?,
            image: parse_selector(Query::Image.css())?,
            title_like: parse_selector(Query::TitleLike.css())?,
        })
    }

    fn get(&self, query: Query) -> &Selector {
        match query {
            Query::Media => &self.media,
            Query::Container => &self.container,
            Query::Div => &self.div,
            Query::Article => &self.article,
            Query::Heading => &self.heading,
            Query::Anchor => &self.anchor,
            Query::Image => &self.image,
            Query::TitleLike => &self.title_like,
        }
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ScrapeError::Evaluation(format!("Invalid selector {}: {:?}", css, e)))
}

/// A snapshot document backed by `scraper`
pub struct HtmlDocument {
    html: Html,
    selectors: Selectors,
    base: Option<Url>,
}

impl HtmlDocument {
    /// Parse serialized HTML
    ///
    /// # Arguments
    /// * `html` - Full document markup
    /// * `document_url` - URL the document was loaded from; relative
    ///   `src`/`href`/`poster` values resolve against it (or its `<base href>`)
    pub fn parse(html: &str, document_url: Option<&str>) -> Result<Self> {
        let html = Html::parse_document(html);
        let selectors = Selectors::new()?;

        let base_selector = parse_selector("base[href]")?;
        let base_href = html
            .select(&base_selector)
            .next()
            .and_then(|el| el.value().attr("href"));
        let base = document_base(document_url, base_href);

        Ok(Self {
            html,
            selectors,
            base,
        })
    }

    /// Base URL used for resolution, if any
    pub fn base_url(&self) -> Option<&Url> {
        self.base.as_ref()
    }
}

impl DomDocument for HtmlDocument {
    type Element<'a> = HtmlElement<'a>;

    fn query_selector_all(&self, query: Query) -> Vec<HtmlElement<'_>> {
        self.html
            .select(self.selectors.get(query))
            .map(|inner| HtmlElement { inner, doc: self })
            .collect()
    }
}

/// Element of an [`HtmlDocument`]
#[derive(Clone, Copy)]
pub struct HtmlElement<'a> {
    inner: ElementRef<'a>,
    doc: &'a HtmlDocument,
}

impl<'a> HtmlElement<'a> {
    fn wrap(&self, inner: ElementRef<'a>) -> Self {
        Self {
            inner,
            doc: self.doc,
        }
    }
}

impl<'a> DomElement for HtmlElement<'a> {
    fn tag_name(&self) -> String {
        self.inner.value().name().to_ascii_lowercase()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.inner.value().attr(name)
    }

    fn resolved_url(&self, name: &str) -> Option<String> {
        self.attribute(name)
            .filter(|raw| !raw.is_empty())
            .map(|raw| resolve_against(self.doc.base.as_ref(), raw))
    }

    fn query_selector(&self, query: Query) -> Option<Self> {
        let scope = self.inner.id();
        self.inner
            .select(self.doc.selectors.get(query))
            .find(|el| el.id() != scope)
            .map(|el| self.wrap(el))
    }

    fn closest(&self, query: Query) -> Option<Self> {
        let selector = self.doc.selectors.get(query);
        if selector.matches(&self.inner) {
            return Some(*self);
        }
        self.inner
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| selector.matches(el))
            .map(|el| self.wrap(el))
    }

    fn inner_text(&self) -> String {
        let text: String = self.inner.text().collect();
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> HtmlDocument {
        HtmlDocument::parse(html, None).expect("document should parse")
    }

    #[test]
    fn test_query_selector_all_document_order() {
        let d = doc(r#"<section id="s"><div id="a"><article id="b"></article></div></section>"#);
        let ids: Vec<_> = d
            .query_selector_all(Query::Container)
            .iter()
            .map(|el| el.attribute("id").unwrap_or_default().to_string())
            .collect();
        assert_eq!(ids, vec!["s", "a", "b"]);
    }

    #[test]
    fn test_query_selector_excludes_self() {
        let d = doc(r#"<div id="outer"><p><div id="inner"></div></p></div>"#);
        let outer = d
            .query_selector_all(Query::Div)
            .into_iter()
            .next()
            .unwrap();
        let found = outer.query_selector(Query::Div).unwrap();
        assert_eq!(found.attribute("id"), Some("inner"));
    }

    #[test]
    fn test_query_selector_none_without_descendant() {
        let d = doc(r#"<div id="only"></div>"#);
        let div = d.query_selector_all(Query::Div).into_iter().next().unwrap();
        assert!(div.query_selector(Query::Div).is_none());
    }

    #[test]
    fn test_closest_includes_self_and_walks_up() {
        let d = doc(r#"<article id="art"><div id="wrap"><video id="v"></video></div></article>"#);
        let video = d.query_selector_all(Query::Media).into_iter().next().unwrap();
        assert_eq!(video.closest(Query::Div).unwrap().attribute("id"), Some("wrap"));
        assert_eq!(video.closest(Query::Article).unwrap().attribute("id"), Some("art"));

        let wrap = video.closest(Query::Div).unwrap();
        assert_eq!(wrap.closest(Query::Div).unwrap().attribute("id"), Some("wrap"));
    }

    #[test]
    fn test_inner_text_collapses_whitespace() {
        let d = doc("<div><h2>\n   Hello\n  <b>World</b>  </h2></div>");
        let div = d.query_selector_all(Query::Div).into_iter().next().unwrap();
        let heading = div.query_selector(Query::Heading).unwrap();
        assert_eq!(heading.inner_text(), "Hello World");
    }

    #[test]
    fn test_title_like_matches_class_substring() {
        let d = doc(r#"<div><span class="card-subtitle">Sub</span></div>"#);
        let div = d.query_selector_all(Query::Div).into_iter().next().unwrap();
        assert_eq!(div.query_selector(Query::TitleLike).unwrap().inner_text(), "Sub");
    }

    #[test]
    fn test_resolved_url_uses_document_url() {
        let d = HtmlDocument::parse(
            r#"<video src="/v/1.mp4" poster=""></video>"#,
            Some("https://host.example/list.php?start=0"),
        )
        .unwrap();
        let video = d.query_selector_all(Query::Media).into_iter().next().unwrap();
        assert_eq!(
            video.resolved_url("src").as_deref(),
            Some("https://host.example/v/1.mp4")
        );
        assert_eq!(video.resolved_url("poster"), None);
        assert_eq!(video.resolved_url("missing"), None);
    }

    #[test]
    fn test_resolved_url_honours_base_element() {
        let d = HtmlDocument::parse(
            r#"<html><head><base href="https://cdn.example/assets/"></head>
               <body><img src="t.jpg"></body></html>"#,
            Some("https://host.example/list.php"),
        )
        .unwrap();
        let img = d.query_selector_all(Query::Image).into_iter().next().unwrap();
        assert_eq!(
            img.resolved_url("src").as_deref(),
            Some("https://cdn.example/assets/t.jpg")
        );
        assert_eq!(d.base_url().unwrap().as_str(), "https://cdn.example/assets/");
    }

    #[test]
    fn test_tag_name_lowercase() {
        let d = doc("<IFRAME SRC='x'></IFRAME>");
        let frame = d.query_selector_all(Query::Media).into_iter().next().unwrap();
        assert_eq!(frame.tag_name(), "iframe");
        assert_eq!(frame.attribute("src"), Some("x"));
    }
}
