use async_trait::async_trait;
use ns_core::{ExtractionMethod, Result};

pub mod full_page;
pub mod jsonld;
pub mod main_text;

pub use full_page::FullPageStrategy;
pub use main_text::MainTextStrategy;

/// What a strategy managed to pull out of a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawArticle {
    pub text: String,
    pub title: Option<String>,
    pub author: Option<String>,
}

/// One way of turning a URL into article text.
///
/// `Ok(None)` means the page was reachable but yielded nothing usable; the
/// extractor treats it the same as an error and moves on.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn method(&self) -> ExtractionMethod;

    async fn extract(&self, url: &str) -> Result<Option<RawArticle>>;
}

/// Common utilities for strategies
pub(crate) mod utils {
    use lazy_static::lazy_static;
    use regex::Regex;
    use scraper::{ElementRef, Html, Selector};

    lazy_static! {
        static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    }

    pub fn parse_selector(selector: &str) -> Option<Selector> {
        match Selector::parse(selector) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::debug!("Invalid selector {}: {:?}", selector, e);
                None
            }
        }
    }

    pub fn collapse_whitespace(text: &str) -> String {
        WHITESPACE.replace_all(text.trim(), " ").into_owned()
    }

    pub fn element_text(element: &ElementRef) -> String {
        collapse_whitespace(&element.text().collect::<String>())
    }

    /// Text of the first element matching `selector`, if it has any.
    pub fn extract_text(document: &Html, selector: &str) -> Option<String> {
        let selector = parse_selector(selector)?;
        document
            .select(&selector)
            .map(|el| element_text(&el))
            .find(|text| !text.is_empty())
    }

    /// `content` attribute of the first matching `<meta>` element.
    pub fn meta_content(document: &Html, selector: &str) -> Option<String> {
        let selector = parse_selector(selector)?;
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(collapse_whitespace)
            .find(|content| !content.is_empty())
    }

    /// Title from Open Graph, then JSON-LD, then the first heading, then `<title>`.
    pub fn extract_title(document: &Html) -> Option<String> {
        meta_content(document, "meta[property='og:title']")
            .or_else(|| super::jsonld::extract_headline(document))
            .or_else(|| extract_text(document, "h1"))
            .or_else(|| extract_text(document, "title"))
    }

    /// Author names from JSON-LD, then `<meta>` tags, then `rel=author` links.
    pub fn extract_author(document: &Html) -> Option<String> {
        let authors = super::jsonld::extract_authors(document);
        if !authors.is_empty() {
            return Some(authors.join(", "));
        }
        meta_content(document, "meta[name='author']")
            .or_else(|| {
                meta_content(document, "meta[property='article:author']")
                    .filter(|a| !a.starts_with("http"))
            })
            .or_else(|| extract_text(document, "[rel='author']"))
    }
}

#[cfg(test)]
mod tests {
    use super::utils;
    use scraper::Html;

    #[test]
    fn test_extract_text() {
        let html = r#"
            <div class="title">  Test
               Title </div>
            <div class="content">Test Content</div>
        "#;
        let document = Html::parse_document(html);

        assert_eq!(utils::extract_text(&document, ".title").as_deref(), Some("Test Title"));
        assert!(utils::extract_text(&document, ".invalid").is_none());
        assert!(utils::extract_text(&document, "[[[").is_none());
    }

    #[test]
    fn test_title_preference() {
        let html = r#"<html><head><title>Page | Site</title>
            <meta property="og:title" content="Open Graph Title"></head>
            <body><h1>Heading</h1></body></html>"#;
        let document = Html::parse_document(html);
        assert_eq!(utils::extract_title(&document).as_deref(), Some("Open Graph Title"));

        let html = "<html><head><title>Page | Site</title></head><body><h1>Heading</h1></body></html>";
        let document = Html::parse_document(html);
        assert_eq!(utils::extract_title(&document).as_deref(), Some("Heading"));
    }

    #[test]
    fn test_author_from_meta() {
        let html = r#"<html><head>
            <meta property="article:author" content="https://example.com/staff/jane">
            <meta name="author" content="Jane Doe"></head><body></body></html>"#;
        let document = Html::parse_document(html);
        assert_eq!(utils::extract_author(&document).as_deref(), Some("Jane Doe"));
    }
}
