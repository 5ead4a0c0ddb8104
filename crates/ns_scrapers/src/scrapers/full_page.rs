use async_trait::async_trait;
use lazy_static::lazy_static;
use ns_core::{ExtractionMethod, Result};
use regex::Regex;
use scraper::Html;

use super::utils;
use super::{ExtractionStrategy, RawArticle};
use crate::fetch::HttpFetcher;

/// Shorter renderings are treated as "nothing extracted".
pub const MIN_TEXT_CHARS: usize = 100;

// Wide enough that html2text never wraps a paragraph.
const RENDER_WIDTH: usize = 10_000;

lazy_static! {
    static ref LINK_FOOTNOTE: Regex = Regex::new(r"^\[\d+\]:\s").unwrap();
    static ref LINK_MARKER: Regex = Regex::new(r"\[([^\]]*)\]\[\d+\]").unwrap();
}

/// Recall-oriented fallback: renders the whole page to plain text.
#[derive(Debug, Clone)]
pub struct FullPageStrategy {
    fetcher: HttpFetcher,
}

impl FullPageStrategy {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ExtractionStrategy for FullPageStrategy {
    fn name(&self) -> &str {
        "full-page"
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Secondary
    }

    async fn extract(&self, url: &str) -> Result<Option<RawArticle>> {
        let html = self.fetcher.fetch(url).await?;
        Ok(parse_full_page(&html))
    }
}

pub fn parse_full_page(html: &str) -> Option<RawArticle> {
    let rendered = html2text::from_read(html.as_bytes(), RENDER_WIDTH);

    let text = rendered
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !LINK_FOOTNOTE.is_match(line))
        .map(|line| LINK_MARKER.replace_all(line, "$1").into_owned())
        .collect::<Vec<_>>()
        .join("\n\n");

    if text.trim().chars().count() < MIN_TEXT_CHARS {
        return None;
    }

    let document = Html::parse_document(html);
    Some(RawArticle {
        text,
        title: utils::extract_text(&document, "title")
            .or_else(|| utils::meta_content(&document, "meta[property='og:title']")),
        author: utils::extract_author(&document),
    })
}
