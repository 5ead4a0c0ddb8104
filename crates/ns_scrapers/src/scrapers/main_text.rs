use async_trait::async_trait;
use ns_core::{ExtractionMethod, Result};
use rs_trafilatura::{extract_with_options, Options};
use scraper::Html;

use super::utils;
use super::{ExtractionStrategy, RawArticle};
use crate::fetch::HttpFetcher;

/// Precision-first body extraction with trafilatura. Comments and tables
/// are left out.
#[derive(Debug, Clone)]
pub struct MainTextStrategy {
    fetcher: HttpFetcher,
}

impl MainTextStrategy {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ExtractionStrategy for MainTextStrategy {
    fn name(&self) -> &str {
        "main-text"
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Primary
    }

    async fn extract(&self, url: &str) -> Result<Option<RawArticle>> {
        let html = self.fetcher.fetch(url).await?;
        Ok(extract_main_text(&html))
    }
}

fn options() -> Options {
    Options {
        favor_precision: true,
        include_comments: false,
        include_tables: false,
        ..Options::default()
    }
}

pub fn extract_main_text(html: &str) -> Option<RawArticle> {
    if html.trim().is_empty() {
        return None;
    }

    let extracted = match extract_with_options(html, &options()) {
        Ok(extracted) => extracted,
        Err(e) => {
            tracing::debug!("trafilatura found no content: {}", e);
            return None;
        }
    };

    let text = extracted.content_text.trim().to_string();
    if text.is_empty() {
        return None;
    }

    // Fill metadata gaps from the page itself.
    let document = Html::parse_document(html);
    let title = extracted
        .metadata
        .title
        .filter(|t| !t.trim().is_empty())
        .or_else(|| utils::extract_title(&document));
    let author = extracted
        .metadata
        .author
        .filter(|a| !a.trim().is_empty())
        .or_else(|| utils::extract_author(&document));

    Some(RawArticle { text, title, author })
}
