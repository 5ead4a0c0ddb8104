use std::sync::Arc;

use ns_core::{ExtractionMethod, ExtractionResult, Result};

use crate::fetch::HttpFetcher;
use crate::logging::Logger;
use crate::paywall::{failure_guidance, is_likely_paywalled};
use crate::publication::PublicationResolver;
use crate::scrapers::full_page::MIN_TEXT_CHARS;
use crate::scrapers::{ExtractionStrategy, FullPageStrategy, MainTextStrategy, RawArticle};

pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL starting with http:// or https://";

/// Turns a URL into article text, trying the primary strategy and then
/// the secondary one, each at most once.
pub struct ContentExtractor {
    resolver: Arc<PublicationResolver>,
    primary: Box<dyn ExtractionStrategy>,
    secondary: Box<dyn ExtractionStrategy>,
    logger: Logger,
}

impl ContentExtractor {
    pub fn new(resolver: Arc<PublicationResolver>) -> Result<Self> {
        let fetcher = HttpFetcher::new()?;
        Ok(Self::with_strategies(
            resolver,
            Box::new(MainTextStrategy::new(fetcher.clone())),
            Box::new(FullPageStrategy::new(fetcher)),
        ))
    }

    pub fn with_strategies(
        resolver: Arc<PublicationResolver>,
        primary: Box<dyn ExtractionStrategy>,
        secondary: Box<dyn ExtractionStrategy>,
    ) -> Self {
        Self {
            resolver,
            primary,
            secondary,
            logger: Logger::new().with_prefix("[scrape]".to_string()),
        }
    }

    pub fn resolver(&self) -> &PublicationResolver {
        &self.resolver
    }

    /// Never fails: every problem becomes an unsuccessful result.
    pub async fn extract(&self, url: &str) -> ExtractionResult {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return ExtractionResult::failure(INVALID_URL_MESSAGE, String::new());
        }

        let paywalled = is_likely_paywalled(url);
        let publication = self.resolver.resolve(url);
        if paywalled {
            self.logger.debug(&format!("{} is on the paywall list", url));
        }

        for strategy in [&self.primary, &self.secondary] {
            if let Some(article) = self.attempt(strategy.as_ref(), url).await {
                return ExtractionResult {
                    success: true,
                    text: Some(article.text),
                    title: article.title,
                    author: article.author,
                    publication,
                    method: Some(strategy.method()),
                    paywall_warning: Some(paywalled),
                    error: None,
                };
            }
        }

        self.logger.warn(&format!("All extraction strategies failed for {}", url));
        ExtractionResult::failure(failure_guidance(paywalled), publication)
    }

    async fn attempt(&self, strategy: &dyn ExtractionStrategy, url: &str) -> Option<RawArticle> {
        let logger = self.logger.clone().with_prefix(format!("[{}]", strategy.name()));
        logger.info(&format!("Attempting extraction: {}", url));

        let article = match strategy.extract(url).await {
            Ok(Some(article)) => article,
            Ok(None) => {
                logger.warn("No article text found");
                return None;
            }
            Err(e) => {
                logger.error(&format!("Extraction error: {}", e));
                return None;
            }
        };

        let chars = article.text.trim().chars().count();
        let long_enough = match strategy.method() {
            ExtractionMethod::Primary => chars > 0,
            ExtractionMethod::Secondary => chars >= MIN_TEXT_CHARS,
        };
        if !long_enough {
            logger.warn(&format!("Extracted text too short ({} chars)", chars));
            return None;
        }

        logger.info(&format!("Extracted {} chars", chars));
        Some(article)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ns_core::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Outcome {
        Text(&'static str),
        Nothing,
        Fails,
    }

    struct StubStrategy {
        method: ExtractionMethod,
        outcome: Outcome,
        calls: Arc<AtomicUsize>,
    }

    impl StubStrategy {
        fn boxed(method: ExtractionMethod, outcome: Outcome, calls: &Arc<AtomicUsize>) -> Box<dyn ExtractionStrategy> {
            Box::new(Self {
                method,
                outcome,
                calls: calls.clone(),
            })
        }
    }

    #[async_trait]
    impl ExtractionStrategy for StubStrategy {
        fn name(&self) -> &str {
            "stub"
        }

        fn method(&self) -> ExtractionMethod {
            self.method
        }

        async fn extract(&self, _url: &str) -> Result<Option<RawArticle>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Outcome::Text(text) => Ok(Some(RawArticle {
                    text: text.to_string(),
                    title: Some("Title".to_string()),
                    author: Some("Reporter".to_string()),
                })),
                Outcome::Nothing => Ok(None),
                Outcome::Fails => Err(Error::Scraping("connection reset".to_string())),
            }
        }
    }

    fn extractor(primary: Outcome, secondary: Outcome) -> (ContentExtractor, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let primary_calls = Arc::new(AtomicUsize::new(0));
        let secondary_calls = Arc::new(AtomicUsize::new(0));
        let resolver = Arc::new(PublicationResolver::with_domains([("theguardian.com", "The Guardian")]));
        let extractor = ContentExtractor::with_strategies(
            resolver,
            StubStrategy::boxed(ExtractionMethod::Primary, primary, &primary_calls),
            StubStrategy::boxed(ExtractionMethod::Secondary, secondary, &secondary_calls),
        );
        (extractor, primary_calls, secondary_calls)
    }

    const LONG_TEXT: &str = "This body text is comfortably longer than one hundred characters, \
        so the secondary strategy accepts it as a real article body.";

    #[tokio::test]
    async fn test_rejects_non_http_urls_without_fetching() {
        let (extractor, primary, secondary) = extractor(Outcome::Text("x"), Outcome::Text(LONG_TEXT));
        for url in ["ftp://example.com/a", "example.com/a", "", "javascript:alert(1)"] {
            let result = extractor.extract(url).await;
            assert!(!result.success);
            assert_eq!(result.error.as_deref(), Some(INVALID_URL_MESSAGE));
        }
        assert_eq!(primary.load(Ordering::SeqCst), 0);
        assert_eq!(secondary.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_primary_success() {
        let (extractor, _, secondary) = extractor(Outcome::Text("Short but present"), Outcome::Text(LONG_TEXT));
        let result = extractor.extract("https://www.theguardian.com/world/x").await;
        assert!(result.success);
        assert_eq!(result.method, Some(ExtractionMethod::Primary));
        assert_eq!(result.text.as_deref(), Some("Short but present"));
        assert_eq!(result.publication, "The Guardian");
        assert_eq!(result.paywall_warning, Some(false));
        assert_eq!(secondary.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_when_primary_is_empty() {
        let (extractor, primary, secondary) = extractor(Outcome::Text("   "), Outcome::Text(LONG_TEXT));
        let result = extractor.extract("https://www.wsj.com/articles/x").await;
        assert!(result.success);
        assert_eq!(result.method, Some(ExtractionMethod::Secondary));
        assert_eq!(result.publication, "The Wall Street Journal");
        assert!(result.is_paywalled());
        assert_eq!(primary.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_falls_back_when_primary_errors() {
        let (extractor, _, _) = extractor(Outcome::Fails, Outcome::Text(LONG_TEXT));
        let result = extractor.extract("https://foo-bar.com/story").await;
        assert_eq!(result.method, Some(ExtractionMethod::Secondary));
        assert_eq!(result.publication, "Foo Bar");
    }

    #[tokio::test]
    async fn test_short_secondary_text_fails() {
        let (extractor, primary, secondary) = extractor(Outcome::Nothing, Outcome::Text("tiny"));
        let result = extractor.extract("https://foo-bar.com/story").await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("unusual structure"));
        assert_eq!(result.publication, "Foo Bar");
        assert_eq!(primary.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_paywall_guidance_on_failure() {
        let (extractor, _, _) = extractor(Outcome::Fails, Outcome::Fails);
        let result = extractor.extract("https://www.ft.com/content/abc").await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("often has paywalled content"));
        assert_eq!(result.publication, "Financial Times");
    }
}
