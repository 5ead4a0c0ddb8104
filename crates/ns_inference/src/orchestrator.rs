use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ns_core::{
    ArticleType, CompletionError, CompletionErrorKind, CompletionService, ExtractionResult, FormContext,
    LanguageInfo, Result, SummaryRequest, TypeDetection,
};
use ns_scrapers::{ContentExtractor, PublicationResolver};
use serde::Serialize;
use tracing::info;

use crate::classifier::TypeClassifier;
use crate::language::LanguageDetector;
use crate::models::create_model;
use crate::normalizer::{normalize, strip_attribution};
use crate::prompt::{compose, AuthorRoleExtractor};
use crate::Config;

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeOutcome {
    pub result: ExtractionResult,
    pub status: String,
    /// Only present when extraction succeeded.
    pub language: Option<LanguageInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryOutcome {
    pub summary: String,
    /// The summary without its leading publication attribution.
    pub clean_summary: String,
    pub article_type: ArticleType,
    pub language: LanguageInfo,
    pub author_role: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Runs scrape, detection and summary requests end to end, one at a time.
pub struct SummaryOrchestrator {
    service: Arc<dyn CompletionService>,
    extractor: ContentExtractor,
    language: LanguageDetector,
    classifier: TypeClassifier,
    roles: AuthorRoleExtractor,
}

impl fmt::Debug for SummaryOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryOrchestrator")
            .field("service", &self.service.name())
            .field("fast_language_detection", &self.language.has_fast_path())
            .finish()
    }
}

impl SummaryOrchestrator {
    pub fn new(service: Arc<dyn CompletionService>, extractor: ContentExtractor) -> Self {
        Self {
            language: LanguageDetector::new(service.clone()),
            classifier: TypeClassifier::new(service.clone()),
            roles: AuthorRoleExtractor::new(service.clone()),
            service,
            extractor,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        let service = create_model(config).await?;
        let resolver = Arc::new(PublicationResolver::load(&config.publications_file));
        let extractor = ContentExtractor::new(resolver)?;
        Ok(Self::new(service, extractor))
    }

    pub fn with_language_detector(mut self, detector: LanguageDetector) -> Self {
        self.language = detector;
        self
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    pub fn resolver(&self) -> &PublicationResolver {
        self.extractor.resolver()
    }

    pub fn extractor(&self) -> &ContentExtractor {
        &self.extractor
    }

    pub async fn scrape(&self, url: &str) -> ScrapeOutcome {
        let result = self.extractor.extract(url).await;
        let language = match result.text.as_deref() {
            Some(text) if result.success => Some(self.language.detect(text).await),
            _ => None,
        };
        ScrapeOutcome {
            status: result.status_message(),
            result,
            language,
        }
    }

    pub async fn detect_language(&self, text: &str) -> LanguageInfo {
        self.language.detect(text).await
    }

    pub async fn detect_type(&self, text: &str) -> Result<TypeDetection> {
        self.classifier.classify(text).await
    }

    /// Validates, composes, completes and cleans one summary. A missing
    /// `language` is detected first.
    pub async fn summarise(&self, request: &SummaryRequest, language: Option<LanguageInfo>) -> Result<SummaryOutcome> {
        request.validate()?;

        let language = match language {
            Some(language) => language,
            None => self.language.detect(&request.article_text).await,
        };

        let author_role = match (request.article_type, request.author_name()) {
            (ArticleType::OpEd, Some(author)) => self.roles.extract(&request.article_text, author).await,
            _ => None,
        };

        let prompt = compose(request, Some(&language), author_role.as_deref());
        info!(
            "Summarising {} article from {} in {} sentences ({})",
            request.article_type, request.publication, request.sentence_count, language.language
        );

        let raw = self.service.complete(&prompt.into_completion()).await?;
        let summary = normalize(&raw);
        if summary.is_empty() {
            return Err(CompletionError::new(
                CompletionErrorKind::Other,
                "the completion service returned an empty summary",
            )
            .into());
        }

        Ok(SummaryOutcome {
            clean_summary: strip_attribution(&summary, &request.publication),
            summary,
            article_type: request.article_type,
            language,
            author_role,
            generated_at: Utc::now(),
        })
    }

    /// Summarises the form held in `ctx`, recording the summary or the
    /// user-facing error message on the context.
    pub async fn summarise_form(&self, ctx: &mut FormContext) -> Result<SummaryOutcome> {
        let outcome = match ctx.to_request() {
            Ok(request) => self.summarise(&request, ctx.detected_language.clone()).await,
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(outcome) => {
                ctx.summary = Some(outcome.summary.clone());
                ctx.detected_language = Some(outcome.language.clone());
                ctx.error_message = None;
            }
            Err(e) => ctx.error_message = Some(e.user_message()),
        }
        outcome
    }
}
