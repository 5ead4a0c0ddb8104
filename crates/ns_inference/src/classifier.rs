use std::sync::Arc;

use lazy_static::lazy_static;
use ns_core::{ArticleType, CompletionRequest, CompletionService, Error, Result, TypeDetection};
use regex::Regex;
use tracing::{debug, info};

const SAMPLE_CHARS: usize = 3000;
const MAX_TOKENS: u32 = 100;
const NO_EXPLANATION: &str = "No explanation given";

lazy_static! {
    static ref LABEL: Regex = Regex::new(r"(?i)\b(op-ed|news|feature|interview)\b").unwrap();
    static ref PARENTHESIS: Regex = Regex::new(r"\(([^)]*)\)").unwrap();
}

const RUBRIC: &str = "Classify this article as exactly one of: news, op-ed, feature, interview.

- news: reports recent events, announcements or data factually, in the third person, without the writer's own opinion.
- op-ed: argues a position in the author's own voice; opinion columns, commentary and editorials.
- feature: long-form storytelling or analysis exploring a topic, trend, place or person in depth rather than a single event.
- interview: built around questions and answers or extended direct quotes from one interviewee.

When an article fits more than one category, prefer interview over op-ed, op-ed over feature, and feature over news.
Reply with the type first, followed by a one-line explanation in parentheses, for example: news (reports a company's quarterly results)";

/// Asks the completion service which of the four article types a text is.
#[derive(Debug, Clone)]
pub struct TypeClassifier {
    service: Arc<dyn CompletionService>,
}

impl TypeClassifier {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self { service }
    }

    /// Completion failures come back as [`Error::Classification`].
    pub async fn classify(&self, text: &str) -> Result<TypeDetection> {
        if text.trim().is_empty() {
            return Err(Error::Validation(
                "Please paste your article text before analyzing".to_string(),
            ));
        }

        let sample: String = text.chars().take(SAMPLE_CHARS).collect();
        let request = CompletionRequest::new(format!("{}\n\nArticle:\n{}", RUBRIC, sample), MAX_TOKENS).fast();

        let reply = self
            .service
            .complete(&request)
            .await
            .map_err(|e| Error::Classification(e.to_string()))?;

        let detection = parse_reply(&reply);
        info!("Article type detected: {} ({})", detection.article_type, detection.explanation);
        Ok(detection)
    }
}

/// Reads the label from the first word, then from anywhere in the reply.
pub fn parse_reply(reply: &str) -> TypeDetection {
    let trimmed = reply.trim();

    let first_token = trimmed
        .split_whitespace()
        .next()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '-'))
        .and_then(|t| t.parse::<ArticleType>().ok());

    let article_type = first_token
        .or_else(|| {
            LABEL
                .captures(trimmed)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<ArticleType>().ok())
        })
        .unwrap_or_else(|| {
            debug!("No article type in reply {:?}; defaulting to news", trimmed);
            ArticleType::News
        });

    let explanation = PARENTHESIS
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| NO_EXPLANATION.to_string());

    TypeDetection {
        article_type,
        explanation,
        raw_response: reply.to_string(),
    }
}
