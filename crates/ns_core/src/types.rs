use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const MIN_SENTENCES: u8 = 2;
pub const MAX_SENTENCES: u8 = 6;
pub const DEFAULT_SENTENCES: u8 = 3;

/// The four article shapes a summary can be written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ArticleType {
    #[default]
    #[serde(rename = "news")]
    News,
    #[serde(rename = "op-ed")]
    OpEd,
    #[serde(rename = "feature")]
    Feature,
    #[serde(rename = "interview")]
    Interview,
}

impl ArticleType {
    pub const ALL: [ArticleType; 4] = [
        ArticleType::News,
        ArticleType::OpEd,
        ArticleType::Feature,
        ArticleType::Interview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleType::News => "news",
            ArticleType::OpEd => "op-ed",
            ArticleType::Feature => "feature",
            ArticleType::Interview => "interview",
        }
    }

    /// Op-eds need their author, interviews their interviewee.
    pub fn requires_author(&self) -> bool {
        matches!(self, ArticleType::OpEd | ArticleType::Interview)
    }

    pub fn author_label(&self) -> &'static str {
        match self {
            ArticleType::Interview => "interviewee",
            _ => "author",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ArticleType::News => "News",
            ArticleType::OpEd => "Op-Ed",
            ArticleType::Feature => "Feature",
            ArticleType::Interview => "Interview",
        }
    }
}

impl fmt::Display for ArticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "news" => Ok(ArticleType::News),
            "op-ed" | "oped" | "op ed" | "opinion" => Ok(ArticleType::OpEd),
            "feature" => Ok(ArticleType::Feature),
            "interview" => Ok(ArticleType::Interview),
            other => Err(Error::Validation(format!(
                "Unknown article type '{}'. Expected one of: news, op-ed, feature, interview",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Primary,
    Secondary,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::Primary => f.write_str("primary"),
            ExtractionMethod::Secondary => f.write_str("secondary"),
        }
    }
}

/// Outcome of one URL scrape. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub publication: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<ExtractionMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paywall_warning: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    pub fn failure(error: impl Into<String>, publication: impl Into<String>) -> Self {
        Self {
            success: false,
            text: None,
            title: None,
            author: None,
            publication: publication.into(),
            method: None,
            paywall_warning: None,
            error: Some(error.into()),
        }
    }

    pub fn is_paywalled(&self) -> bool {
        self.paywall_warning.unwrap_or(false)
    }

    /// The message shown after a scrape attempt.
    pub fn status_message(&self) -> String {
        if !self.success {
            return self
                .error
                .clone()
                .unwrap_or_else(|| "Failed to extract article".to_string());
        }

        let method = self
            .method
            .map(|m| m.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let mut message = format!("✅ Article successfully extracted using {} extraction!", method);
        if self.is_paywalled() {
            message.push_str(
                "\n⚠️ Note: This site often has paywalled content. If the extracted text seems incomplete, you may need to paste it manually.",
            );
        }
        message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionMethod {
    #[serde(rename = "fast-local")]
    FastLocal,
    #[serde(rename = "llm")]
    Llm,
    #[serde(rename = "default")]
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub language: String,
    pub is_english: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub method: DetectionMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LanguageInfo {
    pub fn english_default(error: impl Into<String>) -> Self {
        Self {
            language: "English".to_string(),
            is_english: true,
            confidence: None,
            method: DetectionMethod::Default,
            error: Some(error.into()),
        }
    }

    pub fn caption(&self) -> String {
        let mut caption = format!("🌍 Language: {}", self.language);
        if let Some(confidence) = self.confidence.filter(|c| *c > 0.0) {
            caption.push_str(&format!(" ({}% conf.)", (confidence * 100.0) as u32));
        }
        if !self.is_english {
            caption.push_str(" - will translate");
        }
        caption
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDetection {
    #[serde(rename = "type")]
    pub article_type: ArticleType,
    pub explanation: String,
    pub raw_response: String,
}

/// Everything needed to compose one summary prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub article_text: String,
    pub publication: String,
    pub article_type: ArticleType,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub specific_instructions: Option<String>,
    #[serde(default = "default_sentence_count")]
    pub sentence_count: u8,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_mention_count: Option<usize>,
}

fn default_sentence_count() -> u8 {
    DEFAULT_SENTENCES
}

impl SummaryRequest {
    pub fn new(
        article_text: impl Into<String>,
        publication: impl Into<String>,
        article_type: ArticleType,
    ) -> Self {
        Self {
            article_text: article_text.into(),
            publication: publication.into(),
            article_type,
            author: None,
            specific_instructions: None,
            sentence_count: DEFAULT_SENTENCES,
            client_name: None,
            client_mention_count: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.specific_instructions = Some(instructions.into());
        self
    }

    pub fn with_sentence_count(mut self, count: u8) -> Self {
        self.sentence_count = count;
        self
    }

    pub fn with_client(mut self, name: impl Into<String>, mentions: usize) -> Self {
        self.client_name = Some(name.into());
        self.client_mention_count = Some(mentions);
        self
    }

    /// Author with surrounding whitespace removed, if one was given.
    pub fn author_name(&self) -> Option<&str> {
        self.author.as_deref().map(str::trim).filter(|a| !a.is_empty())
    }

    pub fn instructions(&self) -> Option<&str> {
        self.specific_instructions
            .as_deref()
            .map(str::trim)
            .filter(|i| !i.is_empty())
    }

    pub fn client(&self) -> Option<(&str, usize)> {
        let name = self.client_name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
        Some((name, self.client_mention_count.unwrap_or(0)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.article_text.trim().is_empty() || self.publication.trim().is_empty() {
            return Err(Error::Validation(
                "Please provide both publication name and article text".to_string(),
            ));
        }
        if !(MIN_SENTENCES..=MAX_SENTENCES).contains(&self.sentence_count) {
            return Err(Error::Validation(format!(
                "Sentence count must be between {} and {}",
                MIN_SENTENCES, MAX_SENTENCES
            )));
        }
        if self.article_type.requires_author() && self.author_name().is_none() {
            return Err(Error::Validation(format!(
                "Please provide the {} name",
                self.article_type.author_label()
            )));
        }
        if let Some((name, 0)) = self.client() {
            return Err(Error::Validation(format!(
                "'{}' was not found in the article text. Please check the client name and try again.",
                name
            )));
        }
        Ok(())
    }
}

/// Which model class a completion should run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    #[default]
    Primary,
    Fast,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub max_output_tokens: u32,
    pub tier: ModelTier,
}

impl CompletionRequest {
    pub fn new(user_prompt: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            system_prompt: None,
            user_prompt: user_prompt.into(),
            max_output_tokens,
            tier: ModelTier::Primary,
        }
    }

    pub fn with_system(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn fast(mut self) -> Self {
        self.tier = ModelTier::Fast;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SummaryRequest {
        SummaryRequest::new("Some article text.", "The Guardian", ArticleType::News)
    }

    #[test]
    fn test_article_type_parsing() {
        assert_eq!("news".parse::<ArticleType>().unwrap(), ArticleType::News);
        assert_eq!("Op-Ed".parse::<ArticleType>().unwrap(), ArticleType::OpEd);
        assert_eq!("interview".parse::<ArticleType>().unwrap(), ArticleType::Interview);
        assert!("editorial".parse::<ArticleType>().is_err());
    }

    #[test]
    fn test_article_type_wire_names() {
        let json = serde_json::to_string(&ArticleType::OpEd).unwrap();
        assert_eq!(json, "\"op-ed\"");
        let parsed: ArticleType = serde_json::from_str("\"feature\"").unwrap();
        assert_eq!(parsed, ArticleType::Feature);
    }

    #[test]
    fn test_sentence_count_bounds() {
        assert!(request().with_sentence_count(1).validate().is_err());
        assert!(request().with_sentence_count(7).validate().is_err());
        for count in 2..=6 {
            assert!(request().with_sentence_count(count).validate().is_ok());
        }
    }

    #[test]
    fn test_author_required_for_op_ed_and_interview() {
        let mut req = request();
        req.article_type = ArticleType::OpEd;
        let err = req.validate().unwrap_err();
        assert_eq!(err.to_string(), "Please provide the author name");

        req.article_type = ArticleType::Interview;
        req.author = Some("   ".to_string());
        let err = req.validate().unwrap_err();
        assert_eq!(err.to_string(), "Please provide the interviewee name");

        assert!(req.with_author("Jane Smith").validate().is_ok());
    }

    #[test]
    fn test_missing_text_or_publication() {
        let req = SummaryRequest::new("", "The Guardian", ArticleType::News);
        assert!(matches!(req.validate(), Err(Error::Validation(_))));
        let req = SummaryRequest::new("text", " ", ArticleType::News);
        assert!(matches!(req.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_zero_client_mentions_rejected() {
        let err = request().with_client("Acme", 0).validate().unwrap_err();
        assert!(err.to_string().contains("'Acme' was not found"));
        assert!(request().with_client("Acme", 2).validate().is_ok());
    }

    #[test]
    fn test_extraction_status_message() {
        let mut result = ExtractionResult::failure("nope", "Wired");
        assert_eq!(result.status_message(), "nope");

        result.success = true;
        result.error = None;
        result.method = Some(ExtractionMethod::Secondary);
        result.paywall_warning = Some(true);
        let message = result.status_message();
        assert!(message.contains("secondary"));
        assert!(message.contains("paywalled"));
    }

    #[test]
    fn test_language_caption() {
        let info = LanguageInfo {
            language: "Spanish".to_string(),
            is_english: false,
            confidence: Some(0.973),
            method: DetectionMethod::FastLocal,
            error: None,
        };
        assert_eq!(info.caption(), "🌍 Language: Spanish (97% conf.) - will translate");

        let info = LanguageInfo::english_default("offline");
        assert_eq!(info.caption(), "🌍 Language: English");
        assert_eq!(info.method, DetectionMethod::Default);
    }

    #[test]
    fn test_completion_request_builders() {
        let req = CompletionRequest::new("hi", 10).with_system("sys").fast();
        assert_eq!(req.system_prompt.as_deref(), Some("sys"));
        assert_eq!(req.tier, ModelTier::Fast);
        assert_eq!(req.max_output_tokens, 10);
    }
}
