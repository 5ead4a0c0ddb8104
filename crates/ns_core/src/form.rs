use serde::{Deserialize, Serialize};

use crate::mentions::count_mentions;
use crate::types::{
    ArticleType, ExtractionResult, LanguageInfo, SummaryRequest, TypeDetection, DEFAULT_SENTENCES,
};
use crate::{Error, Result};

/// Fields of one summary form as the user filled them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryForm {
    pub url: String,
    pub publication: String,
    pub article_text: String,
    pub article_type: ArticleType,
    pub use_ai_detection: bool,
    pub author: String,
    pub specific_instructions: String,
    pub sentence_count: u8,
    pub client_name: String,
}

impl Default for SummaryForm {
    fn default() -> Self {
        Self {
            url: String::new(),
            publication: String::new(),
            article_text: String::new(),
            article_type: ArticleType::News,
            use_ai_detection: false,
            author: String::new(),
            specific_instructions: String::new(),
            sentence_count: DEFAULT_SENTENCES,
            client_name: String::new(),
        }
    }
}

/// Request-scoped state for one article: the form plus everything derived
/// from it so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormContext {
    generation: u64,
    pub form: SummaryForm,
    pub scraped: Option<ExtractionResult>,
    pub detected_type: Option<TypeDetection>,
    pub detected_language: Option<LanguageInfo>,
    pub summary: Option<String>,
    pub error_message: Option<String>,
}

impl FormContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(form: SummaryForm) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Starts a new article: a fresh context one generation on.
    pub fn reset(&self) -> Self {
        Self {
            generation: self.generation + 1,
            ..Self::default()
        }
    }

    /// Pre-fills the form from a scrape the way the URL tab does.
    pub fn apply_scrape(&mut self, result: ExtractionResult) {
        if !result.publication.is_empty() {
            self.form.publication = result.publication.clone();
        }
        if result.success {
            if let Some(text) = &result.text {
                self.form.article_text = text.clone();
            }
            if let Some(author) = result.author.as_ref().filter(|a| !a.is_empty()) {
                self.form.author = author.clone();
            }
            self.error_message = None;
        } else {
            self.error_message = Some(result.status_message());
        }
        self.scraped = Some(result);
    }

    /// The article type in effect: the AI-detected one when detection is on.
    pub fn effective_type(&self) -> Result<ArticleType> {
        if !self.form.use_ai_detection {
            return Ok(self.form.article_type);
        }
        self.detected_type
            .as_ref()
            .map(|d| d.article_type)
            .ok_or_else(|| {
                Error::Validation(
                    "Please analyze the article type first using the 'Analyze Article Type' button"
                        .to_string(),
                )
            })
    }

    /// Validates the form and turns it into a summary request.
    pub fn to_request(&self) -> Result<SummaryRequest> {
        let form = &self.form;
        let article_type = self.effective_type()?;

        let mut request = SummaryRequest::new(
            form.article_text.clone(),
            form.publication.trim(),
            article_type,
        )
        .with_sentence_count(form.sentence_count);

        let client = form.client_name.trim();
        if !client.is_empty() {
            let mentions = count_mentions(&form.article_text, client);
            request = request.with_client(client, mentions);
        }
        if article_type.requires_author() && !form.author.trim().is_empty() {
            request = request.with_author(form.author.trim());
        }
        if !form.specific_instructions.trim().is_empty() {
            request = request.with_instructions(form.specific_instructions.trim());
        }

        request.validate()?;
        Ok(request)
    }

    pub fn text_stats(&self) -> TextStats {
        TextStats::of(&self.form.article_text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextStats {
    pub characters: usize,
    pub words: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            characters: text.chars().count(),
            words: text.split_whitespace().count(),
        }
    }

    pub fn caption(&self) -> String {
        format!(
            "📊 {} characters, ~{} words",
            group_thousands(self.characters),
            group_thousands(self.words)
        )
    }
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
