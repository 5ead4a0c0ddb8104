use std::fmt;
use std::sync::Arc;

use ns_core::{CompletionRequest, CompletionService, DetectionMethod, Error, LanguageInfo, Result};
use tracing::{debug, info, warn};

const FAST_SAMPLE_CHARS: usize = 2000;
const LLM_SAMPLE_CHARS: usize = 1000;
const LLM_MAX_TOKENS: u32 = 20;

/// Result of the fast local identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    /// ISO 639-1 code where one exists, e.g. `"en"`.
    pub code: String,
    pub confidence: f64,
}

/// Offline language identification.
pub trait LanguageIdentifier: Send + Sync + fmt::Debug {
    fn identify(&self, text: &str) -> Option<Identification>;
}

#[cfg(feature = "fast-langdetect")]
#[derive(Debug, Default)]
pub struct WhatlangIdentifier;

#[cfg(feature = "fast-langdetect")]
impl LanguageIdentifier for WhatlangIdentifier {
    fn identify(&self, text: &str) -> Option<Identification> {
        let info = whatlang::detect(text)?;
        Some(Identification {
            code: iso_639_1(info.lang().code()).to_string(),
            confidence: info.confidence(),
        })
    }
}

/// Maps whatlang's ISO 639-3 codes onto the two-letter codes used for display.
#[cfg(feature = "fast-langdetect")]
fn iso_639_1(code: &str) -> &str {
    match code {
        "eng" => "en",
        "spa" => "es",
        "fra" => "fr",
        "deu" => "de",
        "ita" => "it",
        "por" => "pt",
        "nld" => "nl",
        "rus" => "ru",
        "jpn" => "ja",
        "cmn" => "zh",
        "kor" => "ko",
        "ara" => "ar",
        "hin" => "hi",
        "tur" => "tr",
        "pol" => "pl",
        "swe" => "sv",
        "dan" => "da",
        "nob" => "no",
        "fin" => "fi",
        "ell" => "el",
        "heb" => "he",
        "ces" => "cs",
        "hun" => "hu",
        "ron" => "ro",
        "ukr" => "uk",
        "vie" => "vi",
        "tha" => "th",
        "ind" => "id",
        "cat" => "ca",
        other => other,
    }
}

/// The identifier compiled into this build, if any.
pub fn default_identifier() -> Option<Box<dyn LanguageIdentifier>> {
    #[cfg(feature = "fast-langdetect")]
    {
        Some(Box::new(WhatlangIdentifier))
    }
    #[cfg(not(feature = "fast-langdetect"))]
    {
        None
    }
}

const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("nl", "Dutch"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("zh", "Chinese"),
    ("ko", "Korean"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("tr", "Turkish"),
    ("pl", "Polish"),
    ("sv", "Swedish"),
    ("da", "Danish"),
    ("no", "Norwegian"),
    ("fi", "Finnish"),
    ("el", "Greek"),
    ("he", "Hebrew"),
    ("cs", "Czech"),
    ("hu", "Hungarian"),
    ("ro", "Romanian"),
    ("uk", "Ukrainian"),
    ("vi", "Vietnamese"),
    ("th", "Thai"),
    ("id", "Indonesian"),
    ("ca", "Catalan"),
];

/// Alternative spellings and self-names the completion service may answer with.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("english", "English"),
    ("inglés", "English"),
    ("anglais", "English"),
    ("englisch", "English"),
    ("spanish", "Spanish"),
    ("español", "Spanish"),
    ("espanol", "Spanish"),
    ("castellano", "Spanish"),
    ("castilian", "Spanish"),
    ("french", "French"),
    ("français", "French"),
    ("francais", "French"),
    ("german", "German"),
    ("deutsch", "German"),
    ("italian", "Italian"),
    ("italiano", "Italian"),
    ("portuguese", "Portuguese"),
    ("português", "Portuguese"),
    ("portugues", "Portuguese"),
    ("dutch", "Dutch"),
    ("nederlands", "Dutch"),
    ("flemish", "Dutch"),
    ("russian", "Russian"),
    ("русский", "Russian"),
    ("chinese", "Chinese"),
    ("mandarin", "Chinese"),
    ("中文", "Chinese"),
    ("japanese", "Japanese"),
    ("日本語", "Japanese"),
    ("korean", "Korean"),
    ("한국어", "Korean"),
    ("arabic", "Arabic"),
    ("العربية", "Arabic"),
    ("polish", "Polish"),
    ("polski", "Polish"),
    ("swedish", "Swedish"),
    ("svenska", "Swedish"),
    ("danish", "Danish"),
    ("dansk", "Danish"),
    ("norwegian", "Norwegian"),
    ("norsk", "Norwegian"),
    ("finnish", "Finnish"),
    ("suomi", "Finnish"),
    ("turkish", "Turkish"),
    ("türkçe", "Turkish"),
    ("greek", "Greek"),
    ("ελληνικά", "Greek"),
];

/// Display name for a two-letter code; unknown codes are shown uppercased.
pub fn language_name(code: &str) -> String {
    let code = code.trim().to_lowercase();
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_uppercase())
}

fn known_language(word: &str) -> Option<&'static str> {
    let lower = word.to_lowercase();
    LANGUAGE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, name)| *name)
        .or_else(|| {
            LANGUAGE_NAMES
                .iter()
                .find(|(_, name)| name.eq_ignore_ascii_case(&lower))
                .map(|(_, name)| *name)
        })
}

/// Canonical English name for whatever the completion service replied.
///
/// The first known language named anywhere on the first line wins. A lone
/// unknown word is taken as the name itself; anything chattier is `None`.
pub fn canonical_language(reply: &str) -> Option<String> {
    let line = reply.lines().map(str::trim).find(|line| !line.is_empty())?;
    let words: Vec<&str> = line
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .collect();

    if let Some(name) = words.iter().find_map(|w| known_language(w)) {
        return Some(name.to_string());
    }

    match words.as_slice() {
        [word] if word.chars().all(char::is_alphabetic) => {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            chars.next().map(|first| first.to_uppercase().chain(chars).collect())
        }
        _ => None,
    }
}

fn sample(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Works out which language an article is written in. Never fails: the
/// worst case is an English default carrying the reason.
#[derive(Debug)]
pub struct LanguageDetector {
    identifier: Option<Box<dyn LanguageIdentifier>>,
    service: Arc<dyn CompletionService>,
}

impl LanguageDetector {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        let identifier = default_identifier();
        if identifier.is_some() {
            info!("Fast language detection enabled");
        } else {
            warn!("Fast language detection not compiled in; using the completion service");
        }
        Self::with_identifier(service, identifier)
    }

    pub fn with_identifier(
        service: Arc<dyn CompletionService>,
        identifier: Option<Box<dyn LanguageIdentifier>>,
    ) -> Self {
        Self { identifier, service }
    }

    pub fn has_fast_path(&self) -> bool {
        self.identifier.is_some()
    }

    pub async fn detect(&self, text: &str) -> LanguageInfo {
        if text.trim().is_empty() {
            return LanguageInfo::english_default("No text to analyse");
        }

        if let Some(info) = self.detect_fast(text) {
            return info;
        }

        match self.detect_with_service(text).await {
            Ok(info) => info,
            Err(e) => {
                warn!("Language detection failed, assuming English: {}", e);
                LanguageInfo::english_default(e.to_string())
            }
        }
    }

    fn detect_fast(&self, text: &str) -> Option<LanguageInfo> {
        let identifier = self.identifier.as_ref()?;
        let flattened = sample(text, FAST_SAMPLE_CHARS).replace(['\r', '\n'], " ");

        let Some(found) = identifier.identify(&flattened) else {
            debug!("Fast identifier gave no answer");
            return None;
        };

        Some(LanguageInfo {
            language: language_name(&found.code),
            is_english: found.code.eq_ignore_ascii_case("en"),
            confidence: Some(found.confidence.clamp(0.0, 1.0)),
            method: DetectionMethod::FastLocal,
            error: None,
        })
    }

    async fn detect_with_service(&self, text: &str) -> Result<LanguageInfo> {
        let prompt = format!(
            "What is the primary language of the following text? Respond with ONLY the language name in English \
             (for example: English, Spanish, French). Do not include any other text.\n\nText: {}",
            sample(text, LLM_SAMPLE_CHARS)
        );
        let request = CompletionRequest::new(prompt, LLM_MAX_TOKENS).fast();
        let reply = self.service.complete(&request).await?;

        let language = canonical_language(&reply)
            .ok_or_else(|| Error::Validation(format!("Unrecognised language reply: {:?}", reply)))?;

        Ok(LanguageInfo {
            is_english: language == "English",
            language,
            confidence: None,
            method: DetectionMethod::Llm,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScriptedModel;
    use ns_core::{CompletionError, CompletionErrorKind};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct FixedIdentifier {
        answer: Option<Identification>,
        seen: Mutex<Vec<String>>,
    }

    impl LanguageIdentifier for FixedIdentifier {
        fn identify(&self, text: &str) -> Option<Identification> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(text.to_string());
            }
            self.answer.clone()
        }
    }

    fn fixed(code: &str, confidence: f64) -> Box<dyn LanguageIdentifier> {
        Box::new(FixedIdentifier {
            answer: Some(Identification {
                code: code.to_string(),
                confidence,
            }),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_fast_path() {
        let service = Arc::new(ScriptedModel::new());
        let detector = LanguageDetector::with_identifier(service.clone(), Some(fixed("es", 0.97)));
        let info = detector.detect("El banco central subió los tipos.").await;
        assert_eq!(info.language, "Spanish");
        assert!(!info.is_english);
        assert_eq!(info.confidence, Some(0.97));
        assert_eq!(info.method, DetectionMethod::FastLocal);
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fast_path_flattens_and_truncates() {
        let identifier = Arc::new(FixedIdentifier::default());
        #[derive(Debug)]
        struct Shared(Arc<FixedIdentifier>);
        impl LanguageIdentifier for Shared {
            fn identify(&self, text: &str) -> Option<Identification> {
                self.0.identify(text)
            }
        }

        let service = Arc::new(ScriptedModel::new().reply("English"));
        let detector = LanguageDetector::with_identifier(service, Some(Box::new(Shared(identifier.clone()))));
        let text = format!("line one\nline two\n{}", "x".repeat(3000));
        detector.detect(&text).await;

        let seen = identifier.seen.lock().unwrap();
        assert_eq!(seen[0].chars().count(), FAST_SAMPLE_CHARS);
        assert!(!seen[0].contains('\n'));
    }

    #[tokio::test]
    async fn test_unmapped_code_is_uppercased() {
        let service = Arc::new(ScriptedModel::new());
        let detector = LanguageDetector::with_identifier(service, Some(fixed("sw", 0.5)));
        assert_eq!(detector.detect("Habari").await.language, "SW");
    }

    #[tokio::test]
    async fn test_service_fallback_normalises_self_names() {
        let service = Arc::new(ScriptedModel::new().reply("Español."));
        let detector = LanguageDetector::with_identifier(service.clone(), None);
        let info = detector.detect("Hola a todos.").await;
        assert_eq!(info.language, "Spanish");
        assert_eq!(info.method, DetectionMethod::Llm);
        assert!(info.confidence.is_none());

        let request = &service.requests()[0];
        assert!(request.user_prompt.contains("primary language"));
    }

    #[tokio::test]
    async fn test_service_fallback_truncates_sample() {
        let service = Arc::new(ScriptedModel::new().reply("English"));
        let detector = LanguageDetector::with_identifier(service.clone(), None);
        let text = "ж".repeat(5000);
        let info = detector.detect(&text).await;
        assert!(info.is_english);

        let prompt = &service.requests()[0].user_prompt;
        assert_eq!(prompt.matches('ж').count(), LLM_SAMPLE_CHARS);
    }

    #[tokio::test]
    async fn test_default_when_everything_fails() {
        let service = Arc::new(
            ScriptedModel::new().fail(CompletionError::new(CompletionErrorKind::Network, "connection refused")),
        );
        let identifier = Box::new(FixedIdentifier::default());
        let detector = LanguageDetector::with_identifier(service, Some(identifier));
        let info = detector.detect("Some text").await;
        assert_eq!(info.language, "English");
        assert!(info.is_english);
        assert_eq!(info.method, DetectionMethod::Default);
        assert!(info.error.unwrap().contains("connection refused"));
    }

    #[test]
    fn test_canonical_language() {
        assert_eq!(canonical_language("  français\n").as_deref(), Some("French"));
        assert_eq!(canonical_language("\"German\"").as_deref(), Some("German"));
        assert_eq!(canonical_language("swahili").as_deref(), Some("Swahili"));
        assert_eq!(canonical_language(" \n "), None);
        assert_eq!(canonical_language("Hebrew").as_deref(), Some("Hebrew"));
    }

    #[test]
    fn test_chatty_replies() {
        assert_eq!(canonical_language("The language is Spanish.").as_deref(), Some("Spanish"));
        assert_eq!(canonical_language("It's written in Brazilian Portuguese").as_deref(), Some("Portuguese"));
        assert_eq!(canonical_language("I am not sure what this is."), None);
        assert_eq!(canonical_language("Klingon, probably"), None);
    }

    #[tokio::test]
    async fn test_chatty_service_reply() {
        let service = Arc::new(ScriptedModel::new().reply("The language is Spanish."));
        let detector = LanguageDetector::with_identifier(service, None);
        let info = detector.detect("Hola a todos.").await;
        assert_eq!(info.language, "Spanish");
        assert!(!info.is_english);
        assert_eq!(info.method, DetectionMethod::Llm);

        let service = Arc::new(ScriptedModel::new().reply("Hard to say, it could be several."));
        let detector = LanguageDetector::with_identifier(service, None);
        let info = detector.detect("Hola a todos.").await;
        assert_eq!(info.language, "English");
        assert_eq!(info.method, DetectionMethod::Default);
        assert!(info.error.unwrap().contains("Unrecognised language reply"));
    }

    #[cfg(feature = "fast-langdetect")]
    #[test]
    fn test_whatlang_identifier() {
        let found = WhatlangIdentifier
            .identify("The central bank raised interest rates again on Thursday, surprising economists and markets.")
            .unwrap();
        assert_eq!(found.code, "en");
    }
}
