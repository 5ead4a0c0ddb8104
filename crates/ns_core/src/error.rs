use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Error detecting article type: {0}")]
    Classification(String),

    #[error("{0}")]
    Completion(#[from] CompletionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Message suitable for showing to the person who triggered the request.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::Completion(err) => err.user_guidance(),
            Error::Classification(msg) => match CompletionErrorKind::sniff(msg) {
                CompletionErrorKind::Other | CompletionErrorKind::Network => {
                    format!("Error detecting article type: {}", msg)
                }
                kind => kind.guidance().to_string(),
            },
            other => format!("An error occurred: {}", other),
        }
    }
}

/// Failure categories reported by the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionErrorKind {
    RateLimited,
    Overloaded,
    ServerError,
    InvalidCredential,
    Network,
    Other,
}

impl CompletionErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            529 => Self::Overloaded,
            401 | 403 => Self::InvalidCredential,
            500..=599 => Self::ServerError,
            _ => Self::Other,
        }
    }

    /// Categorise a provider error from its text alone.
    pub fn sniff(message: &str) -> Self {
        let lower = message.to_lowercase();
        if message.contains("529") || lower.contains("overloaded") {
            Self::Overloaded
        } else if lower.contains("rate_limit") || message.contains("429") {
            Self::RateLimited
        } else if message.contains("500") || message.contains("502") || message.contains("503") {
            Self::ServerError
        } else if message.contains("401") || lower.contains("invalid_api_key") || lower.contains("authentication_error") {
            Self::InvalidCredential
        } else if lower.contains("network") || lower.contains("connection") {
            Self::Network
        } else {
            Self::Other
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Overloaded => "⚠️ Anthropic's servers are currently overloaded. Please wait a moment and try again.",
            Self::RateLimited => "⏱️ Rate limit exceeded. Please wait a minute before trying again.",
            Self::ServerError => "🔧 Anthropic is experiencing server issues. Please try again in a few moments.",
            Self::InvalidCredential => "❌ Invalid API key. Please check your API key and try again.",
            Self::Network => "🌐 Network connection error. Please check your connection and try again.",
            Self::Other => "An error occurred while contacting the completion service.",
        }
    }
}

impl fmt::Display for CompletionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RateLimited => "rate limited",
            Self::Overloaded => "overloaded",
            Self::ServerError => "server error",
            Self::InvalidCredential => "invalid credential",
            Self::Network => "network error",
            Self::Other => "error",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone)]
#[error("Completion service {kind}: {message}")]
pub struct CompletionError {
    pub kind: CompletionErrorKind,
    pub message: String,
}

impl CompletionError {
    pub fn new(kind: CompletionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Builds an error whose category is sniffed from the provider's message.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: CompletionErrorKind::sniff(&message),
            message,
        }
    }

    pub fn user_guidance(&self) -> String {
        match self.kind {
            CompletionErrorKind::Other => format!("An error occurred: {}", self.message),
            kind => kind.guidance().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_status() {
        assert_eq!(CompletionErrorKind::from_status(429), CompletionErrorKind::RateLimited);
        assert_eq!(CompletionErrorKind::from_status(529), CompletionErrorKind::Overloaded);
        assert_eq!(CompletionErrorKind::from_status(503), CompletionErrorKind::ServerError);
        assert_eq!(CompletionErrorKind::from_status(401), CompletionErrorKind::InvalidCredential);
        assert_eq!(CompletionErrorKind::from_status(400), CompletionErrorKind::Other);
    }

    #[test]
    fn test_kind_sniffing() {
        assert_eq!(
            CompletionErrorKind::sniff("Error code: 529 - overloaded_error"),
            CompletionErrorKind::Overloaded
        );
        assert_eq!(
            CompletionErrorKind::sniff("rate_limit_error: too many requests"),
            CompletionErrorKind::RateLimited
        );
        assert_eq!(CompletionErrorKind::sniff("HTTP 502 bad gateway"), CompletionErrorKind::ServerError);
        assert_eq!(CompletionErrorKind::sniff("Connection refused"), CompletionErrorKind::Network);
        assert_eq!(CompletionErrorKind::sniff("something odd"), CompletionErrorKind::Other);
    }

    #[test]
    fn test_user_message_for_validation_is_verbatim() {
        let err = Error::Validation("Please provide the author name".to_string());
        assert_eq!(err.user_message(), "Please provide the author name");
    }

    #[test]
    fn test_user_message_for_completion_uses_guidance() {
        let err = Error::from(CompletionError::new(CompletionErrorKind::RateLimited, "429"));
        assert!(err.user_message().contains("Rate limit exceeded"));

        let err = Error::from(CompletionError::from_message("weird failure"));
        assert_eq!(err.user_message(), "An error occurred: weird failure");
    }

    #[test]
    fn test_classification_message() {
        let err = Error::Classification("bad reply".to_string());
        assert_eq!(err.user_message(), "Error detecting article type: bad reply");

        let err = Error::Classification("overloaded_error".to_string());
        assert!(err.user_message().contains("overloaded"));
    }
}
