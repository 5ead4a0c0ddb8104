use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use ns_core::{Error, Result};
use url::Url;

pub mod classifier;
pub mod language;
pub mod models;
pub mod normalizer;
pub mod orchestrator;
pub mod prompt;

pub const DEFAULT_SUMMARY_MODEL: &str = "claude-3-5-sonnet-latest";
pub const DEFAULT_FAST_MODEL: &str = "claude-3-5-haiku-latest";
pub const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_PUBLICATIONS_FILE: &str = "data/publications.json";

/// Which completion backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Anthropic,
    Dummy,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Backend::Anthropic),
            "dummy" | "offline" => Ok(Backend::Dummy),
            other => Err(Error::Config(format!(
                "Unknown model backend '{}'. Expected 'anthropic' or 'dummy'",
                other
            ))),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub backend: Backend,
    pub api_key: Option<String>,
    pub summary_model: String,
    pub fast_model: String,
    pub api_base_url: String,
    pub publications_file: PathBuf,
    pub validate_key: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("backend", &self.backend)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("summary_model", &self.summary_model)
            .field("fast_model", &self.fast_model)
            .field("api_base_url", &self.api_base_url)
            .field("publications_file", &self.publications_file)
            .field("validate_key", &self.validate_key)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Anthropic,
            api_key: None,
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
            fast_model: DEFAULT_FAST_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            publications_file: PathBuf::from(DEFAULT_PUBLICATIONS_FILE),
            validate_key: true,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment after loading
    /// the first `.env` file found.
    pub fn from_env() -> Result<Self> {
        Self::try_load_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let config = Self {
            backend: get("NS_MODEL").map(|v| v.parse::<Backend>()).transpose()?.unwrap_or_default(),
            api_key: get("ANTHROPIC_API_KEY"),
            summary_model: get("NS_SUMMARY_MODEL").unwrap_or(defaults.summary_model),
            fast_model: get("NS_FAST_MODEL").unwrap_or(defaults.fast_model),
            api_base_url: get("NS_API_BASE_URL").unwrap_or(defaults.api_base_url),
            publications_file: get("NS_PUBLICATIONS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.publications_file),
            validate_key: match get("NS_VALIDATE_KEY") {
                Some(v) => parse_flag(&v)?,
                None => defaults.validate_key,
            },
        };
        config.check()?;
        Ok(config)
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn check(&self) -> Result<()> {
        Url::parse(&self.api_base_url)
            .map_err(|e| Error::Config(format!("NS_API_BASE_URL '{}' is not a URL: {}", self.api_base_url, e)))?;
        Ok(())
    }

    fn try_load_dotenv() {
        if dotenvy::dotenv().is_ok() {
            return;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("news-summariser").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!("Expected a boolean, got '{}'", other))),
    }
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::orchestrator::{ScrapeOutcome, SummaryOrchestrator, SummaryOutcome};
    pub use super::{Backend, Config};
    pub use ns_core::{ArticleType, Error, LanguageInfo, Result, SummaryRequest, TypeDetection};
}

pub use models::create_model;
pub use orchestrator::{ScrapeOutcome, SummaryOrchestrator, SummaryOutcome};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.backend, Backend::Anthropic);
        assert!(config.api_key.is_none());
        assert_eq!(config.summary_model, DEFAULT_SUMMARY_MODEL);
        assert_eq!(config.fast_model, DEFAULT_FAST_MODEL);
        assert_eq!(config.publications_file, PathBuf::from(DEFAULT_PUBLICATIONS_FILE));
        assert!(config.validate_key);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("NS_MODEL", "dummy"),
            ("ANTHROPIC_API_KEY", " sk-test "),
            ("NS_FAST_MODEL", "claude-3-haiku-20240307"),
            ("NS_VALIDATE_KEY", "no"),
            ("NS_SUMMARY_MODEL", ""),
        ]))
        .unwrap();
        assert_eq!(config.backend, Backend::Dummy);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.fast_model, "claude-3-haiku-20240307");
        assert_eq!(config.summary_model, DEFAULT_SUMMARY_MODEL);
        assert!(!config.validate_key);
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_lookup(lookup(&[("NS_MODEL", "gpt")])).is_err());
        assert!(Config::from_lookup(lookup(&[("NS_VALIDATE_KEY", "maybe")])).is_err());
        assert!(Config::from_lookup(lookup(&[("NS_API_BASE_URL", "not a url")])).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config::default().with_api_key("sk-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
