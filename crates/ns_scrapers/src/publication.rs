use std::collections::HashMap;
use std::path::Path;

use ns_core::{Error, Result};
use tracing::{debug, info, warn};
use url::Url;

/// Subdomain prefixes peeled off, one at a time, while looking a host up.
const STRIP_PREFIXES: &[&str] = &["www.", "edition.", "amp.", "m.", "mobile.", "news."];

/// Fallback names keyed by the first label of the cleaned host.
const KNOWN_PUBLICATIONS: &[(&str, &str)] = &[
    ("nytimes", "The New York Times"),
    ("wsj", "The Wall Street Journal"),
    ("ft", "Financial Times"),
    ("bbc", "BBC News"),
    ("cnn", "CNN"),
    ("reuters", "Reuters"),
    ("bloomberg", "Bloomberg"),
    ("theguardian", "The Guardian"),
    ("washingtonpost", "The Washington Post"),
    ("economist", "The Economist"),
    ("forbes", "Forbes"),
    ("businessinsider", "Business Insider"),
    ("techcrunch", "TechCrunch"),
    ("wired", "Wired"),
    ("vox", "Vox"),
    ("politico", "Politico"),
    ("axios", "Axios"),
    ("theatlantic", "The Atlantic"),
    ("newyorker", "The New Yorker"),
    ("buzzfeed", "BuzzFeed"),
    ("huffpost", "HuffPost"),
    ("slate", "Slate"),
    ("salon", "Salon"),
    ("thedailybeast", "The Daily Beast"),
    ("thehill", "The Hill"),
    ("motherjones", "Mother Jones"),
    ("theintercept", "The Intercept"),
    ("propublica", "ProPublica"),
    ("apnews", "Associated Press"),
    ("npr", "NPR"),
    ("cbsnews", "CBS News"),
    ("nbcnews", "NBC News"),
    ("abcnews", "ABC News"),
    ("foxnews", "Fox News"),
    ("usatoday", "USA Today"),
    ("latimes", "Los Angeles Times"),
    ("chicagotribune", "Chicago Tribune"),
    ("bostonglobe", "The Boston Globe"),
    ("seattletimes", "The Seattle Times"),
    ("denverpost", "The Denver Post"),
    ("miamiherald", "Miami Herald"),
    ("startribune", "Star Tribune"),
    ("dallasnews", "The Dallas Morning News"),
    ("sfchronicle", "San Francisco Chronicle"),
    ("newsweek", "Newsweek"),
    ("time", "TIME"),
    ("fortune", "Fortune"),
    ("cnbc", "CNBC"),
    ("marketwatch", "MarketWatch"),
    ("barrons", "Barron's"),
    ("investopedia", "Investopedia"),
    ("morningstar", "Morningstar"),
    ("seekingalpha", "Seeking Alpha"),
    ("benzinga", "Benzinga"),
    ("thestreet", "TheStreet"),
    ("telegraph", "The Telegraph"),
    ("thetimes", "The Times"),
    ("independent", "The Independent"),
    ("dailymail", "Daily Mail"),
    ("cityam", "City A.M."),
    ("standard", "Evening Standard"),
];

/// Maps article URLs to human-readable publication names.
#[derive(Debug, Clone, Default)]
pub struct PublicationResolver {
    domains: HashMap<String, String>,
}

impl PublicationResolver {
    /// A resolver with only the built-in first-label table.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domains<I, K, V>(domains: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let domains = domains
            .into_iter()
            .map(|(k, v)| (k.as_ref().trim().to_lowercase(), v.into()))
            .collect();
        Self { domains }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let domains: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self::with_domains(domains))
    }

    /// Loads the domain map from `path`. A missing or malformed file leaves
    /// only the built-in table in place.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let loaded = std::fs::read_to_string(path)
            .map_err(Error::from)
            .and_then(|json| Self::from_json_str(&json));

        match loaded {
            Ok(resolver) => {
                info!("📚 Loaded {} publication mappings from {}", resolver.len(), path.display());
                resolver
            }
            Err(e) => {
                warn!(
                    "Publication map {} unavailable ({}); using built-in names only",
                    path.display(),
                    e
                );
                Self::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Best-effort display name for the publication behind `url`.
    /// Returns an empty string when no host can be read from it.
    pub fn resolve(&self, url: &str) -> String {
        let host = match Url::parse(url.trim()).ok().and_then(|u| u.host_str().map(str::to_lowercase)) {
            Some(host) if !host.is_empty() => host,
            _ => {
                debug!("No host in {:?}; cannot resolve publication", url);
                return String::new();
            }
        };

        if let Some(name) = self.lookup_host(&host) {
            return name;
        }

        let cleaned = strip_known_prefixes(&host);
        let first_label = cleaned.split('.').next().unwrap_or(cleaned.as_str());

        KNOWN_PUBLICATIONS
            .iter()
            .find(|(label, _)| *label == first_label)
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|| title_case(first_label))
    }

    fn lookup_host(&self, host: &str) -> Option<String> {
        if let Some(name) = self.domains.get(host) {
            return Some(name.clone());
        }

        let bare = host.strip_prefix("www.").unwrap_or(host);
        if let Some(name) = self.domains.get(bare) {
            return Some(name.clone());
        }
        if let Some(name) = self.domains.get(&format!("www.{}", bare)) {
            return Some(name.clone());
        }

        let mut current = host;
        while let Some(stripped) = STRIP_PREFIXES.iter().find_map(|p| current.strip_prefix(p)) {
            current = stripped;
            if let Some(name) = self.domains.get(current) {
                return Some(name.clone());
            }
        }
        None
    }
}

fn strip_known_prefixes(host: &str) -> String {
    let mut current = host;
    while let Some(stripped) = STRIP_PREFIXES.iter().find_map(|p| current.strip_prefix(p)) {
        // never strip the registrable name itself, e.g. "news.com"
        if !stripped.contains('.') {
            break;
        }
        current = stripped;
    }
    current.to_string()
}

fn title_case(label: &str) -> String {
    label
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PublicationResolver {
        PublicationResolver::with_domains([
            ("theguardian.com", "The Guardian"),
            ("www.ft.com", "Financial Times"),
            ("bbc.co.uk", "BBC"),
            ("lemonde.fr", "Le Monde"),
        ])
    }

    #[test]
    fn test_mapped_domains_with_and_without_www() {
        let r = resolver();
        assert_eq!(r.resolve("https://www.theguardian.com/world/2024/a"), "The Guardian");
        assert_eq!(r.resolve("https://theguardian.com/world"), "The Guardian");
        assert_eq!(r.resolve("https://ft.com/content/x"), "Financial Times");
        assert_eq!(r.resolve("https://www.ft.com/content/x"), "Financial Times");
    }

    #[test]
    fn test_known_prefixes_are_stripped() {
        let r = resolver();
        assert_eq!(r.resolve("https://news.bbc.co.uk/1/hi"), "BBC");
        assert_eq!(r.resolve("https://amp.www.lemonde.fr/article"), "Le Monde");
        assert_eq!(r.resolve("https://mobile.lemonde.fr/article"), "Le Monde");
    }

    #[test]
    fn test_built_in_table_fallback() {
        let r = PublicationResolver::new();
        assert_eq!(r.resolve("https://edition.cnn.com/2024/politics"), "CNN");
        assert_eq!(r.resolve("https://www.nytimes.com/2024/01/01/x.html"), "The New York Times");
        assert_eq!(r.resolve("https://amp.theguardian.com/uk"), "The Guardian");
    }

    #[test]
    fn test_unmapped_domain_is_title_cased() {
        let r = PublicationResolver::new();
        assert_eq!(r.resolve("https://foo-bar.com/story"), "Foo Bar");
        assert_eq!(r.resolve("https://www.my_local_paper.org/x"), "My Local Paper");
    }

    #[test]
    fn test_unparseable_url_yields_empty_name() {
        let r = resolver();
        assert_eq!(r.resolve("not a url"), "");
        assert_eq!(r.resolve(""), "");
    }

    #[test]
    fn test_json_loading() {
        let r = PublicationResolver::from_json_str(r#"{"Example.COM": "Example Times"}"#).unwrap();
        assert_eq!(r.resolve("https://www.example.com/a"), "Example Times");
        assert!(PublicationResolver::from_json_str("[1, 2]").is_err());
    }

    #[test]
    fn test_missing_file_degrades_to_built_in_table() {
        let r = PublicationResolver::load("/nonexistent/publications.json");
        assert!(r.is_empty());
        assert_eq!(r.resolve("https://www.wsj.com/articles/x"), "The Wall Street Journal");
    }
}
