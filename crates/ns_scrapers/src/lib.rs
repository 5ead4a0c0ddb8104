pub mod cli;
pub mod extractor;
pub mod fetch;
pub mod logging;
pub mod paywall;
pub mod publication;
pub mod scrapers;

pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use extractor::ContentExtractor;
pub use fetch::HttpFetcher;
pub use publication::PublicationResolver;
pub use scrapers::{ExtractionStrategy, RawArticle};

pub mod prelude {
    pub use super::extractor::ContentExtractor;
    pub use super::publication::PublicationResolver;
    pub use super::scrapers::ExtractionStrategy;
    pub use ns_core::{Error, ExtractionResult, Result};
}
