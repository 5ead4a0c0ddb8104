pub mod completion;
pub mod error;
pub mod form;
pub mod mentions;
pub mod types;

pub use completion::CompletionService;
pub use error::{CompletionError, CompletionErrorKind, Error, Result};
pub use form::{FormContext, SummaryForm, TextStats};
pub use mentions::count_mentions;
pub use types::{
    ArticleType, CompletionRequest, DetectionMethod, ExtractionMethod, ExtractionResult,
    LanguageInfo, ModelTier, SummaryRequest, TypeDetection, DEFAULT_SENTENCES,
};
