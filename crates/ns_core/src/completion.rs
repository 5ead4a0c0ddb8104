use std::fmt;

use async_trait::async_trait;

use crate::types::CompletionRequest;
use crate::Result;

/// A hosted text-completion backend.
///
/// Implementations hold no per-request state and can be reused serially.
/// Provider failures are reported as [`crate::Error::Completion`] so callers
/// can tailor the message to the failure category.
#[async_trait]
pub trait CompletionService: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
