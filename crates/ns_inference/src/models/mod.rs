use std::sync::Arc;

use ns_core::{CompletionService, Result};
use tracing::info;

use crate::{Backend, Config};

pub mod anthropic;
pub mod dummy;
#[cfg(any(test, feature = "test-utils"))]
pub mod scripted;

pub use anthropic::AnthropicModel;
pub use dummy::DummyModel;
#[cfg(any(test, feature = "test-utils"))]
pub use scripted::ScriptedModel;

/// Builds the configured backend, validating the API key first when asked to.
pub async fn create_model(config: &Config) -> Result<Arc<dyn CompletionService>> {
    match config.backend {
        Backend::Anthropic => {
            let model = AnthropicModel::new(config)?;
            if config.validate_key {
                model.validate_key().await?;
                info!("API key validated against {}", config.api_base_url);
            }
            Ok(Arc::new(model))
        }
        Backend::Dummy => {
            info!("Using the offline dummy model");
            Ok(Arc::new(DummyModel::new()))
        }
    }
}
