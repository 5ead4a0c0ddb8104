use std::fmt;

use async_trait::async_trait;
use ns_core::{CompletionRequest, CompletionService, ModelTier, Result};

use crate::prompt::NO_ROLE;

/// Offline backend for demos: answers every auxiliary question with a
/// neutral reply and "summarises" by echoing the opening the prompt asks for
/// followed by the first words of the article.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }

    fn auxiliary_reply(prompt: &str) -> String {
        if prompt.contains(NO_ROLE) {
            NO_ROLE.to_string()
        } else if prompt.contains("primary language") {
            "English".to_string()
        } else {
            "news (offline dummy model)".to_string()
        }
    }

    fn summary_reply(prompt: &str) -> String {
        let article = prompt
            .rsplit_once("Article:")
            .map(|(_, article)| article)
            .unwrap_or(prompt);
        let words: Vec<&str> = article.split_whitespace().take(20).collect();

        match required_opening(prompt) {
            Some(opening) => format!("{} {}", opening, words.join(" ")),
            None => words.join(" "),
        }
    }
}

/// The quoted phrase after "begin with", if the prompt has one.
fn required_opening(prompt: &str) -> Option<&str> {
    let start = ["begin with '", "Begin with '"]
        .iter()
        .find_map(|marker| prompt.find(marker).map(|i| i + marker.len()))?;
    let end = prompt[start..].find('\'')?;
    Some(&prompt[start..start + end])
}

#[async_trait]
impl CompletionService for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        Ok(match request.tier {
            ModelTier::Fast => Self::auxiliary_reply(&request.user_prompt),
            ModelTier::Primary => Self::summary_reply(&request.user_prompt),
        })
    }
}
