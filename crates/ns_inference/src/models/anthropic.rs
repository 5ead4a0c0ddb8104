use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use ns_core::{
    CompletionError, CompletionErrorKind, CompletionRequest, CompletionService, Error, ModelTier, Result,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Config;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Client for the Anthropic Messages API.
pub struct AnthropicModel {
    client: Client,
    api_key: String,
    base_url: String,
    summary_model: String,
    fast_model: String,
}

impl fmt::Debug for AnthropicModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("summary_model", &self.summary_model)
            .field("fast_model", &self.fast_model)
            .finish()
    }
}

impl AnthropicModel {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            Error::Config(
                "ANTHROPIC_API_KEY not found. Set it in the environment or in ~/.config/news-summariser/.env"
                    .to_string(),
            )
        })?;

        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            summary_model: config.summary_model.clone(),
            fast_model: config.fast_model.clone(),
        })
    }

    /// Issues a minimal request so a bad key is reported up front.
    pub async fn validate_key(&self) -> Result<()> {
        self.complete(&CompletionRequest::new("Test", 10)).await.map(|_| ())
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Primary => &self.summary_model,
            ModelTier::Fast => &self.fast_model,
        }
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest) -> MessagesRequest<'a> {
        MessagesRequest {
            model: self.model_for(request.tier),
            max_tokens: request.max_output_tokens,
            system: request.system_prompt.as_deref(),
            messages: vec![Message {
                role: "user",
                content: &request.user_prompt,
            }],
        }
    }
}

/// The first text block of a reply; any other shape yields an empty string.
fn first_text(response: MessagesResponse) -> String {
    match response
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
    {
        Some(text) => text,
        None => {
            warn!("Completion reply carried no text block");
            String::new()
        }
    }
}

fn status_error(status: u16, body: &str) -> CompletionError {
    let kind = match CompletionErrorKind::from_status(status) {
        CompletionErrorKind::Other => CompletionErrorKind::sniff(body),
        kind => kind,
    };
    CompletionError::new(kind, format!("{} {}", status, body.trim()))
}

fn transport_error(e: reqwest::Error) -> CompletionError {
    if e.is_connect() || e.is_timeout() || e.is_request() {
        CompletionError::new(CompletionErrorKind::Network, format!("network error: {}", e))
    } else {
        CompletionError::from_message(e.to_string())
    }
}

#[async_trait]
impl CompletionService for AnthropicModel {
    fn name(&self) -> &str {
        "Anthropic"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = self.body(request);
        debug!(model = body.model, max_tokens = body.max_tokens, "Sending completion request");

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(status_error(status.as_u16(), &text).into());
        }

        let parsed = response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| CompletionError::new(CompletionErrorKind::Other, format!("unreadable reply: {}", e)))?;

        Ok(first_text(parsed))
    }
}
