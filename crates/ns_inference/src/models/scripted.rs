use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use ns_core::{CompletionError, CompletionErrorKind, CompletionRequest, CompletionService, Result};

/// Replays canned replies in order and records every request it receives.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<std::result::Result<String, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl fmt::Debug for ScriptedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedModel")
            .field("calls", &self.call_count())
            .finish()
    }
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()))
    }

    pub fn fail(self, error: CompletionError) -> Self {
        self.push(Err(error))
    }

    fn push(self, reply: std::result::Result<String, CompletionError>) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionService for ScriptedModel {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let next = self.replies.lock().ok().and_then(|mut replies| replies.pop_front());
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(e)) => Err(e.into()),
            None => Err(CompletionError::new(CompletionErrorKind::Other, "no scripted reply left").into()),
        }
    }
}
