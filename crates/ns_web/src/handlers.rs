use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ns_core::mentions::mention_summary;
use ns_core::{
    count_mentions, CompletionErrorKind, Error, FormContext, LanguageInfo, SummaryForm, TextStats, TypeDetection,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::AppState;

/// An error rendered as `{"error": <user message>}` with a matching status.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

fn completion_status(kind: CompletionErrorKind) -> StatusCode {
    match kind {
        CompletionErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        CompletionErrorKind::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Completion(e) => completion_status(e.kind),
            Error::Classification(msg) => completion_status(CompletionErrorKind::sniff(msg)),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct UrlBody {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct MentionsBody {
    pub text: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct MentionsReply {
    pub count: usize,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SummariseBody {
    #[serde(flatten)]
    pub form: SummaryForm,
    #[serde(default)]
    pub detected_type: Option<TypeDetection>,
    #[serde(default)]
    pub detected_language: Option<LanguageInfo>,
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "model": state.orchestrator.service_name(),
    }))
}

pub async fn scrape(State(state): State<Arc<AppState>>, Json(body): Json<UrlBody>) -> impl IntoResponse {
    Json(state.orchestrator.scrape(&body.url).await)
}

pub async fn detect_language(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TextBody>,
) -> impl IntoResponse {
    Json(state.orchestrator.detect_language(&body.text).await)
}

pub async fn detect_type(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TextBody>,
) -> ApiResult<TypeDetection> {
    Ok(Json(state.orchestrator.detect_type(&body.text).await?))
}

pub async fn mentions(Json(body): Json<MentionsBody>) -> ApiResult<MentionsReply> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(Error::Validation("Please provide a client name".to_string()).into());
    }
    let count = count_mentions(&body.text, name);
    let message = if count == 0 {
        format!("✗ '{}' was not found in the article text", name)
    } else {
        mention_summary(name, count)
    };
    Ok(Json(MentionsReply { count, message }))
}

pub async fn text_stats(Json(body): Json<TextBody>) -> impl IntoResponse {
    let stats = TextStats::of(&body.text);
    Json(json!({
        "characters": stats.characters,
        "words": stats.words,
        "caption": stats.caption(),
    }))
}

pub async fn summarise(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SummariseBody>,
) -> ApiResult<ns_inference::SummaryOutcome> {
    let mut ctx = FormContext::with_form(body.form);
    ctx.detected_type = body.detected_type;
    ctx.detected_language = body.detected_language;

    let outcome = state.orchestrator.summarise_form(&mut ctx).await?;
    Ok(Json(outcome))
}
