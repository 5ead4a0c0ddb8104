use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use ns_core::Result;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/scrape", post(handlers::scrape))
        .route("/api/detect-language", post(handlers::detect_language))
        .route("/api/detect-type", post(handlers::detect_type))
        .route("/api/mentions", post(handlers::mentions))
        .route("/api/text-stats", post(handlers::text_stats))
        .route("/api/summarise", post(handlers::summarise))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚀 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::AppState;
    pub use ns_core::{Error, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use ns_core::{CompletionError, CompletionErrorKind, ExtractionMethod};
    use ns_inference::language::LanguageDetector;
    use ns_inference::models::ScriptedModel;
    use ns_inference::SummaryOrchestrator;
    use ns_scrapers::{ContentExtractor, ExtractionStrategy, PublicationResolver, RawArticle};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct NoPage(ExtractionMethod);

    #[async_trait]
    impl ExtractionStrategy for NoPage {
        fn name(&self) -> &str {
            "none"
        }

        fn method(&self) -> ExtractionMethod {
            self.0
        }

        async fn extract(&self, _url: &str) -> Result<Option<RawArticle>> {
            Ok(None)
        }
    }

    fn app(service: ScriptedModel) -> Router {
        let service = Arc::new(service);
        let extractor = ContentExtractor::with_strategies(
            Arc::new(PublicationResolver::new()),
            Box::new(NoPage(ExtractionMethod::Primary)),
            Box::new(NoPage(ExtractionMethod::Secondary)),
        );
        let orchestrator = SummaryOrchestrator::new(service.clone(), extractor)
            .with_language_detector(LanguageDetector::with_identifier(service, None));
        create_app(AppState::new(orchestrator))
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(ScriptedModel::new());
        let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_summarise() {
        let app = app(ScriptedModel::new().reply("The Guardian reports that rates rose."));
        let (status, body) = post_json(
            app,
            "/api/summarise",
            json!({
                "publication": "The Guardian",
                "article_text": "Rates rose on Thursday.",
                "article_type": "news",
                "detected_language": {"language": "English", "is_english": true, "method": "default"}
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "The Guardian reports that rates rose.");
        assert_eq!(body["clean_summary"], "Rates rose.");
    }

    #[tokio::test]
    async fn test_validation_errors_are_bad_requests() {
        let app = app(ScriptedModel::new());
        let (status, body) = post_json(
            app,
            "/api/summarise",
            json!({"publication": "Wired", "article_text": "Text", "article_type": "op-ed"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please provide the author name");
    }

    #[tokio::test]
    async fn test_completion_errors_map_to_status() {
        let app = app(
            ScriptedModel::new().fail(CompletionError::new(CompletionErrorKind::RateLimited, "429 rate_limit_error")),
        );
        let (status, body) = post_json(app, "/api/detect-type", json!({"text": "Rates rose."})).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body["error"].as_str().unwrap().contains("Rate limit exceeded"));
    }

    #[tokio::test]
    async fn test_scrape_failure_is_a_value() {
        let app = app(ScriptedModel::new());
        let (status, body) = post_json(app, "/api/scrape", json!({"url": "ftp://example.com"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["success"], false);
        assert!(body["language"].is_null());
    }

    #[tokio::test]
    async fn test_mentions() {
        let app = app(ScriptedModel::new());
        let (status, body) = post_json(
            app,
            "/api/mentions",
            json!({"text": "Acme makes widgets. Acme's factory is large.", "name": "Acme"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
    }
}
