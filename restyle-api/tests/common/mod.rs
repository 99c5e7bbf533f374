#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use restyle_api::build_app_router;
use restyle_app::infrastructure::gemini::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerativeModel, Part,
};
use restyle_app::infrastructure::memory::InMemoryVoteStore;
use restyle_app::{AppConfig, AppContext};
use restyle_errors::AppError;

pub const PNG_BASE64: &str = "iVBORw0KGgo=";
pub const GENERATED_BASE64: &str = "R0lGODlhAQABAAAAACw=";

/// Generative model double with a fixed answer and a call counter.
pub struct StubModel {
    pub response: GenerateContentResponse,
    pub calls: AtomicUsize,
}

impl StubModel {
    pub fn answering(parts: Vec<Part>, finish_reason: &str) -> Arc<Self> {
        Arc::new(Self {
            response: GenerateContentResponse {
                candidates: vec![Candidate {
                    content: Some(Content { role: None, parts }),
                    finish_reason: Some(finish_reason.to_string()),
                }],
                prompt_feedback: None,
            },
            calls: AtomicUsize::new(0),
        })
    }

    pub fn image() -> Arc<Self> {
        Self::answering(vec![Part::inline("image/png", GENERATED_BASE64)], "STOP")
    }

    pub fn text(text: &str) -> Arc<Self> {
        Self::answering(vec![Part::text(text)], "STOP")
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeModel for StubModel {
    async fn generate_content(
        &self,
        _model: &str,
        _request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        allowed_origins: vec!["https://restyle.example".to_string()],
        admin_token: Some("admin-secret".to_string()),
        ..AppConfig::development()
    }
}

pub fn build_test_app(model: Option<Arc<StubModel>>) -> Router {
    build_test_app_with(test_config(), model)
}

pub fn build_test_app_with(config: AppConfig, model: Option<Arc<StubModel>>) -> Router {
    let model = model.map(|m| m as Arc<dyn GenerativeModel>);
    let ctx = AppContext::new(config, Arc::new(InMemoryVoteStore::new()), model);
    build_app_router(ctx)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn voter_request(method: &str, uri: &str, browser_id: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-browser-id", browser_id);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Sends one request through a clone of `app` and returns status, headers
/// and the JSON body (`Null` when empty).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, json)
}
