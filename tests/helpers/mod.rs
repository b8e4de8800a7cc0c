//! Shared fixtures for router-level tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use vidgen::provider::{GenerationPayload, ProviderError, VideoProvider};
use vidgen::state::{AppState, GenerationSettings};
use vidgen::store::VideoCache;
use vidgen::web::create_router;

/// How the fake provider answers every call.
#[derive(Debug, Clone)]
pub enum Reply {
    Accept(&'static str),
    RateLimited,
    Unavailable,
}

/// Provider double that records every payload it receives.
pub struct RecordingProvider {
    reply: Reply,
    calls: Mutex<Vec<GenerationPayload>>,
}

impl RecordingProvider {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<GenerationPayload> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl VideoProvider for RecordingProvider {
    async fn generate(&self, payload: &GenerationPayload) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(payload.clone());
        match self.reply {
            Reply::Accept(vid) => Ok(vid.to_string()),
            Reply::RateLimited => Err(ProviderError::RateLimited),
            Reply::Unavailable => Err(ProviderError::Status {
                status: 503,
                body: "upstream unavailable".to_string(),
            }),
        }
    }
}

pub fn settings() -> GenerationSettings {
    GenerationSettings {
        backend_base_url: Some("https://backend.example.com".to_string()),
        ..GenerationSettings::default()
    }
}

pub fn make_state(provider: Arc<dyn VideoProvider>, settings: GenerationSettings) -> AppState {
    AppState::new(
        settings,
        VideoCache::new(Duration::from_secs(3600), 256),
        provider,
    )
}

pub fn router(state: &AppState) -> Router {
    create_router(state.clone(), Duration::from_secs(5))
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // Extractor rejections are plain text; keep them readable in assertion output.
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

pub async fn post_form(router: &Router, path: &str, form: &str) -> (StatusCode, Value) {
    let request = Request::post(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    send(router, request).await
}

pub async fn post_json(router: &Router, path: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::post(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

pub async fn job_status(router: &Router, job_id: &str) -> Value {
    let (status, body) = get(router, &format!("/job-status?job_id={job_id}")).await;
    assert_eq!(status, StatusCode::OK);
    body
}
