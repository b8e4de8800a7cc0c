//! Web API router construction.

use axum::{
    Router,
    routing::{get, post},
};
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};

use crate::state::AppState;
use crate::web::middleware::request_id::RequestIdLayer;
use crate::web::{generate, status, webhook};

/// Headroom over the provider timeout so a slow provider call still gets its fallback response out.
const RESPONSE_HEADROOM: Duration = Duration::from_secs(30);

/// Creates the web server router.
///
/// `provider_timeout` bounds the outbound call; the request timeout sits above it.
pub fn create_router(app_state: AppState, provider_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(status::health))
        .route("/generate-video", post(generate::generate_video))
        .route("/webhook/vadoo", post(webhook::vadoo_webhook))
        .route("/job-status", get(status::job_status))
        .with_state(app_state)
        .layer((
            // Outermost: per-request ID span + severity-proportional response logging.
            RequestIdLayer,
            // The browser client is served from another origin.
            CorsLayer::permissive(),
            TimeoutLayer::new(response_timeout(provider_timeout)),
        ))
}

fn response_timeout(provider_timeout: Duration) -> Duration {
    provider_timeout.saturating_add(RESPONSE_HEADROOM)
}
