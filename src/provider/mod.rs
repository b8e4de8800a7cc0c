//! Outbound video-generation provider: payload, error taxonomy, and the
//! [`VideoProvider`] seam the generate endpoint talks to.

pub mod json;
pub mod middleware;
pub mod vadoo;

use async_trait::async_trait;
use serde::Serialize;

use crate::prompt::Style;

pub use vadoo::VadooClient;

/// JSON body posted to the provider's generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationPayload {
    pub topic: &'static str,
    pub prompt: String,
    pub language: String,
    pub voice: &'static str,
    pub theme: &'static str,
    pub style: &'static str,
    pub aspect_ratio: &'static str,
    /// Provider-side duration range, unrelated to the client's playback length.
    pub duration: String,
    pub use_ai: &'static str,
    pub include_voiceover: &'static str,
}

impl GenerationPayload {
    pub fn new(
        final_prompt: String,
        language: String,
        style: Style,
        provider_duration: String,
    ) -> Self {
        let params = style.provider_params();
        Self {
            topic: "Custom",
            prompt: final_prompt,
            language,
            voice: params.voice,
            theme: params.theme,
            style: params.style,
            aspect_ratio: params.aspect_ratio,
            duration: provider_duration,
            use_ai: "1",
            include_voiceover: "1",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider rate limit exceeded")]
    RateLimited,
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),
    #[error("failed to read provider response: {0}")]
    Body(#[from] reqwest::Error),
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse provider response (HTTP {status}): {source}")]
    Parse {
        status: u16,
        #[source]
        source: anyhow::Error,
    },
    #[error("no 'vid' in provider response")]
    MissingVideoId,
}

/// Something that can start a video generation and hand back its id.
///
/// Completion is reported later through the provider webhook, not here.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    async fn generate(&self, payload: &GenerationPayload) -> Result<String, ProviderError>;
}
