//! Video generation orchestration: cache lookup, provider call, job creation,
//! and the fallback path.

use serde::Serialize;
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::prompt::{JobOrigin, Style, build_prompt, cache_key_for, derived_job_id};
use crate::provider::{GenerationPayload, ProviderError};
use crate::state::AppState;
use crate::store::jobs::{NOTE_CACHE, NOTE_RATE_LIMITED};
use crate::store::{JobRecord, VideoResult};

/// Client inputs for one generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Raw style key as sent by the client; unknown keys use the default style.
    pub style: String,
    /// Client playback length in seconds. Only affects the cache key.
    pub duration: i64,
    pub language: String,
    /// Background music hint. Accepted but not forwarded.
    pub bg_music: String,
}

/// Where a queued job's result comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Source {
    Cache,
    Provider,
    Mock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Queued { job_id: String, source: Source },
    /// The provider refused the call; the client should retry later.
    RateLimited { job_id: String },
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("BACKEND_BASE_URL not set for webhook")]
    Configuration,
    #[error(transparent)]
    Provider(ProviderError),
}

/// Run one generation request end to end.
///
/// Creates exactly one job record per call. Only the fallback path writes to
/// the cache.
pub async fn submit(
    state: &AppState,
    request: GenerateRequest,
) -> Result<Submission, GenerateError> {
    let settings = &state.settings;
    let style = Style::from_key(&request.style);
    let final_prompt = build_prompt(&request.prompt, style);
    let key = cache_key_for(&final_prompt, &request.style, request.duration);

    if let Some(cached) = state.cache.get(&key) {
        let job_id = derived_job_id(JobOrigin::Cache, &key);
        let url = match cached {
            VideoResult::Ready(url) => Some(url),
            VideoResult::Placeholder => settings.mock_video_url.clone(),
        };
        state
            .jobs
            .insert(job_id.clone(), JobRecord::complete(url, NOTE_CACHE));
        info!(job_id = %job_id, style = %style, "generation served from cache");
        return Ok(Submission::Queued {
            job_id,
            source: Source::Cache,
        });
    }
    debug!(key = %key, "generation cache miss");

    if settings.backend_base_url.is_none() && !settings.use_mock_on_fail {
        return Err(GenerateError::Configuration);
    }

    if !request.bg_music.is_empty() {
        debug!(bg_music = %request.bg_music, "background music hint is not forwarded");
    }

    let payload = GenerationPayload::new(
        final_prompt,
        request.language,
        style,
        settings.provider_duration.clone(),
    );

    match state.provider.generate(&payload).await {
        Ok(vid) => {
            state.jobs.insert(vid.clone(), JobRecord::queued());
            info!(job_id = %vid, style = %style, "generation queued with provider");
            Ok(Submission::Queued {
                job_id: vid,
                source: Source::Provider,
            })
        }
        Err(ProviderError::RateLimited) => {
            let job_id = derived_job_id(JobOrigin::Rate, &key);
            state
                .jobs
                .insert(job_id.clone(), JobRecord::failed(NOTE_RATE_LIMITED));
            warn!(job_id = %job_id, "provider rate limited generation");
            Ok(Submission::RateLimited { job_id })
        }
        Err(e) if settings.use_mock_on_fail => {
            let job_id = derived_job_id(JobOrigin::Mock, &key);
            warn!(job_id = %job_id, error = %e, "provider call failed, using fallback");
            state.jobs.insert(
                job_id.clone(),
                JobRecord::complete(settings.mock_video_url.clone(), format!("fallback: {e}")),
            );
            state.cache.set(key, VideoResult::Placeholder);
            Ok(Submission::Queued {
                job_id,
                source: Source::Mock,
            })
        }
        Err(e) => Err(GenerateError::Provider(e)),
    }
}
