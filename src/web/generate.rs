//! `POST /generate-video` handler.

use axum::Form;
use axum::extract::State;
use axum::response::Json;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::generation::{self, GenerateRequest, Source, Submission};
use crate::prompt::Style;
use crate::state::AppState;
use crate::web::error::ApiError;

const DEFAULT_DURATION: i64 = 8;
const DEFAULT_LANGUAGE: &str = "English";

/// Form fields accepted by the generate endpoint.
///
/// Browsers submit empty inputs as `field=`, so a blank value counts as
/// absent and falls back to the same default.
#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    pub prompt: String,
    #[serde(default, deserialize_with = "non_blank")]
    pub style: Option<String>,
    /// Client playback seconds (typically 5-10).
    #[serde(default, deserialize_with = "non_blank")]
    pub duration: Option<i64>,
    #[serde(default, deserialize_with = "non_blank")]
    pub language: Option<String>,
    #[serde(default)]
    pub bg_music: String,
}

/// `None` for a missing or whitespace-only field, otherwise the parsed value.
fn non_blank<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid value '{raw}': {e}"))),
        _ => Ok(None),
    }
}

impl From<GenerateForm> for GenerateRequest {
    fn from(form: GenerateForm) -> Self {
        Self {
            prompt: form.prompt,
            style: form.style.unwrap_or_else(|| Style::DEFAULT_KEY.to_string()),
            duration: form.duration.unwrap_or(DEFAULT_DURATION),
            language: form.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            bg_music: form.bg_music,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum GenerateStatus {
    Queued,
    RateLimited,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct GenerateResponse {
    pub status: GenerateStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub source: Option<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub message: Option<String>,
}

impl From<Submission> for GenerateResponse {
    fn from(submission: Submission) -> Self {
        match submission {
            Submission::Queued { job_id, source } => Self {
                status: GenerateStatus::Queued,
                job_id: Some(job_id),
                source: Some(source),
                message: None,
            },
            // The local rate-limit record is kept for operators; clients just retry.
            Submission::RateLimited { .. } => Self {
                status: GenerateStatus::RateLimited,
                job_id: None,
                source: None,
                message: Some("Provider rate limit. Please retry.".to_string()),
            },
        }
    }
}

/// `POST /generate-video` (form-encoded)
pub(super) async fn generate_video(
    State(state): State<AppState>,
    Form(form): Form<GenerateForm>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let submission = generation::submit(&state, form.into()).await?;
    Ok(Json(submission.into()))
}
