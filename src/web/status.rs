//! Health and job status handlers.

use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::trace;
use ts_rs::TS;

use crate::state::AppState;
use crate::store::{JobRecord, JobStatus};

#[derive(Debug, Deserialize)]
pub struct JobStatusParams {
    pub job_id: String,
}

/// Job projection returned to polling clients.
///
/// Unknown ids serialize as just `{"status": "unknown"}`; known ids always
/// carry `video_url` and `note`, null when unset.
#[derive(Debug, Serialize, PartialEq, Eq, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum JobStatusResponse {
    Unknown {
        status: JobStatus,
    },
    Known {
        status: JobStatus,
        video_url: Option<String>,
        note: Option<String>,
    },
}

impl From<Option<JobRecord>> for JobStatusResponse {
    fn from(record: Option<JobRecord>) -> Self {
        match record {
            None => JobStatusResponse::Unknown {
                status: JobStatus::Unknown,
            },
            Some(record) => JobStatusResponse::Known {
                status: record.status,
                video_url: record.url,
                note: record.note,
            },
        }
    }
}

/// Health check endpoint
pub(super) async fn health() -> Json<Value> {
    trace!("health check requested");
    Json(json!({ "status": "ok" }))
}

/// `GET /job-status?job_id=...`
pub(super) async fn job_status(
    State(state): State<AppState>,
    Query(params): Query<JobStatusParams>,
) -> Json<JobStatusResponse> {
    Json(state.jobs.get(&params.job_id).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_job_has_no_url_or_note_keys() {
        let body = serde_json::to_value(JobStatusResponse::from(None)).unwrap();
        assert_eq!(body, json!({ "status": "unknown" }));
    }

    #[test]
    fn known_job_serializes_nulls() {
        let body = serde_json::to_value(JobStatusResponse::from(Some(JobRecord::queued()))).unwrap();
        assert_eq!(
            body,
            json!({ "status": "queued", "video_url": null, "note": null })
        );
    }
}
