//! Provider completion webhook.
//!
//! The provider posts JSON like `{"vid": "...", "status": "complete", "url": "https://..."}`.
//! Some deliveries use `id` instead of `vid`. The body is parsed by hand so a
//! malformed payload yields our own 400 body instead of the extractor's.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};
use ts_rs::TS;

use crate::state::AppState;
use crate::store::ProviderUpdate;
use crate::web::error::ApiError;

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct WebhookAck {
    pub ok: bool,
}

/// A job id from `vid` (preferred) or `id`. Strings must be non-empty; numbers are stringified.
fn job_id_of(body: &Value) -> Option<String> {
    ["vid", "id"].into_iter().find_map(|field| match body.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// The raw status as text. Non-string scalars are rendered, so `42` stays `"42"`.
fn status_of(body: &Value) -> String {
    match body.get("status") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `POST /webhook/vadoo`
pub(super) async fn vadoo_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let data: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "webhook body is not valid JSON");
        ApiError::invalid_json("Invalid JSON")
            .with_details(json!({ "line": e.line(), "column": e.column() }))
    })?;

    let Some(job_id) = job_id_of(&data) else {
        warn!("webhook without a job id");
        return Err(ApiError::missing_job_id());
    };

    let status = status_of(&data);
    let url = data.get("url").and_then(Value::as_str);
    let update = ProviderUpdate::classify(&status, url);

    let outcome =
        state
            .jobs
            .apply_update(&job_id, update, state.settings.webhook_keep_complete);

    if outcome.late_registered {
        info!(job_id = %job_id, "webhook registered previously unknown job");
    }
    if outcome.ignored {
        warn!(job_id = %job_id, status = %status, "webhook ignored for completed job");
    } else {
        info!(job_id = %job_id, status = ?outcome.record.status, "webhook applied");
    }

    Ok(Json(WebhookAck { ok: true }))
}
