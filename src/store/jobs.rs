//! Process-lifetime job table: job id → status, result URL, and operator note.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use ts_rs::TS;

pub const NOTE_LATE_REGISTER: &str = "late_register";
pub const NOTE_CACHE: &str = "cache";
pub const NOTE_RATE_LIMITED: &str = "rate_limited";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum JobStatus {
    Queued,
    Processing,
    Complete,
    Error,
    /// Reported for ids the store has never seen; never stored.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub status: JobStatus,
    pub url: Option<String>,
    /// Free-form diagnostic text for operators.
    pub note: Option<String>,
}

impl JobRecord {
    pub fn queued() -> Self {
        Self {
            status: JobStatus::Queued,
            url: None,
            note: None,
        }
    }

    pub fn complete(url: Option<String>, note: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Complete,
            url,
            note: Some(note.into()),
        }
    }

    pub fn failed(note: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Error,
            url: None,
            note: Some(note.into()),
        }
    }

    fn late_registration() -> Self {
        Self {
            status: JobStatus::Processing,
            url: None,
            note: Some(NOTE_LATE_REGISTER.to_owned()),
        }
    }
}

/// A provider progress notice, already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderUpdate {
    Complete { url: String },
    InProgress,
    Failed { raw_status: String },
}

impl ProviderUpdate {
    /// Classify a raw webhook status. `complete` without a usable URL counts as a failure.
    pub fn classify(status: &str, url: Option<&str>) -> Self {
        let status = status.to_lowercase();
        match (status.as_str(), url) {
            ("complete", Some(url)) if !url.is_empty() => ProviderUpdate::Complete {
                url: url.to_owned(),
            },
            ("queued" | "processing" | "running", _) => ProviderUpdate::InProgress,
            _ => ProviderUpdate::Failed { raw_status: status },
        }
    }
}

/// What [`JobStore::apply_update`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// The id was unknown and a late registration record was created first.
    pub late_registered: bool,
    /// The update was dropped because the job is already complete.
    pub ignored: bool,
    pub record: JobRecord,
}

/// Shared job table. Clone-cheap.
#[derive(Debug, Clone, Default)]
pub struct JobStore {
    inner: Arc<DashMap<String, JobRecord>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a job record.
    pub fn insert(&self, job_id: impl Into<String>, record: JobRecord) {
        self.inner.insert(job_id.into(), record);
    }

    pub fn get(&self, job_id: &str) -> Option<JobRecord> {
        self.inner.get(job_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Apply a provider update, registering the job first if it is unknown.
    ///
    /// Transitions are last-write-wins unless `keep_complete` is set, in which
    /// case a job that already reached `complete` is left untouched. The
    /// lookup-or-create and the mutation happen under one shard lock.
    pub fn apply_update(
        &self,
        job_id: &str,
        update: ProviderUpdate,
        keep_complete: bool,
    ) -> UpdateOutcome {
        let mut late_registered = false;
        let mut entry = self.inner.entry(job_id.to_owned()).or_insert_with(|| {
            late_registered = true;
            JobRecord::late_registration()
        });
        let record = entry.value_mut();

        if keep_complete && record.status == JobStatus::Complete {
            return UpdateOutcome {
                late_registered,
                ignored: true,
                record: record.clone(),
            };
        }

        match update {
            ProviderUpdate::Complete { url } => {
                record.status = JobStatus::Complete;
                record.url = Some(url);
            }
            ProviderUpdate::InProgress => {
                record.status = JobStatus::Processing;
            }
            ProviderUpdate::Failed { raw_status } => {
                record.status = JobStatus::Error;
                record.note = Some(format!("status={raw_status}"));
            }
        }

        UpdateOutcome {
            late_registered,
            ignored: false,
            record: record.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_matches_status_table() {
        assert_eq!(
            ProviderUpdate::classify("COMPLETE", Some("https://x/y.mp4")),
            ProviderUpdate::Complete {
                url: "https://x/y.mp4".into()
            }
        );
        assert_eq!(
            ProviderUpdate::classify("running", None),
            ProviderUpdate::InProgress
        );
        assert_eq!(
            ProviderUpdate::classify("queued", Some("ignored")),
            ProviderUpdate::InProgress
        );
        assert_eq!(
            ProviderUpdate::classify("complete", Some("")),
            ProviderUpdate::Failed {
                raw_status: "complete".into()
            }
        );
        assert_eq!(
            ProviderUpdate::classify("", None),
            ProviderUpdate::Failed {
                raw_status: String::new()
            }
        );
    }

    #[test]
    fn complete_update_sets_url_and_keeps_note() {
        let store = JobStore::new();
        store.insert("abc123", JobRecord::queued());

        let outcome = store.apply_update(
            "abc123",
            ProviderUpdate::Complete {
                url: "https://x/y.mp4".into(),
            },
            false,
        );

        assert!(!outcome.late_registered);
        assert_eq!(
            store.get("abc123"),
            Some(JobRecord {
                status: JobStatus::Complete,
                url: Some("https://x/y.mp4".into()),
                note: None,
            })
        );
    }

    #[test]
    fn unknown_job_is_late_registered_before_update() {
        let store = JobStore::new();

        let outcome = store.apply_update("ghost", ProviderUpdate::InProgress, false);
        assert!(outcome.late_registered);
        assert_eq!(outcome.record.status, JobStatus::Processing);
        assert_eq!(outcome.record.note.as_deref(), Some(NOTE_LATE_REGISTER));

        let outcome = store.apply_update(
            "ghost2",
            ProviderUpdate::Failed {
                raw_status: "failed".into(),
            },
            false,
        );
        assert!(outcome.late_registered);
        assert_eq!(outcome.record.status, JobStatus::Error);
        assert_eq!(outcome.record.note.as_deref(), Some("status=failed"));
    }

    #[test]
    fn last_write_wins_by_default() {
        let store = JobStore::new();
        store.insert("j", JobRecord::queued());
        store.apply_update(
            "j",
            ProviderUpdate::Complete {
                url: "https://x/1.mp4".into(),
            },
            false,
        );
        store.apply_update(
            "j",
            ProviderUpdate::Failed {
                raw_status: "error".into(),
            },
            false,
        );

        let record = store.get("j").expect("job exists");
        assert_eq!(record.status, JobStatus::Error);
        // URL from the earlier completion is not cleared.
        assert_eq!(record.url.as_deref(), Some("https://x/1.mp4"));
    }

    #[test]
    fn keep_complete_ignores_later_updates() {
        let store = JobStore::new();
        store.insert("j", JobRecord::queued());
        store.apply_update(
            "j",
            ProviderUpdate::Complete {
                url: "https://x/1.mp4".into(),
            },
            true,
        );
        let outcome = store.apply_update("j", ProviderUpdate::InProgress, true);

        assert!(outcome.ignored);
        assert_eq!(store.get("j").map(|r| r.status), Some(JobStatus::Complete));
    }

    #[test]
    fn redelivery_is_idempotent() {
        let store = JobStore::new();
        store.insert("j", JobRecord::queued());
        let update = ProviderUpdate::Complete {
            url: "https://x/1.mp4".into(),
        };
        let first = store.apply_update("j", update.clone(), false).record;
        let second = store.apply_update("j", update, false).record;
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }
}
