//! In-memory stores shared by the request handlers.

pub mod cache;
pub mod jobs;

pub use cache::{VideoCache, VideoResult};
pub use jobs::{JobRecord, JobStatus, JobStore, ProviderUpdate, UpdateOutcome};
