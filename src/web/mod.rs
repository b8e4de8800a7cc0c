//! HTTP surface: generation, provider webhook, and job status polling.

pub mod error;
pub mod generate;
pub mod middleware;
pub mod routes;
pub mod status;
pub mod webhook;

pub use routes::*;
