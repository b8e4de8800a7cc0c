//! Prompt-to-video backend: forwards generation requests to an external
//! provider, tracks jobs in memory, and exposes status polling fed by the
//! provider's webhook.

pub mod app;
pub mod cli;
pub mod config;
pub mod fmt;
pub mod generation;
pub mod logging;
pub mod prompt;
pub mod provider;
pub mod state;
pub mod store;
pub mod utils;
pub mod web;
