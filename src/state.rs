//! Application state shared across request handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::provider::VideoProvider;
use crate::store::{JobStore, VideoCache};

/// Generation behaviour derived from [`Config`].
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub backend_base_url: Option<String>,
    pub use_mock_on_fail: bool,
    pub mock_video_url: Option<String>,
    pub provider_duration: String,
    pub webhook_keep_complete: bool,
}

impl GenerationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            backend_base_url: config.backend_base_url.clone(),
            use_mock_on_fail: config.use_mock_on_fail,
            mock_video_url: config.mock_video_url.clone(),
            provider_duration: config.provider_duration.clone(),
            webhook_keep_complete: config.webhook_keep_complete,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            backend_base_url: None,
            use_mock_on_fail: true,
            mock_video_url: None,
            provider_duration: "30-60".to_string(),
            webhook_keep_complete: false,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<GenerationSettings>,
    pub cache: VideoCache,
    pub jobs: JobStore,
    pub provider: Arc<dyn VideoProvider>,
}

impl AppState {
    pub fn new(
        settings: GenerationSettings,
        cache: VideoCache,
        provider: Arc<dyn VideoProvider>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            cache,
            jobs: JobStore::new(),
            provider,
        }
    }
}
