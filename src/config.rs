//! Configuration module for the vidgen application.
//!
//! Values come from an optional `vidgen.toml` overlaid by environment
//! variables (after `.env` has been loaded by `main`).

use custom_debug_derive::Debug;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

use crate::provider::vadoo::DEFAULT_GENERATE_URL;

/// Main application configuration.
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// Log level for the crate's own targets (overridden by `RUST_LOG`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_port")]
    pub port: u16,

    /// Sent as `X-API-KEY` on every provider call.
    #[serde(default)]
    #[debug(with = "crate::fmt::redacted")]
    pub vadoo_api_key: String,
    #[serde(default = "default_generate_url")]
    pub vadoo_generate_url: String,
    /// Publicly reachable base URL; the provider calls `{base}/webhook/vadoo`.
    #[serde(default, deserialize_with = "deserialize_base_url")]
    #[debug(skip_if = Option::is_none)]
    #[debug(with = "crate::fmt::opt")]
    pub backend_base_url: Option<String>,
    /// Report a completed mock job instead of failing when the provider call fails.
    #[serde(default = "default_true")]
    pub use_mock_on_fail: bool,
    /// URL reported for fallback jobs; without one they complete with no URL.
    #[serde(default)]
    #[debug(skip_if = Option::is_none)]
    #[debug(with = "crate::fmt::opt")]
    pub mock_video_url: Option<String>,
    /// Duration range requested from the provider, e.g. `30-60`.
    #[serde(default = "default_provider_duration")]
    pub provider_duration: String,
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub request_timeout: Duration,

    #[serde(default = "default_cache_ttl", deserialize_with = "deserialize_duration")]
    pub cache_ttl: Duration,
    #[serde(default = "default_cache_max_items")]
    pub cache_max_items: usize,

    /// Refuse webhook transitions away from `complete`.
    #[serde(default)]
    pub webhook_keep_complete: bool,

    #[serde(
        default = "default_shutdown_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub shutdown_timeout: Duration,
}

impl Config {
    /// Load from `vidgen.toml` (if present) and the process environment.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file("vidgen.toml"))
            .merge(Env::raw().only(&KEYS))
    }

    /// `true` when a request that misses the cache cannot be served at all.
    pub fn generation_unservable(&self) -> bool {
        self.backend_base_url.is_none() && !self.use_mock_on_fail
    }

    pub fn webhook_url(&self) -> Option<String> {
        self.backend_base_url
            .as_deref()
            .map(|base| format!("{base}/webhook/vadoo"))
    }
}

/// Environment keys read by [`Config::figment`]; everything else in the env is ignored.
const KEYS: [&str; 13] = [
    "LOG_LEVEL",
    "PORT",
    "VADOO_API_KEY",
    "VADOO_GENERATE_URL",
    "BACKEND_BASE_URL",
    "USE_MOCK_ON_FAIL",
    "MOCK_VIDEO_URL",
    "PROVIDER_DURATION",
    "REQUEST_TIMEOUT",
    "CACHE_TTL",
    "CACHE_MAX_ITEMS",
    "WEBHOOK_KEEP_COMPLETE",
    "SHUTDOWN_TIMEOUT",
];

fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_generate_url() -> String {
    DEFAULT_GENERATE_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_provider_duration() -> String {
    "30-60".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(60 * 60)
}

fn default_cache_max_items() -> usize {
    256
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(8)
}

/// Accepts whole seconds (`90`) or a unit-suffixed string (`90s`, `2m`, `1h`).
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct DurationVisitor;

    impl serde::de::Visitor<'_> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a number of seconds or a duration string like \"30s\" or \"1h\"")
        }

        fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<Duration, E> {
            Ok(Duration::from_secs(value))
        }

        fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<Duration, E> {
            u64::try_from(value)
                .map(Duration::from_secs)
                .map_err(|_| E::custom(format!("duration must not be negative: {value}")))
        }

        fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Duration, E> {
            fundu::parse_duration(value.trim())
                .map_err(|e| E::custom(format!("invalid duration '{value}': {e}")))
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}

/// Strips trailing slashes, treats blank as unset, and requires an absolute URL.
fn deserialize_base_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(None);
    }
    url::Url::parse(trimmed)
        .map_err(|e| serde::de::Error::custom(format!("invalid BACKEND_BASE_URL '{raw}': {e}")))?;
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Serialized;
    use serde_json::json;

    fn extract(value: serde_json::Value) -> Result<Config, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(value))
            .extract()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = extract(json!({})).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.vadoo_generate_url, DEFAULT_GENERATE_URL);
        assert!(config.use_mock_on_fail);
        assert_eq!(config.backend_base_url, None);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.cache_max_items, 256);
        assert_eq!(config.provider_duration, "30-60");
        assert!(!config.webhook_keep_complete);
    }

    #[test]
    fn durations_accept_seconds_and_unit_strings() {
        let config = extract(json!({
            "request_timeout": 15,
            "cache_ttl": "2h",
            "shutdown_timeout": "500ms",
        }))
        .unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.cache_ttl, Duration::from_secs(7200));
        assert_eq!(config.shutdown_timeout, Duration::from_millis(500));
    }

    #[test]
    fn invalid_duration_is_rejected() {
        assert!(extract(json!({ "cache_ttl": "soon" })).is_err());
        assert!(extract(json!({ "cache_ttl": -5 })).is_err());
    }

    #[test]
    fn base_url_is_normalized() {
        let config = extract(json!({ "backend_base_url": "https://api.example.com/" })).unwrap();
        assert_eq!(
            config.backend_base_url.as_deref(),
            Some("https://api.example.com")
        );
        assert_eq!(
            config.webhook_url().as_deref(),
            Some("https://api.example.com/webhook/vadoo")
        );

        let blank = extract(json!({ "backend_base_url": "  " })).unwrap();
        assert_eq!(blank.backend_base_url, None);

        assert!(extract(json!({ "backend_base_url": "not a url" })).is_err());
    }

    #[test]
    fn unservable_only_without_callback_and_fallback() {
        let config = extract(json!({ "use_mock_on_fail": false })).unwrap();
        assert!(config.generation_unservable());

        let config = extract(json!({
            "use_mock_on_fail": false,
            "backend_base_url": "https://api.example.com",
        }))
        .unwrap();
        assert!(!config.generation_unservable());
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = extract(json!({ "vadoo_api_key": "sk-very-secret" })).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
