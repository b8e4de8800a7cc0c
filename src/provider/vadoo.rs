//! Vadoo AI video generation client.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::json::parse_json_with_context;
use super::middleware::TransactionLogMiddleware;
use super::{GenerationPayload, ProviderError, VideoProvider};

pub const DEFAULT_GENERATE_URL: &str = "https://viralapi.vadoo.tv/api/generate_video";

/// Error bodies are echoed into job notes and logs, so keep them short.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    vid: Option<Value>,
}

impl GenerateReply {
    /// The provider sometimes sends the id as a number.
    fn video_id(self) -> Option<String> {
        match self.vid? {
            Value::String(s) if !s.is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

pub struct VadooClient {
    http: ClientWithMiddleware,
    generate_url: String,
    api_key: String,
}

impl VadooClient {
    pub fn new(
        generate_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("vidgen/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http: ClientBuilder::new(client)
                .with(TransactionLogMiddleware)
                .build(),
            generate_url: generate_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl VideoProvider for VadooClient {
    async fn generate(&self, payload: &GenerationPayload) -> Result<String, ProviderError> {
        let response = self
            .http
            .post(&self.generate_url)
            .header("X-API-KEY", &self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate(body, MAX_ERROR_BODY),
            });
        }

        let reply: GenerateReply =
            parse_json_with_context(&body).map_err(|source| ProviderError::Parse {
                status: status.as_u16(),
                source,
            })?;
        let vid = reply.video_id().ok_or(ProviderError::MissingVideoId)?;
        debug!(vid = %vid, "provider accepted generation");
        Ok(vid)
    }
}

fn truncate(mut body: String, max: usize) -> String {
    if body.len() > max {
        let mut cut = max;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(json: &str) -> GenerateReply {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn video_id_accepts_strings_and_numbers() {
        assert_eq!(reply(r#"{"vid": "abc"}"#).video_id().as_deref(), Some("abc"));
        assert_eq!(reply(r#"{"vid": 4211}"#).video_id().as_deref(), Some("4211"));
    }

    #[test]
    fn video_id_rejects_missing_or_empty() {
        assert_eq!(reply("{}").video_id(), None);
        assert_eq!(reply(r#"{"vid": ""}"#).video_id(), None);
        assert_eq!(reply(r#"{"vid": null}"#).video_id(), None);
        assert_eq!(reply(r#"{"vid": false}"#).video_id(), None);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short".into(), 10), "short");
        assert_eq!(truncate("ééé".into(), 3), "é...");
    }
}
