//! Per-request tracing spans and response logging.
//!
//! An upstream `X-Request-Id` is reused when it looks sane, otherwise a ULID
//! is generated. The resolved id is echoed back as `X-Request-Id`.
//!
//! Clients poll `/job-status` every few seconds while a video renders, so
//! successful polls and health probes log at `trace`. Rejected provider
//! webhooks log at `warn` because a completion that never lands leaves the
//! job stuck.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::response::Response;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::{Instrument, Level};

static REQUEST_ID: &str = "x-request-id";

/// Longest upstream id we propagate; anything longer is replaced.
const MAX_UPSTREAM_ID_LEN: usize = 128;

const POLLING_PATHS: [&str; 2] = ["/job-status", "/health"];
const WEBHOOK_PATH: &str = "/webhook/vadoo";

#[derive(Clone)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

/// The upstream id if it is non-empty, bounded, and printable ASCII.
fn upstream_id(value: &str) -> Option<&str> {
    let ok = !value.is_empty()
        && value.len() <= MAX_UPSTREAM_ID_LEN
        && value.bytes().all(|b| b.is_ascii_graphic());
    ok.then_some(value)
}

/// Severity for a finished request.
fn response_level(path: &str, status: u16) -> Level {
    match status {
        200..=399 if POLLING_PATHS.contains(&path) => Level::TRACE,
        200..=399 => Level::DEBUG,
        400..=499 if path == WEBHOOK_PATH => Level::WARN,
        400..=499 => Level::INFO,
        _ => Level::WARN,
    }
}

fn log_response(level: Level, method: &str, path: &str, status: u16, duration_ms: u64) {
    macro_rules! emit {
        ($lvl:expr) => {
            tracing::event!($lvl, method, path, status, duration_ms, "Response")
        };
    }
    if level == Level::TRACE {
        emit!(Level::TRACE)
    } else if level == Level::DEBUG {
        emit!(Level::DEBUG)
    } else if level == Level::INFO {
        emit!(Level::INFO)
    } else {
        emit!(Level::WARN)
    }
}

impl<S, B> Service<Request> for RequestIdService<S>
where
    S: Service<Request, Response = Response<B>> + Send + 'static,
    S::Future: Send + 'static,
    S::Error: std::fmt::Debug,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let req_id = req
            .headers()
            .get(REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .and_then(upstream_id)
            .map(String::from)
            .unwrap_or_else(|| ulid::Ulid::new().to_string());

        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let span = tracing::info_span!("request", req_id = %req_id);
        let start = Instant::now();
        let header_value = HeaderValue::from_str(&req_id).ok();

        let future = self.inner.call(req);

        Box::pin(
            async move {
                let mut result = future.await;
                let duration_ms = start.elapsed().as_millis() as u64;

                match &mut result {
                    Ok(response) => {
                        let status = response.status().as_u16();
                        log_response(response_level(&path, status), &method, &path, status, duration_ms);
                        if let Some(value) = header_value {
                            response.headers_mut().insert(REQUEST_ID, value);
                        }
                    }
                    Err(e) => {
                        tracing::error!(method = %method, path = %path, error = ?e, duration_ms, "Request failed");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polling_successes_are_quiet() {
        assert_eq!(response_level("/job-status", 200), Level::TRACE);
        assert_eq!(response_level("/health", 200), Level::TRACE);
        assert_eq!(response_level("/generate-video", 200), Level::DEBUG);
    }

    #[test]
    fn rejected_webhooks_are_loud() {
        assert_eq!(response_level(WEBHOOK_PATH, 400), Level::WARN);
        assert_eq!(response_level("/generate-video", 422), Level::INFO);
        assert_eq!(response_level("/job-status", 400), Level::INFO);
    }

    #[test]
    fn server_errors_warn_everywhere() {
        assert_eq!(response_level("/job-status", 500), Level::WARN);
        assert_eq!(response_level("/generate-video", 503), Level::WARN);
    }

    #[test]
    fn upstream_id_must_be_printable_and_bounded() {
        assert_eq!(upstream_id("edge-7f3a"), Some("edge-7f3a"));
        assert_eq!(upstream_id(""), None);
        assert_eq!(upstream_id("has space"), None);
        assert_eq!(upstream_id(&"x".repeat(MAX_UPSTREAM_ID_LEN + 1)), None);
    }
}
