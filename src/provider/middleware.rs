//! HTTP middleware for the provider client.

use crate::utils::fmt_duration;
use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(5);

/// Logs every outbound provider request with its status and latency.
pub struct TransactionLogMiddleware;

#[async_trait::async_trait]
impl Middleware for TransactionLogMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let method = req.method().clone();
        let mut url = req.url().clone();
        url.set_query(None);

        trace!(method = %method, url = %url, "provider request started");
        let start = Instant::now();
        let result = next.run(req, extensions).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(response) => {
                let status = response.status().as_u16();
                if elapsed > SLOW_REQUEST_THRESHOLD {
                    warn!(method = %method, url = %url, status, duration = fmt_duration(elapsed), "slow provider request");
                } else {
                    debug!(method = %method, url = %url, status, duration = fmt_duration(elapsed), "provider request");
                }
            }
            Err(e) => {
                warn!(method = %method, url = %url, error = %e, duration = fmt_duration(elapsed), "provider request failed");
            }
        }

        result
    }
}
