use crate::config::Config;
use crate::provider::VadooClient;
use crate::state::{AppState, GenerationSettings};
use crate::store::VideoCache;
use crate::utils::fmt_duration;
use crate::web::create_router;
use anyhow::Context;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Main application struct containing all necessary components
pub struct App {
    config: Config,
    app_state: AppState,
}

impl App {
    /// Create a new App instance from an already-loaded configuration.
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        if config.vadoo_api_key.is_empty() {
            warn!("VADOO_API_KEY is not set; provider calls will be rejected");
        }
        if config.generation_unservable() {
            error!(
                "BACKEND_BASE_URL is unset and USE_MOCK_ON_FAIL is disabled; uncached generations will fail"
            );
        }
        match config.webhook_url() {
            Some(url) => info!(webhook_url = %url, "provider webhook target"),
            None => warn!("BACKEND_BASE_URL is not set; provider webhooks cannot reach this service"),
        }

        let provider = VadooClient::new(
            config.vadoo_generate_url.clone(),
            config.vadoo_api_key.clone(),
            config.request_timeout,
        )
        .context("Failed to create provider client")?;

        let cache = VideoCache::new(config.cache_ttl, config.cache_max_items);
        info!(
            ttl = fmt_duration(cache.ttl()),
            max_items = cache.max_items(),
            request_timeout = fmt_duration(config.request_timeout),
            use_mock_on_fail = config.use_mock_on_fail,
            "generation cache configured"
        );

        let app_state = AppState::new(
            GenerationSettings::from_config(&config),
            cache,
            Arc::new(provider),
        );

        Ok(App { config, app_state })
    }

    /// Serve until SIGINT/SIGTERM, then drain in-flight requests.
    pub async fn run(self) -> ExitCode {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(error = %e, %addr, "failed to bind listener");
                return ExitCode::FAILURE;
            }
        };
        info!(%addr, "web server listening");

        let router = create_router(self.app_state, self.config.request_timeout);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let server = axum::serve(listener, router).with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        });
        let mut handle = tokio::spawn(async move { server.await });

        tokio::select! {
            result = &mut handle => {
                error!(result = ?result, "web server exited unexpectedly");
                return ExitCode::FAILURE;
            }
            signal = shutdown_signal() => {
                info!(signal, "shutdown signal received");
            }
        }

        let _ = shutdown_tx.send(true);
        let timeout = self.config.shutdown_timeout;
        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(Ok(()))) => {
                info!("web server stopped gracefully");
                ExitCode::SUCCESS
            }
            Ok(Ok(Err(e))) => {
                error!(error = %e, "web server failed during shutdown");
                ExitCode::FAILURE
            }
            Ok(Err(e)) => {
                error!(error = %e, "web server task panicked");
                ExitCode::FAILURE
            }
            Err(_) => {
                warn!(
                    timeout = fmt_duration(timeout),
                    "graceful shutdown timed out, dropping in-flight requests"
                );
                ExitCode::FAILURE
            }
        }
    }
}

async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
