use crate::router::{
    create_router,
    AppState,
};
use color_eyre::Result;
use eyre::Context as _;
use std::sync::Arc;
use tailscale_exporter_client::{
    Client,
    ClientConfig,
};
use tailscale_exporter_collector::{
    Exposition,
    Orchestrator,
    Registry,
};
use tailscale_exporter_config::Config;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub struct App {
    config: Config,
    shutdown: CancellationToken,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Authenticates, builds the collectors and serves until SIGINT or SIGTERM.
    pub async fn run(self) -> Result<()> {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            tailnet = %self.config.tailnet,
            "Starting tailscale-exporter"
        );

        let client = Client::new(ClientConfig {
            base_url: self.config.api_url.clone(),
            tailnet: self.config.tailnet.clone(),
            client_id: self.config.oauth_client_id.clone(),
            client_secret: self.config.oauth_client_secret.clone(),
            timeout: self.config.request_timeout,
        })
        .context("Failed to create the Tailscale API client")?;

        let token = match client.token(&self.shutdown).await {
            Ok(token) => token,
            Err(err) if err.is_unauthorized() => {
                return Err(err).context("The Tailscale API rejected the OAuth client credentials");
            }
            Err(err) => return Err(err).context("Failed to authenticate with the Tailscale API"),
        };
        info!(expires_at = %token.expires_at, scope = %token.scope, "Authenticated with the Tailscale API");

        let registry = Registry::with_default_collectors();
        let orchestrator =
            Orchestrator::new(&registry, Arc::new(client)).context("Failed to create the collectors")?;
        info!(
            collectors = ?orchestrator.collector_names().collect::<Vec<_>>(),
            "Collectors ready"
        );

        let exposition =
            Exposition::with_process_metrics().context("Failed to register the process metrics")?;

        let router = create_router(AppState::new(
            orchestrator,
            exposition,
            &self.config.tailnet,
            &self.config.metrics_path,
            self.shutdown.clone(),
        ));

        let listener = TcpListener::bind(self.config.listen_address)
            .await
            .with_context(|| format!("Failed to listen on {}", self.config.listen_address))?;
        info!(
            "listening on http://{}{}",
            self.config.listen_address, self.config.metrics_path
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal(self.shutdown.clone()))
            .await
            .context("HTTP server failed")?;

        info!("tailscale-exporter stopped");
        Ok(())
    }
}

/// Resolves on SIGINT or SIGTERM and cancels `shutdown`, aborting in-flight scrapes.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
    shutdown.cancel();
}
