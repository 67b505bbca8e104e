use crate::error::AppError;
use axum::{
    extract::State,
    http::header,
    response::{
        Html,
        IntoResponse,
    },
    routing::get,
    Router,
};
use std::sync::Arc;
use tailscale_exporter_collector::{
    Exposition,
    Orchestrator,
    CONTENT_TYPE,
};
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
    exposition: Arc<Exposition>,
    tailnet: Arc<str>,
    metrics_path: Arc<str>,
    /// Parent of every scrape's token; cancelled on shutdown.
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        orchestrator: Orchestrator,
        exposition: Exposition,
        tailnet: &str,
        metrics_path: &str,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            exposition: Arc::new(exposition),
            tailnet: tailnet.into(),
            metrics_path: metrics_path.into(),
            shutdown,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let metrics_path = state.metrics_path.to_string();

    Router::new()
        .route("/", get(landing_page))
        .route("/healthz", get(healthz))
        .route(&metrics_path, get(metrics))
        .with_state(state)
}

async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    // Dropping the handler (client went away, server shutting down) cancels the API requests.
    let ctx = state.shutdown.child_token();
    let _cancel_on_drop = ctx.clone().drop_guard();

    let samples = state.orchestrator.scrape(&ctx).await;
    let body = state.exposition.render(&samples, &[("tailnet", &*state.tailnet)])?;

    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE)], body))
}

async fn landing_page(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>
<head><title>Tailscale Exporter</title></head>
<body>
<h1>Tailscale Exporter</h1>
<p>Exporting tailnet <code>{tailnet}</code></p>
<p><a href=\"{metrics_path}\">Metrics</a></p>
</body>
</html>
",
        tailnet = state.tailnet,
        metrics_path = state.metrics_path,
    ))
}

async fn healthz() -> &'static str {
    "ok"
}
