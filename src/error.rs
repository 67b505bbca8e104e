use axum::{
    http::StatusCode,
    response::{
        IntoResponse,
        Response,
    },
};
use tailscale_exporter_collector::RenderError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Rendering the scraped metrics failed: {0}")]
    Render(#[from] RenderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "Scrape request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
