//! # Tailscale Exporter
//!
//! Serves the state of a tailnet as Prometheus metrics.
//!
//! - **`App`**: authenticates against the Tailscale API and runs the HTTP server
//! - **`router`**: the metrics endpoint, a landing page and `/healthz`
//! - **`logging`**: error reporting and tracing setup
//!
//! The collectors live in `tailscale-exporter-collector`, the API client in
//! `tailscale-exporter-client` and the configuration in `tailscale-exporter-config`.

#[macro_use]
extern crate tracing;

mod app;
mod error;
mod logging;
pub mod router;

pub use app::App;
pub use error::AppError;
pub use logging::{
    init_errors,
    init_logging,
};
pub use tailscale_exporter_config::{
    version,
    Args,
    Command,
    Config,
};
