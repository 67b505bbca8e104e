//! # Tailscale API Client
//!
//! A small client for the parts of the Tailscale API v2 the exporter reads.
//!
//! - **`Client`**: authenticates with OAuth client credentials and performs the requests
//! - **`models`**: the entities returned by the API (devices, users, keys, DNS, tailnet settings)
//! - **`ApiError`**: everything that can go wrong while talking to the API
//!
//! Every request takes a [`CancellationToken`](tokio_util::sync::CancellationToken); cancelling it
//! aborts the in-flight request with [`ApiError::Cancelled`].

#[macro_use]
extern crate tracing;

mod client;
mod error;
pub mod models;
mod time;

pub use client::{
    AccessToken,
    Client,
    ClientConfig,
    DEFAULT_API_URL,
    OAUTH_SCOPES,
};
pub use error::ApiError;
pub use models::*;
pub use reqwest::StatusCode;
