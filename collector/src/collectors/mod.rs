//! # Collectors Module
//!
//! Turns Tailscale API resources into samples.
//!
//! ## Architecture
//!
//! - **`SubCollector` trait**: fetch one resource domain and write its samples into a sink
//! - **`DevicesCollector`**, **`UsersCollector`**, **`KeysCollector`**, **`DnsCollector`**,
//!   **`TailnetSettingsCollector`**: one implementation per domain
//! - **`Registry`**: name to constructor table with a shared instance cache
//! - **`Orchestrator`**: runs every collector concurrently per scrape and reports per-collector
//!   duration and success plus the overall `up` gauge
//!
//! A failing collector never fails the scrape. It only drops its own domain's metrics and reports
//! `scrape_collector_success == 0`.

pub mod collector;
pub mod devices;
pub mod dns;
pub mod keys;
pub mod orchestrator;
pub mod registry;
pub mod tailnet_settings;
pub mod users;

// Re-export the main types for easy access
pub use collector::{
    CollectorConfig,
    CollectorError,
    SubCollector,
    UpdateFuture,
};
pub use devices::DevicesCollector;
pub use dns::DnsCollector;
pub use keys::KeysCollector;
pub use orchestrator::Orchestrator;
pub use registry::{
    Collectors,
    Constructor,
    Registry,
    RegistryError,
};
pub use tailnet_settings::TailnetSettingsCollector;
pub use users::UsersCollector;
