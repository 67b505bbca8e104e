//! # Tailscale Collectors
//!
//! Turns the state of a tailnet into Prometheus gauges.
//!
//! ## Architecture
//!
//! - **`api`**: narrow per-resource traits the collectors read through, implemented for the HTTP client
//! - **`metrics`**: metric descriptors, the descriptor catalog, samples, the sample sink and text exposition
//! - **`collectors`**: the sub-collectors, their registry and the scrape orchestrator
//!   - **`DevicesCollector`**, **`UsersCollector`**, **`KeysCollector`**, **`DnsCollector`**,
//!     **`TailnetSettingsCollector`**: one resource domain each
//!   - **`Registry`**: maps collector names to constructors and caches the instances
//!   - **`Orchestrator`**: runs every collector concurrently per scrape and reports their health
//!
//! ## Scrape flow
//!
//! A scrape spawns one task per collector. Every task writes into the same [`SampleSink`]. A failing
//! collector only loses its own samples and reports `tailscale_scrape_collector_success == 0`; the
//! rest of the scrape is unaffected and `tailscale_up` stays `1`.

#[macro_use]
extern crate tracing;

pub mod api;
pub mod collectors;
pub mod metrics;

#[cfg(test)]
mod testing;

pub use api::TailscaleApi;
pub use collectors::*;
pub use metrics::*;
