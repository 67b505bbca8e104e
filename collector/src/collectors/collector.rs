use crate::{
    api::{
        ApiError,
        TailscaleApi,
    },
    metrics::{
        SampleSink,
        SinkError,
    },
};
use chrono::{
    DateTime,
    Utc,
};
use std::{
    future::Future,
    pin::Pin,
};
use tokio_util::sync::CancellationToken;
use tracing::Span;

pub type UpdateFuture<'a> = Pin<Box<dyn Future<Output = Result<(), CollectorError>> + Send + 'a>>;

/// Fetches one resource domain and translates it into samples.
pub trait SubCollector: Send + Sync {
    /// Fetch the domain and write its samples into `sink`.
    ///
    /// If a fetch fails nothing is written and the error is returned.
    fn update<'a>(
        &'a self,
        ctx: &'a CancellationToken,
        client: &'a dyn TailscaleApi,
        sink: SampleSink,
    ) -> UpdateFuture<'a>;
}

/// Passed to every collector constructor.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub name: &'static str,
    /// Span all of the collector's logging happens in, tagged with `collector=<name>`.
    pub span: Span,
}

impl CollectorConfig {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            span: info_span!("collector", collector = name),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CollectorError {
    #[error("Failed to fetch {resource}: {source}")]
    Fetch {
        resource: &'static str,
        #[source]
        source: ApiError,
    },
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error("Invalid collector configuration: {0}")]
    Config(String),
}

impl CollectorError {
    pub(crate) fn fetch(resource: &'static str, source: ApiError) -> Self {
        CollectorError::Fetch { resource, source }
    }
}

pub(crate) fn unix_seconds(timestamp: &DateTime<Utc>) -> f64 {
    timestamp.timestamp() as f64
}
