use super::{
    registry::{
        Collectors,
        Registry,
        RegistryError,
    },
    SubCollector,
};
use crate::{
    api::TailscaleApi,
    metrics::{
        catalog::scrape::*,
        sample::bool_as_f64,
        sample_channel,
        Descriptor,
        Sample,
        SampleSink,
        NO_LABELS,
    },
};
use futures::future::join_all;
use std::{
    sync::Arc,
    time::Instant,
};
use tokio_util::sync::CancellationToken;

/// Runs every sub-collector concurrently on each scrape and reports how each of them did.
pub struct Orchestrator {
    client: Arc<dyn TailscaleApi>,
    collectors: Collectors,
}

impl Orchestrator {
    /// Captures the registry's shared instances; orchestrators built from the same registry drive
    /// the same collectors.
    pub fn new(registry: &Registry, client: Arc<dyn TailscaleApi>) -> Result<Self, RegistryError> {
        Ok(Self {
            client,
            collectors: registry.instantiate_all()?,
        })
    }

    /// The orchestrator's own metrics. Needs no API access.
    pub fn describe(&self) -> [&'static Descriptor; 3] {
        [&*UP, &*COLLECTOR_DURATION, &*COLLECTOR_SUCCESS]
    }

    pub fn collector_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.collectors.keys().copied()
    }

    /// Runs one scrape and returns everything it produced.
    ///
    /// A failing (or panicking) collector only shows up as `scrape_collector_success == 0` for
    /// that collector; the scrape itself always completes and `up` is always 1.
    pub async fn scrape(&self, ctx: &CancellationToken) -> Vec<Sample> {
        let (sink, stream) = sample_channel();

        let units = self
            .collectors
            .iter()
            .map(|(&name, collector)| self.run(name, Arc::clone(collector), ctx.clone(), sink.clone()));
        join_all(units).await;

        emit(&sink, &UP, 1.0, NO_LABELS);
        drop(sink);
        stream.collect().await
    }

    async fn run(
        &self,
        name: &'static str,
        collector: Arc<dyn SubCollector>,
        ctx: CancellationToken,
        sink: SampleSink,
    ) {
        let start = Instant::now();

        let client = Arc::clone(&self.client);
        let task_sink = sink.clone();
        let outcome =
            tokio::spawn(async move { collector.update(&ctx, client.as_ref(), task_sink).await }).await;

        let duration = start.elapsed().as_secs_f64();
        let success = match outcome {
            Ok(Ok(())) => {
                debug!(collector = name, duration_seconds = duration, "Collector succeeded");
                true
            }
            Ok(Err(err)) => {
                error!(collector = name, duration_seconds = duration, error = %err, "Collector failed");
                false
            }
            Err(err) => {
                error!(collector = name, duration_seconds = duration, error = %err, "Collector task aborted");
                false
            }
        };

        emit(&sink, &COLLECTOR_DURATION, duration, [name]);
        emit(&sink, &COLLECTOR_SUCCESS, bool_as_f64(success), [name]);
    }
}

fn emit<const N: usize>(sink: &SampleSink, descriptor: &'static Descriptor, value: f64, labels: [&str; N]) {
    if let Err(err) = sink.send(descriptor, value, labels) {
        warn!(metric = descriptor.fq_name(), error = %err, "Dropped scrape metric");
    }
}
