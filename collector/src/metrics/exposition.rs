//! Renders the samples of one scrape in the Prometheus text format.

use super::{
    descriptor::Descriptor,
    sample::Sample,
};
use prometheus::{
    Encoder as _,
    GaugeVec,
    Opts,
    Registry,
    TextEncoder,
};
use std::collections::{
    BTreeMap,
    HashMap,
};

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("Failed to build {metric}: {source}")]
    Metric {
        metric: String,
        #[source]
        source: prometheus::Error,
    },
    #[error("Failed to encode metrics: {0}")]
    Encode(#[source] prometheus::Error),
    #[error("Encoded metrics are not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encodes scrapes, together with the metrics of a registry that lives as long as the exporter.
///
/// The long-lived registry holds metrics about the exporter itself, such as the `process_*`
/// family. They don't get the per-scrape const labels.
#[derive(Default)]
pub struct Exposition {
    process: Registry,
}

impl Exposition {
    /// Also exposes the standard `process_*` metrics of this process. Only Linux has a process
    /// collector, elsewhere this is the same as [`Exposition::default`].
    pub fn with_process_metrics() -> Result<Self, prometheus::Error> {
        let process = Registry::new();
        #[cfg(target_os = "linux")]
        process.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;
        Ok(Self { process })
    }

    /// Encodes `samples` with `const_labels` attached to every scraped metric.
    pub fn render(&self, samples: &[Sample], const_labels: &[(&str, &str)]) -> Result<String, RenderError> {
        let mut families = self.process.gather();
        families.extend(scrape_registry(samples, const_labels)?.gather());
        families.sort_by(|a, b| a.get_name().cmp(b.get_name()));

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buffer)
            .map_err(RenderError::Encode)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Groups `samples` into one gauge family per descriptor. When a descriptor receives the same
/// label values twice, the later value wins.
fn scrape_registry(samples: &[Sample], const_labels: &[(&str, &str)]) -> Result<Registry, RenderError> {
    let const_labels: HashMap<String, String> = const_labels
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    let mut families: BTreeMap<&str, (&Descriptor, Vec<&Sample>)> = BTreeMap::new();
    for sample in samples {
        families
            .entry(sample.descriptor.fq_name())
            .or_insert_with(|| (sample.descriptor, Vec::new()))
            .1
            .push(sample);
    }

    let registry = Registry::new();
    for (name, (descriptor, samples)) in families {
        let metric_error = |source: prometheus::Error| RenderError::Metric {
            metric: name.to_string(),
            source,
        };

        let opts = Opts::new(name, descriptor.help()).const_labels(const_labels.clone());
        let gauges = GaugeVec::new(opts, descriptor.label_names()).map_err(metric_error)?;
        for sample in samples {
            let labels: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
            gauges
                .get_metric_with_label_values(&labels)
                .map_err(metric_error)?
                .set(sample.value);
        }
        registry.register(Box::new(gauges)).map_err(metric_error)?;
    }
    Ok(registry)
}
