use super::descriptor::Descriptor;
use tokio::sync::mpsc;

/// Label values for descriptors without labels.
pub const NO_LABELS: [&str; 0] = [];

/// One observation produced during a scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub descriptor: &'static Descriptor,
    pub value: f64,
    pub labels: Vec<String>,
}

impl Sample {
    /// Label values paired with their names.
    pub fn label_pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.descriptor
            .label_names()
            .iter()
            .copied()
            .zip(self.labels.iter().map(String::as_str))
    }

    /// The value of the label called `name`, if the descriptor has one.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.label_pairs()
            .find(|(label, _)| *label == name)
            .map(|(_, value)| value)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SinkError {
    #[error("{descriptor} expects {expected} label values, got {actual}")]
    LabelCount {
        descriptor: String,
        expected: usize,
        actual: usize,
    },
    #[error("The scrape that owned this sink has already finished")]
    Closed,
}

/// Write end of a scrape. Cheap to clone; every collector gets its own handle.
#[derive(Debug, Clone)]
pub struct SampleSink {
    tx: mpsc::UnboundedSender<Sample>,
}

/// Read end of a scrape, drained once every [`SampleSink`] is dropped.
#[derive(Debug)]
pub struct SampleStream {
    rx: mpsc::UnboundedReceiver<Sample>,
}

pub fn sample_channel() -> (SampleSink, SampleStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SampleSink { tx }, SampleStream { rx })
}

impl SampleSink {
    pub fn send<L>(&self, descriptor: &'static Descriptor, value: f64, labels: L) -> Result<(), SinkError>
    where
        L: IntoIterator,
        L::Item: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let expected = descriptor.label_names().len();
        if labels.len() != expected {
            return Err(SinkError::LabelCount {
                descriptor: descriptor.to_string(),
                expected,
                actual: labels.len(),
            });
        }

        self.tx
            .send(Sample {
                descriptor,
                value,
                labels,
            })
            .map_err(|_| SinkError::Closed)
    }
}

impl SampleStream {
    /// Waits for all sinks to be dropped and returns everything they sent.
    pub async fn collect(mut self) -> Vec<Sample> {
        let mut samples = Vec::new();
        while let Some(sample) = self.rx.recv().await {
            samples.push(sample);
        }
        samples
    }
}

pub(crate) fn bool_as_f64(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::catalog;

    #[tokio::test]
    async fn samples_from_all_sinks_are_collected() {
        let (sink, stream) = sample_channel();
        let other = sink.clone();

        sink.send(&catalog::scrape::UP, 1.0, NO_LABELS).unwrap();
        other
            .send(&catalog::scrape::COLLECTOR_SUCCESS, 0.0, ["devices"])
            .unwrap();
        drop(sink);
        drop(other);

        let samples = stream.collect().await;
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].label("collector"), Some("devices"));
        assert_eq!(samples[1].label("missing"), None);
    }

    #[tokio::test]
    async fn label_count_must_match_descriptor() {
        let (sink, _stream) = sample_channel();
        let err = sink
            .send(&catalog::scrape::COLLECTOR_SUCCESS, 1.0, ["devices", "extra"])
            .unwrap_err();
        assert_eq!(
            err,
            SinkError::LabelCount {
                descriptor: "tailscale_scrape_collector_success{collector}".to_string(),
                expected: 1,
                actual: 2,
            }
        );
    }

    #[test]
    fn sending_after_the_scrape_finished_fails() {
        let (sink, stream) = sample_channel();
        drop(stream);
        assert_eq!(
            sink.send(&catalog::scrape::UP, 1.0, NO_LABELS),
            Err(SinkError::Closed)
        );
    }
}
