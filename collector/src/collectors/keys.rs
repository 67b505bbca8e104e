use super::collector::{
    unix_seconds,
    CollectorConfig,
    CollectorError,
    SubCollector,
    UpdateFuture,
};
use crate::{
    api::{
        Key,
        TailscaleApi,
    },
    metrics::{
        catalog::keys::*,
        SampleSink,
        SinkError,
    },
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{
    Instrument,
    Span,
};

/// Exports the tailnet's keys, including those of other users.
pub struct KeysCollector {
    span: Span,
}

impl KeysCollector {
    pub fn create(config: CollectorConfig) -> Result<Arc<dyn SubCollector>, CollectorError> {
        Ok(Arc::new(Self { span: config.span }))
    }
}

impl SubCollector for KeysCollector {
    fn update<'a>(
        &'a self,
        ctx: &'a CancellationToken,
        client: &'a dyn TailscaleApi,
        sink: SampleSink,
    ) -> UpdateFuture<'a> {
        Box::pin(
            async move {
                debug!("Collecting keys metrics");
                let keys = client.keys().list(ctx, true).await.map_err(|err| {
                    error!(error = %err, "Error getting Tailscale keys");
                    CollectorError::fetch(SUBSYSTEM, err)
                })?;

                for key in &keys {
                    record(key, &sink)?;
                }
                debug!(keys = keys.len(), "Collected keys metrics");
                Ok(())
            }
            .instrument(self.span.clone()),
        )
    }
}

// Keys always export both timestamps; a missing one is reported as 0.
fn record(key: &Key, sink: &SampleSink) -> Result<(), SinkError> {
    let labels = [key.id.as_str(), key.key_type.as_str(), key.user_id.as_str()];

    sink.send(&INFO, 1.0, labels)?;
    sink.send(&CREATED, key.created.as_ref().map_or(0.0, unix_seconds), labels)?;
    sink.send(&EXPIRES, key.expires.as_ref().map_or(0.0, unix_seconds), labels)?;
    Ok(())
}
