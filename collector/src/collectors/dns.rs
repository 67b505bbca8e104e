use super::collector::{
    CollectorConfig,
    CollectorError,
    SubCollector,
    UpdateFuture,
};
use crate::{
    api::TailscaleApi,
    metrics::{
        catalog::dns::*,
        sample::bool_as_f64,
        SampleSink,
        NO_LABELS,
    },
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{
    Instrument,
    Span,
};

/// Exports the tailnet's nameservers and whether MagicDNS is on.
pub struct DnsCollector {
    span: Span,
}

impl DnsCollector {
    pub fn create(config: CollectorConfig) -> Result<Arc<dyn SubCollector>, CollectorError> {
        Ok(Arc::new(Self { span: config.span }))
    }
}

impl SubCollector for DnsCollector {
    fn update<'a>(
        &'a self,
        ctx: &'a CancellationToken,
        client: &'a dyn TailscaleApi,
        sink: SampleSink,
    ) -> UpdateFuture<'a> {
        Box::pin(
            async move {
                debug!("Collecting DNS metrics");
                let dns = client.dns();

                let nameservers = dns.nameservers(ctx).await.map_err(|err| {
                    error!(error = %err, "Error getting Tailscale DNS nameservers");
                    CollectorError::fetch("dns nameservers", err)
                })?;
                let preferences = dns.preferences(ctx).await.map_err(|err| {
                    error!(error = %err, "Error getting Tailscale DNS preferences");
                    CollectorError::fetch("dns preferences", err)
                })?;

                for nameserver in &nameservers {
                    sink.send(&NAMESERVERS_INFO, 1.0, [nameserver.as_str()])?;
                }
                sink.send(&MAGIC_DNS, bool_as_f64(preferences.magic_dns), NO_LABELS)?;

                debug!(nameservers = nameservers.len(), "Collected DNS metrics");
                Ok(())
            }
            .instrument(self.span.clone()),
        )
    }
}
