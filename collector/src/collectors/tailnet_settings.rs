use super::collector::{
    CollectorConfig,
    CollectorError,
    SubCollector,
    UpdateFuture,
};
use crate::{
    api::{
        TailnetSettings,
        TailscaleApi,
    },
    metrics::{
        catalog::tailnet_settings::*,
        SampleSink,
        SinkError,
        NO_LABELS,
    },
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{
    Instrument,
    Span,
};

/// Exports the tailnet-wide settings. Flags are carried as `"true"`/`"false"` label values.
pub struct TailnetSettingsCollector {
    span: Span,
}

impl TailnetSettingsCollector {
    pub fn create(config: CollectorConfig) -> Result<Arc<dyn SubCollector>, CollectorError> {
        Ok(Arc::new(Self { span: config.span }))
    }
}

impl SubCollector for TailnetSettingsCollector {
    fn update<'a>(
        &'a self,
        ctx: &'a CancellationToken,
        client: &'a dyn TailscaleApi,
        sink: SampleSink,
    ) -> UpdateFuture<'a> {
        Box::pin(
            async move {
                debug!("Collecting tailnet settings metrics");
                let settings = client.tailnet_settings().get(ctx).await.map_err(|err| {
                    error!(error = %err, "Error getting Tailscale tailnet settings");
                    CollectorError::fetch(SUBSYSTEM, err)
                })?;

                record(&settings, &sink)?;
                Ok(())
            }
            .instrument(self.span.clone()),
        )
    }
}

fn record(settings: &TailnetSettings, sink: &SampleSink) -> Result<(), SinkError> {
    sink.send(
        &INFO,
        1.0,
        [
            settings.acls_externally_managed_on.to_string(),
            settings.acls_external_link.clone(),
            settings.devices_approval_on.to_string(),
            settings.devices_auto_updates_on.to_string(),
            settings.users_approval_on.to_string(),
            settings.users_role_allowed_to_join_external_tailnets.clone(),
            settings.network_flow_logging_on.to_string(),
            settings.regional_routing_on.to_string(),
            settings.posture_identity_collection_on.to_string(),
        ],
    )?;
    sink.send(
        &DEVICES_KEY_DURATION_DAYS,
        f64::from(settings.devices_key_duration_days),
        NO_LABELS,
    )
}
