use super::collector::{
    unix_seconds,
    CollectorConfig,
    CollectorError,
    SubCollector,
    UpdateFuture,
};
use crate::{
    api::{
        TailscaleApi,
        User,
    },
    metrics::{
        catalog::users::*,
        sample::bool_as_f64,
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

/// Exports every user of the tailnet regardless of type or role.
pub struct UsersCollector {
    span: Span,
}

impl UsersCollector {
    pub fn create(config: CollectorConfig) -> Result<Arc<dyn SubCollector>, CollectorError> {
        Ok(Arc::new(Self { span: config.span }))
    }
}

impl SubCollector for UsersCollector {
    fn update<'a>(
        &'a self,
        ctx: &'a CancellationToken,
        client: &'a dyn TailscaleApi,
        sink: SampleSink,
    ) -> UpdateFuture<'a> {
        Box::pin(
            async move {
                debug!("Collecting users metrics");
                let users = client.users().list(ctx, None, None).await.map_err(|err| {
                    error!(error = %err, "Error getting Tailscale users");
                    CollectorError::fetch(SUBSYSTEM, err)
                })?;

                for user in &users {
                    record(user, &sink)?;
                }
                debug!(users = users.len(), "Collected users metrics");
                Ok(())
            }
            .instrument(self.span.clone()),
        )
    }
}

fn record(user: &User, sink: &SampleSink) -> Result<(), SinkError> {
    let labels = [
        user.id.as_str(),
        user.login_name.as_str(),
        user.display_name.as_str(),
    ];
    let [id, login_name, display_name] = labels;

    sink.send(
        &INFO,
        1.0,
        [
            id,
            login_name,
            display_name,
            user.role.as_str(),
            user.status.as_str(),
            user.user_type.as_str(),
        ],
    )?;
    sink.send(&CURRENTLY_LOGGED_IN, bool_as_f64(user.currently_connected), labels)?;

    if let Some(created) = &user.created {
        sink.send(&CREATED, unix_seconds(created), labels)?;
    }
    if let Some(last_seen) = &user.last_seen {
        sink.send(&LAST_SEEN, unix_seconds(last_seen), labels)?;
    }
    Ok(())
}
