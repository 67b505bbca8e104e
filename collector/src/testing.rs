//! In-memory stand-ins for the Tailscale API used by the collector tests.

use crate::{
    api::*,
    collectors::{
        CollectorError,
        SubCollector,
    },
    metrics::{
        sample_channel,
        Descriptor,
        Sample,
    },
};
use chrono::{
    DateTime,
    Utc,
};
use std::sync::Mutex;
use tailscale_exporter_client::StatusCode;
use tokio_util::sync::CancellationToken;

/// Canned responses per resource. Setting an `*_error` makes that read fail.
#[derive(Default)]
pub(crate) struct FakeTailscale {
    pub devices: Vec<Device>,
    pub devices_error: Option<&'static str>,
    pub users: Vec<User>,
    pub users_error: Option<&'static str>,
    pub keys: Vec<Key>,
    pub keys_error: Option<&'static str>,
    pub nameservers: Vec<String>,
    pub nameservers_error: Option<&'static str>,
    pub preferences: DnsPreferences,
    pub preferences_error: Option<&'static str>,
    pub settings: TailnetSettings,
    pub settings_error: Option<&'static str>,
    pub reads: Mutex<Vec<&'static str>>,
}

impl FakeTailscale {
    /// Names of the reads performed so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.reads.lock().unwrap().clone()
    }

    fn respond<T: Clone>(&self, call: &'static str, value: &T, error: Option<&'static str>) -> Result<T, ApiError> {
        self.reads.lock().unwrap().push(call);
        match error {
            Some(message) => Err(failure(message)),
            None => Ok(value.clone()),
        }
    }
}

pub(crate) fn failure(message: &str) -> ApiError {
    ApiError::Status {
        url: "https://api.tailscale.com/api/v2/test".to_string(),
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: message.to_string(),
    }
}

impl DevicesApi for FakeTailscale {
    fn list<'a>(&'a self, _ctx: &'a CancellationToken) -> ApiFuture<'a, Vec<Device>> {
        let result = self.respond("devices", &self.devices, self.devices_error);
        Box::pin(async move { result })
    }
}

impl UsersApi for FakeTailscale {
    fn list<'a>(
        &'a self,
        _ctx: &'a CancellationToken,
        _user_type: Option<UserType>,
        _role: Option<UserRole>,
    ) -> ApiFuture<'a, Vec<User>> {
        let result = self.respond("users", &self.users, self.users_error);
        Box::pin(async move { result })
    }
}

impl KeysApi for FakeTailscale {
    fn list<'a>(&'a self, _ctx: &'a CancellationToken, _all: bool) -> ApiFuture<'a, Vec<Key>> {
        let result = self.respond("keys", &self.keys, self.keys_error);
        Box::pin(async move { result })
    }
}

impl DnsApi for FakeTailscale {
    fn nameservers<'a>(&'a self, _ctx: &'a CancellationToken) -> ApiFuture<'a, Vec<String>> {
        let result = self.respond("dns_nameservers", &self.nameservers, self.nameservers_error);
        Box::pin(async move { result })
    }

    fn preferences<'a>(&'a self, _ctx: &'a CancellationToken) -> ApiFuture<'a, DnsPreferences> {
        let result = self.respond("dns_preferences", &self.preferences, self.preferences_error);
        Box::pin(async move { result })
    }
}

impl TailnetSettingsApi for FakeTailscale {
    fn get<'a>(&'a self, _ctx: &'a CancellationToken) -> ApiFuture<'a, TailnetSettings> {
        let result = self.respond("tailnet_settings", &self.settings, self.settings_error);
        Box::pin(async move { result })
    }
}

impl TailscaleApi for FakeTailscale {
    fn devices(&self) -> &dyn DevicesApi {
        self
    }

    fn users(&self) -> &dyn UsersApi {
        self
    }

    fn keys(&self) -> &dyn KeysApi {
        self
    }

    fn dns(&self) -> &dyn DnsApi {
        self
    }

    fn tailnet_settings(&self) -> &dyn TailnetSettingsApi {
        self
    }
}

/// Runs a single update and returns its result with everything it emitted.
pub(crate) async fn run_update(
    collector: &dyn SubCollector,
    client: &dyn TailscaleApi,
) -> (Result<(), CollectorError>, Vec<Sample>) {
    let ctx = CancellationToken::new();
    let (sink, stream) = sample_channel();
    let result = collector.update(&ctx, client, sink).await;
    (result, stream.collect().await)
}

/// The samples emitted for `descriptor`, in emission order.
pub(crate) fn samples_of<'a>(samples: &'a [Sample], descriptor: &Descriptor) -> Vec<&'a Sample> {
    samples
        .iter()
        .filter(|sample| sample.descriptor.fq_name() == descriptor.fq_name())
        .collect()
}

pub(crate) fn timestamp(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
}
