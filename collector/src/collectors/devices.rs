use super::collector::{
    unix_seconds,
    CollectorConfig,
    CollectorError,
    SubCollector,
    UpdateFuture,
};
use crate::{
    api::{
        Device,
        TailscaleApi,
    },
    metrics::{
        catalog::devices::*,
        sample::bool_as_f64,
        SampleSink,
        SinkError,
    },
};
use chrono::{
    DateTime,
    TimeDelta,
    Utc,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{
    Instrument,
    Span,
};

/// A device counts as online when it was seen less than this many minutes before the scrape.
const ONLINE_WINDOW_MINUTES: i64 = 5;

/// Exports one set of gauges per device in the tailnet.
pub struct DevicesCollector {
    span: Span,
}

impl DevicesCollector {
    pub fn create(config: CollectorConfig) -> Result<Arc<dyn SubCollector>, CollectorError> {
        Ok(Arc::new(Self { span: config.span }))
    }
}

impl SubCollector for DevicesCollector {
    fn update<'a>(
        &'a self,
        ctx: &'a CancellationToken,
        client: &'a dyn TailscaleApi,
        sink: SampleSink,
    ) -> UpdateFuture<'a> {
        Box::pin(
            async move {
                debug!("Collecting devices metrics");
                let devices = client.devices().list(ctx).await.map_err(|err| {
                    error!(error = %err, "Error getting Tailscale devices");
                    CollectorError::fetch(SUBSYSTEM, err)
                })?;

                let now = Utc::now();
                for device in &devices {
                    record(device, now, &sink)?;
                }
                debug!(devices = devices.len(), "Collected devices metrics");
                Ok(())
            }
            .instrument(self.span.clone()),
        )
    }
}

fn is_online(device: &Device, now: DateTime<Utc>) -> bool {
    device
        .last_seen
        .is_some_and(|seen| now.signed_duration_since(seen) < TimeDelta::minutes(ONLINE_WINDOW_MINUTES))
}

fn record(device: &Device, now: DateTime<Utc>, sink: &SampleSink) -> Result<(), SinkError> {
    let labels = [
        device.id.as_str(),
        device.name.as_str(),
        device.hostname.as_str(),
        device.os.as_str(),
        device.user.as_str(),
    ];

    sink.send(
        &INFO,
        1.0,
        [
            device.id.as_str(),
            device.name.as_str(),
            device.hostname.as_str(),
            device.os.as_str(),
            device.client_version.as_str(),
            device.user.as_str(),
            device.tailscale_ip(),
            device.machine_key.as_str(),
            device.node_key.as_str(),
        ],
    )?;
    sink.send(&ONLINE, bool_as_f64(is_online(device, now)), labels)?;
    sink.send(&AUTHORIZED, bool_as_f64(device.authorized), labels)?;
    sink.send(&EXTERNAL, bool_as_f64(device.is_external), labels)?;

    let [id, name, hostname, os, user] = labels;
    sink.send(
        &UPDATE_AVAILABLE,
        bool_as_f64(device.update_available),
        [id, name, hostname, os, user, device.client_version.as_str()],
    )?;
    sink.send(&KEY_EXPIRY_DISABLED, bool_as_f64(device.key_expiry_disabled), labels)?;
    sink.send(&BLOCKS_INCOMING, bool_as_f64(device.blocks_incoming_connections), labels)?;
    sink.send(&ROUTES_ADVERTISED, device.advertised_routes.len() as f64, labels)?;
    sink.send(&ROUTES_ENABLED, device.enabled_routes.len() as f64, labels)?;

    if let Some(last_seen) = &device.last_seen {
        sink.send(&LAST_SEEN, unix_seconds(last_seen), labels)?;
    }
    if let Some(expires) = &device.expires {
        sink.send(&EXPIRES, unix_seconds(expires), labels)?;
    }
    if let Some(created) = &device.created {
        sink.send(&CREATED, unix_seconds(created), labels)?;
    }

    for (region, latency) in device.derp_latency() {
        sink.send(&LATENCY, latency.latency_ms, [id, name, hostname, os, user, region])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        run_update,
        samples_of,
        timestamp,
        FakeTailscale,
    };
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tailscale_exporter_client::{
        ClientConnectivity,
        DerpRegion,
    };

    fn collector() -> Arc<dyn SubCollector> {
        DevicesCollector::create(CollectorConfig::new(SUBSYSTEM)).unwrap()
    }

    fn device(id: &str, last_seen: Option<DateTime<Utc>>) -> Device {
        Device {
            id: id.to_string(),
            name: format!("{id}.tailnet.ts.net"),
            hostname: id.to_string(),
            os: "linux".to_string(),
            client_version: "1.84.0".to_string(),
            user: "alice@example.com".to_string(),
            addresses: vec!["100.64.0.1".to_string(), "fd7a:115c:a1e0::1".to_string()],
            machine_key: "mkey:abc".to_string(),
            node_key: "nodekey:def".to_string(),
            authorized: true,
            advertised_routes: vec!["10.0.0.0/24".to_string(), "10.0.1.0/24".to_string()],
            enabled_routes: vec!["10.0.0.0/24".to_string()],
            last_seen,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn online_is_relative_to_scrape_time() {
        let now = Utc::now();
        let client = FakeTailscale {
            devices: vec![
                device("recent", Some(now - TimeDelta::minutes(1))),
                device("stale", Some(now - TimeDelta::minutes(10))),
            ],
            ..Default::default()
        };

        let (result, samples) = run_update(collector().as_ref(), &client).await;
        result.unwrap();

        let online: BTreeMap<&str, f64> = samples_of(&samples, &ONLINE)
            .into_iter()
            .map(|sample| (sample.label("id").unwrap(), sample.value))
            .collect();
        assert_eq!(online, BTreeMap::from([("recent", 1.0), ("stale", 0.0)]));
    }

    #[test]
    fn never_seen_device_is_offline() {
        assert!(!is_online(&device("new", None), Utc::now()));
    }

    #[tokio::test]
    async fn unconditional_gauges_use_device_fields() {
        let client = FakeTailscale {
            devices: vec![device("node", None)],
            ..Default::default()
        };

        let (result, samples) = run_update(collector().as_ref(), &client).await;
        result.unwrap();

        let info = samples_of(&samples, &INFO);
        assert_eq!(info.len(), 1);
        assert_eq!(
            info[0].labels,
            vec![
                "node",
                "node.tailnet.ts.net",
                "node",
                "linux",
                "1.84.0",
                "alice@example.com",
                "100.64.0.1",
                "mkey:abc",
                "nodekey:def",
            ]
        );
        assert_eq!(samples_of(&samples, &AUTHORIZED)[0].value, 1.0);
        assert_eq!(samples_of(&samples, &EXTERNAL)[0].value, 0.0);
        assert_eq!(samples_of(&samples, &ROUTES_ADVERTISED)[0].value, 2.0);
        assert_eq!(samples_of(&samples, &ROUTES_ENABLED)[0].value, 1.0);
        assert_eq!(
            samples_of(&samples, &UPDATE_AVAILABLE)[0].label("client_version"),
            Some("1.84.0")
        );
    }

    #[tokio::test]
    async fn timestamps_are_exported_only_when_present() {
        let mut with_timestamps = device("dated", Some(timestamp("2024-05-01T12:00:00Z")));
        with_timestamps.created = Some(timestamp("2023-01-01T00:00:00Z"));
        with_timestamps.expires = Some(timestamp("2024-10-28T12:00:00Z"));
        let client = FakeTailscale {
            devices: vec![with_timestamps, device("undated", None)],
            ..Default::default()
        };

        let (result, samples) = run_update(collector().as_ref(), &client).await;
        result.unwrap();

        for (descriptor, expected) in [
            (&*LAST_SEEN, 1_714_564_800.0),
            (&*CREATED, 1_672_531_200.0),
            (&*EXPIRES, 1_730_116_800.0),
        ] {
            let emitted = samples_of(&samples, descriptor);
            assert_eq!(emitted.len(), 1, "{descriptor}");
            assert_eq!(emitted[0].label("id"), Some("dated"));
            assert_eq!(emitted[0].value, expected);
        }
    }

    #[tokio::test]
    async fn one_latency_sample_per_region() {
        let mut connected = device("connected", None);
        connected.client_connectivity = Some(ClientConnectivity {
            derp_latency: BTreeMap::from([
                (
                    "fra".to_string(),
                    DerpRegion {
                        preferred: true,
                        latency_ms: 12.5,
                    },
                ),
                (
                    "nyc".to_string(),
                    DerpRegion {
                        preferred: false,
                        latency_ms: 88.0,
                    },
                ),
            ]),
            ..Default::default()
        });
        let client = FakeTailscale {
            devices: vec![connected, device("disconnected", None)],
            ..Default::default()
        };

        let (result, samples) = run_update(collector().as_ref(), &client).await;
        result.unwrap();

        let latency: Vec<(&str, &str, f64)> = samples_of(&samples, &LATENCY)
            .into_iter()
            .map(|sample| {
                (
                    sample.label("id").unwrap(),
                    sample.label("derp_region").unwrap(),
                    sample.value,
                )
            })
            .collect();
        assert_eq!(latency, vec![("connected", "fra", 12.5), ("connected", "nyc", 88.0)]);
    }

    #[tokio::test]
    async fn fetch_error_emits_nothing() {
        let client = FakeTailscale {
            devices: vec![device("node", None)],
            devices_error: Some("boom"),
            ..Default::default()
        };

        let (result, samples) = run_update(collector().as_ref(), &client).await;
        assert!(matches!(
            result,
            Err(CollectorError::Fetch {
                resource: "devices",
                ..
            })
        ));
        assert!(samples.is_empty());
    }

    #[tokio::test]
    async fn repeated_updates_emit_identical_samples() {
        let client = FakeTailscale {
            devices: vec![device("node", Some(timestamp("2024-05-01T12:00:00Z")))],
            ..Default::default()
        };
        let collector = collector();

        let (_, first) = run_update(collector.as_ref(), &client).await;
        let (_, second) = run_update(collector.as_ref(), &client).await;
        assert_eq!(first, second);
    }
}
