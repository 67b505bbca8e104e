//! Entities returned by the Tailscale API.
//!
//! Only the fields the exporter reads are modelled. Unknown fields are ignored and missing ones fall
//! back to their defaults, so the structs keep deserializing when the API grows.

use crate::time::optional_timestamp;
use chrono::{
    DateTime,
    Utc,
};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub node_id: String,
    pub name: String,
    pub hostname: String,
    pub os: String,
    pub client_version: String,
    pub user: String,
    pub addresses: Vec<String>,
    pub machine_key: String,
    pub node_key: String,
    pub tags: Vec<String>,
    pub authorized: bool,
    pub is_external: bool,
    pub update_available: bool,
    pub key_expiry_disabled: bool,
    pub blocks_incoming_connections: bool,
    pub advertised_routes: Vec<String>,
    pub enabled_routes: Vec<String>,
    pub client_connectivity: Option<ClientConnectivity>,
    #[serde(deserialize_with = "optional_timestamp")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "optional_timestamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "optional_timestamp")]
    pub expires: Option<DateTime<Utc>>,
}

impl Device {
    /// The first Tailscale address of the device, or an empty string if it has none.
    pub fn tailscale_ip(&self) -> &str {
        self.addresses.first().map(String::as_str).unwrap_or_default()
    }

    /// DERP latencies keyed by region, empty when the device did not report connectivity.
    pub fn derp_latency(&self) -> impl Iterator<Item = (&str, &DerpRegion)> {
        self.client_connectivity
            .iter()
            .flat_map(|connectivity| connectivity.derp_latency.iter())
            .map(|(region, latency)| (region.as_str(), latency))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConnectivity {
    pub endpoints: Vec<String>,
    #[serde(rename = "mappingVariesByDestIP")]
    pub mapping_varies_by_dest_ip: bool,
    #[serde(rename = "latency", alias = "derpLatency")]
    pub derp_latency: BTreeMap<String, DerpRegion>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DerpRegion {
    pub preferred: bool,
    pub latency_ms: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub display_name: String,
    pub login_name: String,
    pub profile_pic_url: String,
    pub tailnet_id: String,
    #[serde(rename = "type")]
    pub user_type: String,
    pub role: String,
    pub status: String,
    pub device_count: u64,
    pub currently_connected: bool,
    #[serde(deserialize_with = "optional_timestamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "optional_timestamp")]
    pub last_seen: Option<DateTime<Utc>>,
}

/// Filter for listing users by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum UserType {
    Member,
    Shared,
}

/// Filter for listing users by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum UserRole {
    Owner,
    Member,
    Admin,
    ItAdmin,
    NetworkAdmin,
    BillingAdmin,
    Auditor,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Key {
    pub id: String,
    pub key_type: String,
    pub user_id: String,
    pub description: String,
    #[serde(deserialize_with = "optional_timestamp")]
    pub created: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "optional_timestamp")]
    pub expires: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "optional_timestamp")]
    pub revoked: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DnsPreferences {
    #[serde(rename = "magicDNS")]
    pub magic_dns: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TailnetSettings {
    pub acls_externally_managed_on: bool,
    pub acls_external_link: String,
    pub devices_approval_on: bool,
    pub devices_auto_updates_on: bool,
    pub devices_key_duration_days: u32,
    pub users_approval_on: bool,
    pub users_role_allowed_to_join_external_tailnets: String,
    pub network_flow_logging_on: bool,
    pub regional_routing_on: bool,
    pub posture_identity_collection_on: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DeviceList {
    pub(crate) devices: Vec<Device>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct UserList {
    pub(crate) users: Vec<User>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct KeyList {
    pub(crate) keys: Vec<Key>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Nameservers {
    pub(crate) dns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;
    use pretty_assertions::assert_eq;

    #[test]
    fn device_from_api_json() {
        let device: Device = serde_json::from_value(serde_json::json!({
            "id": "device-123",
            "nodeId": "node-456",
            "name": "device-one.example.ts.net",
            "hostname": "device-one",
            "os": "linux",
            "clientVersion": "1.32.0",
            "user": "user@example.com",
            "addresses": ["100.64.0.1", "fd7a:115c:a1e0::1"],
            "machineKey": "mkey:abcd1234",
            "nodeKey": "nodekey:efgh5678",
            "authorized": true,
            "isExternal": false,
            "blocksIncomingConnections": true,
            "advertisedRoutes": ["10.0.0.0/24", "10.0.1.0/24"],
            "enabledRoutes": ["10.0.0.0/24"],
            "created": "2021-01-01T00:00:00Z",
            "lastSeen": "2021-02-01T00:00:00Z",
            "expires": "0001-01-01T00:00:00Z",
            "clientConnectivity": {
                "endpoints": ["198.51.100.1:41641"],
                "latency": {
                    "Frankfurt": { "latencyMs": 12.5, "preferred": true },
                    "New York City": { "latencyMs": 80.25 }
                }
            },
            "somethingNew": 42
        }))
        .unwrap();

        assert_eq!(device.tailscale_ip(), "100.64.0.1");
        assert!(device.authorized);
        assert!(device.blocks_incoming_connections);
        assert_eq!(device.created, Some(Utc.timestamp_opt(1_609_459_200, 0).unwrap()));
        assert_eq!(device.last_seen, Some(Utc.timestamp_opt(1_612_137_600, 0).unwrap()));
        assert_eq!(device.expires, None);
        assert_eq!(
            device
                .derp_latency()
                .map(|(region, latency)| (region, latency.latency_ms))
                .collect::<Vec<_>>(),
            vec![("Frankfurt", 12.5), ("New York City", 80.25)]
        );
    }

    #[test]
    fn device_without_connectivity_or_addresses() {
        let device: Device = serde_json::from_value(serde_json::json!({ "id": "bare" })).unwrap();
        assert_eq!(device.tailscale_ip(), "");
        assert_eq!(device.derp_latency().count(), 0);
    }

    #[test]
    fn user_type_is_read_from_type_field() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "loginName": "jane@example.com",
            "displayName": "Jane",
            "type": "member",
            "role": "it-admin",
            "status": "active",
            "currentlyConnected": true,
            "lastSeen": ""
        }))
        .unwrap();
        assert_eq!(user.user_type, "member");
        assert_eq!(user.role, "it-admin");
        assert!(user.currently_connected);
        assert_eq!(user.last_seen, None);
    }

    #[test]
    fn user_filters_use_api_spelling() {
        assert_eq!(UserRole::ItAdmin.as_ref(), "it-admin");
        assert_eq!(UserRole::BillingAdmin.to_string(), "billing-admin");
        assert_eq!(UserType::Shared.as_ref(), "shared");
    }

    #[test]
    fn settings_and_dns_preferences() {
        let settings: TailnetSettings = serde_json::from_value(serde_json::json!({
            "aclsExternallyManagedOn": true,
            "aclsExternalLink": "https://example.com/acls",
            "devicesKeyDurationDays": 90,
            "usersRoleAllowedToJoinExternalTailnets": "admin"
        }))
        .unwrap();
        assert!(settings.acls_externally_managed_on);
        assert_eq!(settings.acls_external_link, "https://example.com/acls");
        assert_eq!(settings.devices_key_duration_days, 90);
        assert!(!settings.devices_approval_on);

        let preferences: DnsPreferences = serde_json::from_str(r#"{"magicDNS": true}"#).unwrap();
        assert!(preferences.magic_dns);
    }
}
