//! Every metric the exporter can emit.
//!
//! Descriptors are built once on first use and shared read-only afterwards. A fully-qualified name
//! must never appear twice with different label names; `all` lists the whole catalog so tests can
//! check that.

use super::descriptor::{
    describe,
    Descriptor,
};
use lazy_static::lazy_static;

pub mod scrape {
    use super::*;

    lazy_static! {
        pub static ref UP: Descriptor = describe("", "up", "Whether the Tailscale API is accessible.", &[]);
        pub static ref COLLECTOR_DURATION: Descriptor = describe(
            "scrape",
            "collector_duration_seconds",
            "tailscale_exporter: Duration of a collector scrape.",
            &["collector"],
        );
        pub static ref COLLECTOR_SUCCESS: Descriptor = describe(
            "scrape",
            "collector_success",
            "tailscale_exporter: Whether a collector succeeded.",
            &["collector"],
        );
    }
}

pub mod devices {
    use super::*;

    pub const SUBSYSTEM: &str = "devices";

    const LABELS: &[&str] = &["id", "name", "hostname", "os", "user"];

    lazy_static! {
        pub static ref INFO: Descriptor = describe(
            SUBSYSTEM,
            "info",
            "Device information",
            &[
                "id",
                "name",
                "hostname",
                "os",
                "client_version",
                "user",
                "tailscale_ip",
                "machine_key",
                "node_key",
            ],
        );
        pub static ref ONLINE: Descriptor = describe(
            SUBSYSTEM,
            "online",
            "Whether device is online (last seen within 5 minutes)",
            LABELS,
        );
        pub static ref AUTHORIZED: Descriptor = describe(SUBSYSTEM, "authorized", "Whether device is authorized", LABELS);
        pub static ref EXTERNAL: Descriptor = describe(SUBSYSTEM, "external", "Whether device is external", LABELS);
        pub static ref UPDATE_AVAILABLE: Descriptor = describe(
            SUBSYSTEM,
            "update_available",
            "Whether device has update available",
            &["id", "name", "hostname", "os", "user", "client_version"],
        );
        pub static ref KEY_EXPIRY_DISABLED: Descriptor = describe(
            SUBSYSTEM,
            "key_expiry_disabled",
            "Whether device key expiry is disabled",
            LABELS,
        );
        pub static ref BLOCKS_INCOMING: Descriptor = describe(
            SUBSYSTEM,
            "blocks_incoming",
            "Whether device blocks incoming connections",
            LABELS,
        );
        pub static ref ROUTES_ADVERTISED: Descriptor = describe(
            SUBSYSTEM,
            "routes_advertised",
            "Number of routes advertised by device",
            LABELS,
        );
        pub static ref ROUTES_ENABLED: Descriptor = describe(
            SUBSYSTEM,
            "routes_enabled",
            "Number of routes enabled for device",
            LABELS,
        );
        pub static ref LAST_SEEN: Descriptor = describe(
            SUBSYSTEM,
            "last_seen_timestamp",
            "Unix timestamp when device was last seen",
            LABELS,
        );
        pub static ref EXPIRES: Descriptor = describe(
            SUBSYSTEM,
            "expires_timestamp",
            "Unix timestamp when device key expires",
            LABELS,
        );
        pub static ref CREATED: Descriptor = describe(
            SUBSYSTEM,
            "created_timestamp",
            "Unix timestamp when device was created",
            LABELS,
        );
        pub static ref LATENCY: Descriptor = describe(
            SUBSYSTEM,
            "latency_ms",
            "Device latency in milliseconds",
            &["id", "name", "hostname", "os", "user", "derp_region"],
        );
    }
}

pub mod users {
    use super::*;

    pub const SUBSYSTEM: &str = "users";

    const LABELS: &[&str] = &["id", "login_name", "display_name"];

    lazy_static! {
        pub static ref INFO: Descriptor = describe(
            SUBSYSTEM,
            "info",
            "Users information and status",
            &["id", "login_name", "display_name", "role", "status", "type"],
        );
        pub static ref CURRENTLY_LOGGED_IN: Descriptor = describe(
            SUBSYSTEM,
            "currently_logged_in",
            "Whether user is currently logged in",
            LABELS,
        );
        pub static ref LAST_SEEN: Descriptor = describe(
            SUBSYSTEM,
            "last_seen_timestamp",
            "Unix timestamp when user was last seen",
            LABELS,
        );
        pub static ref CREATED: Descriptor = describe(
            SUBSYSTEM,
            "created_timestamp",
            "Unix timestamp when user was created",
            LABELS,
        );
    }
}

pub mod keys {
    use super::*;

    pub const SUBSYSTEM: &str = "keys";

    const LABELS: &[&str] = &["id", "key_type", "user_id"];

    lazy_static! {
        pub static ref INFO: Descriptor = describe(SUBSYSTEM, "info", "Key information.", LABELS);
        pub static ref CREATED: Descriptor = describe(
            SUBSYSTEM,
            "created_timestamp",
            "Timestamp when the key was created.",
            LABELS,
        );
        pub static ref EXPIRES: Descriptor = describe(
            SUBSYSTEM,
            "expires_timestamp",
            "Timestamp when the key expires.",
            LABELS,
        );
    }
}

pub mod dns {
    use super::*;

    pub const SUBSYSTEM: &str = "dns";

    lazy_static! {
        pub static ref NAMESERVERS_INFO: Descriptor = describe(
            SUBSYSTEM,
            "nameservers_info",
            "Tailscale DNS nameserver configuration.",
            &["nameserver"],
        );
        pub static ref MAGIC_DNS: Descriptor =
            describe(SUBSYSTEM, "magic_dns", "Tailscale Magic DNS configuration.", &[]);
    }
}

pub mod tailnet_settings {
    use super::*;

    pub const SUBSYSTEM: &str = "tailnet_settings";

    lazy_static! {
        pub static ref INFO: Descriptor = describe(
            SUBSYSTEM,
            "info",
            "Information about the Tailscale Tailnet settings.",
            &[
                "acls_externally_managed_on",
                "acls_external_link",
                "devices_approval_on",
                "devices_auto_updates_on",
                "users_approval_on",
                "users_role_allowed_to_join_external_tailnets",
                "network_flow_logging_on",
                "regional_routing_on",
                "posture_identity_collection_on",
            ],
        );
        pub static ref DEVICES_KEY_DURATION_DAYS: Descriptor = describe(
            SUBSYSTEM,
            "devices_key_duration_days",
            "Number of days before device key expiry.",
            &[],
        );
    }
}

/// The complete catalog.
pub fn all() -> Vec<&'static Descriptor> {
    vec![
        &*scrape::UP,
        &*scrape::COLLECTOR_DURATION,
        &*scrape::COLLECTOR_SUCCESS,
        &*devices::INFO,
        &*devices::ONLINE,
        &*devices::AUTHORIZED,
        &*devices::EXTERNAL,
        &*devices::UPDATE_AVAILABLE,
        &*devices::KEY_EXPIRY_DISABLED,
        &*devices::BLOCKS_INCOMING,
        &*devices::ROUTES_ADVERTISED,
        &*devices::ROUTES_ENABLED,
        &*devices::LAST_SEEN,
        &*devices::EXPIRES,
        &*devices::CREATED,
        &*devices::LATENCY,
        &*users::INFO,
        &*users::CURRENTLY_LOGGED_IN,
        &*users::LAST_SEEN,
        &*users::CREATED,
        &*keys::INFO,
        &*keys::CREATED,
        &*keys::EXPIRES,
        &*dns::NAMESERVERS_INFO,
        &*dns::MAGIC_DNS,
        &*tailnet_settings::INFO,
        &*tailnet_settings::DEVICES_KEY_DURATION_DAYS,
    ]
}
