//! Per-resource views of the Tailscale API.
//!
//! Each collector only sees the trait for its own resource. The HTTP [`Client`] implements all of
//! them; tests substitute fakes.

use std::{
    future::Future,
    pin::Pin,
};
pub use tailscale_exporter_client::{
    ApiError,
    Client,
    Device,
    DnsPreferences,
    Key,
    TailnetSettings,
    User,
    UserRole,
    UserType,
};
use tokio_util::sync::CancellationToken;

pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

pub trait DevicesApi: Send + Sync {
    fn list<'a>(&'a self, ctx: &'a CancellationToken) -> ApiFuture<'a, Vec<Device>>;
}

pub trait UsersApi: Send + Sync {
    fn list<'a>(
        &'a self,
        ctx: &'a CancellationToken,
        user_type: Option<UserType>,
        role: Option<UserRole>,
    ) -> ApiFuture<'a, Vec<User>>;
}

pub trait KeysApi: Send + Sync {
    fn list<'a>(&'a self, ctx: &'a CancellationToken, all: bool) -> ApiFuture<'a, Vec<Key>>;
}

pub trait DnsApi: Send + Sync {
    fn nameservers<'a>(&'a self, ctx: &'a CancellationToken) -> ApiFuture<'a, Vec<String>>;

    fn preferences<'a>(&'a self, ctx: &'a CancellationToken) -> ApiFuture<'a, DnsPreferences>;
}

pub trait TailnetSettingsApi: Send + Sync {
    fn get<'a>(&'a self, ctx: &'a CancellationToken) -> ApiFuture<'a, TailnetSettings>;
}

/// Hands out the per-resource views.
pub trait TailscaleApi: Send + Sync {
    fn devices(&self) -> &dyn DevicesApi;

    fn users(&self) -> &dyn UsersApi;

    fn keys(&self) -> &dyn KeysApi;

    fn dns(&self) -> &dyn DnsApi;

    fn tailnet_settings(&self) -> &dyn TailnetSettingsApi;
}

impl DevicesApi for Client {
    fn list<'a>(&'a self, ctx: &'a CancellationToken) -> ApiFuture<'a, Vec<Device>> {
        Box::pin(self.list_devices(ctx))
    }
}

impl UsersApi for Client {
    fn list<'a>(
        &'a self,
        ctx: &'a CancellationToken,
        user_type: Option<UserType>,
        role: Option<UserRole>,
    ) -> ApiFuture<'a, Vec<User>> {
        Box::pin(self.list_users(ctx, user_type, role))
    }
}

impl KeysApi for Client {
    fn list<'a>(&'a self, ctx: &'a CancellationToken, all: bool) -> ApiFuture<'a, Vec<Key>> {
        Box::pin(self.list_keys(ctx, all))
    }
}

impl DnsApi for Client {
    fn nameservers<'a>(&'a self, ctx: &'a CancellationToken) -> ApiFuture<'a, Vec<String>> {
        Box::pin(self.dns_nameservers(ctx))
    }

    fn preferences<'a>(&'a self, ctx: &'a CancellationToken) -> ApiFuture<'a, DnsPreferences> {
        Box::pin(self.dns_preferences(ctx))
    }
}

impl TailnetSettingsApi for Client {
    fn get<'a>(&'a self, ctx: &'a CancellationToken) -> ApiFuture<'a, TailnetSettings> {
        Box::pin(self.tailnet_settings(ctx))
    }
}

impl TailscaleApi for Client {
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
