use crate::{
    error::ApiError,
    models::*,
};
use chrono::{
    DateTime,
    TimeDelta,
    Utc,
};
use serde::{
    de::DeserializeOwned,
    Deserialize,
};
use std::{
    fmt,
    future::Future,
    time::{
        Duration,
        Instant,
    },
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.tailscale.com";

/// Scopes requested for the OAuth client. All of them are read-only.
pub const OAUTH_SCOPES: &[&str] = &[
    "devices:read",
    "users:read",
    "dns:read",
    "auth_keys:read",
    "feature_settings:read",
    "policy_file:read",
];

/// Tokens are renewed this long before the API considers them expired.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Longer `expires_in` values are clamped to this.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub tailnet: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("tailnet", &self.tailnet)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    pub token_type: String,
    pub scope: String,
    pub expires_at: DateTime<Utc>,
    refresh_at: Instant,
}

impl AccessToken {
    fn from_response(response: TokenResponse) -> Self {
        let lifetime = Duration::from_secs(response.expires_in).min(MAX_TOKEN_LIFETIME);
        let expires_at = Utc::now() + TimeDelta::from_std(lifetime).unwrap_or(TimeDelta::zero());
        Self {
            secret: response.access_token,
            token_type: response.token_type,
            scope: response.scope,
            expires_at,
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN),
        }
    }

    fn is_fresh(&self) -> bool {
        Instant::now() < self.refresh_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
    #[serde(default)]
    expires_in: u64,
    #[serde(default)]
    scope: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Client for the Tailscale API v2, scoped to one tailnet.
///
/// Authenticates with the OAuth client credentials flow. The access token is cached and renewed
/// shortly before it expires, so a single client can be shared by all collectors.
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
    token: Mutex<Option<AccessToken>>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ApiError::Transport {
                url: config.base_url.to_string(),
                source,
            })?;

        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    /// Returns a valid access token, requesting a new one if the cached token is about to expire.
    pub async fn token(&self, ctx: &CancellationToken) -> Result<AccessToken, ApiError> {
        cancellable(ctx, self.current_token()).await
    }

    pub async fn list_devices(&self, ctx: &CancellationToken) -> Result<Vec<Device>, ApiError> {
        let list: DeviceList = self.get(ctx, &["devices"], &[("fields", "all")]).await?;
        Ok(list.devices)
    }

    pub async fn list_users(
        &self,
        ctx: &CancellationToken,
        user_type: Option<UserType>,
        role: Option<UserRole>,
    ) -> Result<Vec<User>, ApiError> {
        let mut query = Vec::new();
        if let Some(user_type) = &user_type {
            query.push(("type", user_type.as_ref()));
        }
        if let Some(role) = &role {
            query.push(("role", role.as_ref()));
        }
        let list: UserList = self.get(ctx, &["users"], &query).await?;
        Ok(list.users)
    }

    pub async fn list_keys(&self, ctx: &CancellationToken, all: bool) -> Result<Vec<Key>, ApiError> {
        let all = if all { "true" } else { "false" };
        let list: KeyList = self.get(ctx, &["keys"], &[("all", all)]).await?;
        Ok(list.keys)
    }

    pub async fn dns_nameservers(&self, ctx: &CancellationToken) -> Result<Vec<String>, ApiError> {
        let nameservers: Nameservers = self.get(ctx, &["dns", "nameservers"], &[]).await?;
        Ok(nameservers.dns)
    }

    pub async fn dns_preferences(&self, ctx: &CancellationToken) -> Result<DnsPreferences, ApiError> {
        self.get(ctx, &["dns", "preferences"], &[]).await
    }

    pub async fn tailnet_settings(&self, ctx: &CancellationToken) -> Result<TailnetSettings, ApiError> {
        self.get(ctx, &["settings"], &[]).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        ctx: &CancellationToken,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        cancellable(ctx, async {
            let token = self.current_token().await?;

            let mut path = vec!["tailnet", self.config.tailnet.as_str()];
            path.extend_from_slice(segments);
            let mut url = self.endpoint(&path)?;
            if !query.is_empty() {
                url.query_pairs_mut().extend_pairs(query);
            }

            trace!(%url, "GET");
            let response = self
                .http
                .get(url.clone())
                .bearer_auth(&token.secret)
                .send()
                .await
                .map_err(|source| ApiError::Transport {
                    url: url.to_string(),
                    source,
                })?;

            decode(&url, response).await
        })
        .await
    }

    async fn current_token(&self) -> Result<AccessToken, ApiError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh()) {
            return Ok(token.clone());
        }

        let token = self.request_token().await?;
        debug!(expires_at = %token.expires_at, scope = %token.scope, "obtained OAuth access token");
        *cached = Some(token.clone());
        Ok(token)
    }

    async fn request_token(&self) -> Result<AccessToken, ApiError> {
        let url = self.endpoint(&["oauth", "token"])?;
        let scope = OAUTH_SCOPES.join(" ");
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", scope.as_str()),
        ];

        let response = self
            .http
            .post(url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        let response: TokenResponse = decode(&url, response).await?;
        Ok(AccessToken::from_response(response))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(["api", "v2"])
            .extend(segments);
        Ok(url)
    }
}

async fn decode<T: DeserializeOwned>(url: &Url, response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .map(|error| error.message)
            .filter(|message| !message.is_empty())
            .unwrap_or(body);
        return Err(ApiError::Status {
            url: url.to_string(),
            status,
            message: message.trim().to_string(),
        });
    }

    response.json().await.map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

async fn cancellable<T>(
    ctx: &CancellationToken,
    request: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(ApiError::Cancelled),
        result = request => result,
    }
}
