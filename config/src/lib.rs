#[macro_use]
extern crate tracing;

mod app_config;
mod args;

use app_config::AppConfig;
pub use app_config::get_config_dir;
pub use args::{
    version,
    Args,
    Command,
};
use color_eyre::Result;
use eyre::{
    bail,
    Context as _,
};
use serde::{
    Deserialize,
    Deserializer,
};
use std::{
    fmt,
    net::{
        AddrParseError,
        SocketAddr,
    },
    time::Duration,
};
use url::Url;

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

/// Paths the HTTP server reserves for itself.
const RESERVED_PATHS: &[&str] = &["/", "/healthz"];

#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    app_config: AppConfig,
    #[serde(deserialize_with = "deserialize_listen_address")]
    pub listen_address: SocketAddr,
    pub metrics_path: String,
    #[serde(default)]
    pub tailnet: String,
    #[serde(default)]
    pub oauth_client_id: String,
    #[serde(default)]
    pub oauth_client_secret: String,
    pub api_url: Url,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    #[serde(default)]
    pub verbose: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("config_dir", &self.app_config.config_dir)
            .field("listen_address", &self.listen_address)
            .field("metrics_path", &self.metrics_path)
            .field("tailnet", &self.tailnet)
            .field("oauth_client_id", &self.oauth_client_id)
            .field("oauth_client_secret", &"<redacted>")
            .field("api_url", &self.api_url.as_str())
            .field("request_timeout", &self.request_timeout)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl Config {
    /// Layers the built-in defaults, the YAML config file and `args` (which includes the
    /// environment), then validates the result.
    pub fn new(args: &Args) -> Result<Self> {
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("config_dir", config_dir.display().to_string())?
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml));

        builder = match &args.config {
            Some(path) => builder.add_source(
                config::File::from(path.as_path())
                    .format(config::FileFormat::Yaml)
                    .required(true),
            ),
            None => builder.add_source(
                config::File::from(config_dir.join("config.yaml"))
                    .format(config::FileFormat::Yaml)
                    .required(false),
            ),
        };

        builder = builder.add_source(args.clone());

        let mut cfg: Self = builder
            .build()
            .and_then(config::Config::try_deserialize)
            .context("Failed to load configuration")?;
        cfg.normalize();
        cfg.validate()?;

        debug!(config = ?cfg, "Loaded configuration");
        Ok(cfg)
    }

    fn normalize(&mut self) {
        for value in [
            &mut self.metrics_path,
            &mut self.tailnet,
            &mut self.oauth_client_id,
            &mut self.oauth_client_secret,
        ] {
            let trimmed = value.trim();
            if trimmed.len() != value.len() {
                *value = trimmed.to_string();
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.tailnet.is_empty() {
            bail!("A tailnet is required, set --tailnet or TAILSCALE_TAILNET");
        }
        if self.oauth_client_id.is_empty() || self.oauth_client_secret.is_empty() {
            bail!(
                "OAuth client credentials are required, set --oauth-client-id and --oauth-client-secret \
                 or TAILSCALE_OAUTH_CLIENT_ID and TAILSCALE_OAUTH_CLIENT_SECRET"
            );
        }
        if !self.metrics_path.starts_with('/') {
            bail!("The metrics path must start with '/', got {:?}", self.metrics_path);
        }
        if RESERVED_PATHS.contains(&self.metrics_path.as_str()) {
            bail!("The metrics path {:?} is reserved", self.metrics_path);
        }
        Ok(())
    }
}

/// Accepts `host:port` as well as the `:port` shorthand for all interfaces.
pub fn parse_listen_address(address: &str) -> Result<SocketAddr, AddrParseError> {
    let address = address.trim();
    match address.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}").parse(),
        None => address.parse(),
    }
}

fn deserialize_listen_address<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SocketAddr, D::Error> {
    let address = String::deserialize(deserializer)?;
    parse_listen_address(&address).map_err(serde::de::Error::custom)
}
