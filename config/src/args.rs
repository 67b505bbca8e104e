use clap::{
    Parser,
    Subcommand,
};
use std::{
    path::PathBuf,
    time::Duration,
};

/// Prometheus exporter for the Tailscale API
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Address to expose metrics on.
    #[clap(short, long, env = "TAILSCALE_EXPORTER_LISTEN_ADDRESS", value_name = "ADDRESS")]
    pub listen_address: Option<String>,

    /// Path under which metrics are exposed.
    #[clap(short, long, env = "TAILSCALE_EXPORTER_METRICS_PATH", value_name = "PATH")]
    pub metrics_path: Option<String>,

    /// Tailnet to export, e.g. `example.com`.
    ///   - falls back to `TS_TAILNET` and `TAILNET`
    #[clap(short, long, env = "TAILSCALE_TAILNET", value_name = "TAILNET")]
    pub tailnet: Option<String>,

    /// OAuth client id.
    ///   - falls back to `TS_OAUTH_CLIENT_ID`
    #[clap(long, env = "TAILSCALE_OAUTH_CLIENT_ID", value_name = "ID")]
    pub oauth_client_id: Option<String>,

    /// OAuth client secret.
    ///   - falls back to `TS_OAUTH_CLIENT_SECRET`
    #[clap(long, env = "TAILSCALE_OAUTH_CLIENT_SECRET", value_name = "SECRET", hide_env_values = true)]
    pub oauth_client_secret: Option<String>,

    /// Base URL of the Tailscale API.
    #[clap(long, env = "TAILSCALE_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Timeout for a single API request, e.g. `30s` or `1m`.
    #[clap(long, env = "TAILSCALE_EXPORTER_REQUEST_TIMEOUT", value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub request_timeout: Option<Duration>,

    /// Read configuration from this YAML file instead of `config.yaml` in the config directory.
    #[clap(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enables debug logging.
    #[clap(short, long, action)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print version information.
    Version,
}

const LEGACY_TAILNET: &[&str] = &["TS_TAILNET", "TAILNET"];
const LEGACY_OAUTH_CLIENT_ID: &[&str] = &["TS_OAUTH_CLIENT_ID"];
const LEGACY_OAUTH_CLIENT_SECRET: &[&str] = &["TS_OAUTH_CLIENT_SECRET"];

/// The first of `names` that `lookup` resolves to a non-empty value.
fn first_set(names: &[&str], lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    names
        .iter()
        .filter_map(|&name| lookup(name))
        .find(|value| !value.trim().is_empty())
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Args {
        pub(crate) fn collect_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Map<String, Value> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(listen_address) = &self.listen_address {
                cache.insert("listen_address".to_string(), listen_address.clone().into());
            }
            if let Some(metrics_path) = &self.metrics_path {
                cache.insert("metrics_path".to_string(), metrics_path.clone().into());
            }
            if let Some(tailnet) = self.tailnet.clone().or_else(|| first_set(LEGACY_TAILNET, &lookup)) {
                cache.insert("tailnet".to_string(), tailnet.into());
            }
            if let Some(id) = self
                .oauth_client_id
                .clone()
                .or_else(|| first_set(LEGACY_OAUTH_CLIENT_ID, &lookup))
            {
                cache.insert("oauth_client_id".to_string(), id.into());
            }
            if let Some(secret) = self
                .oauth_client_secret
                .clone()
                .or_else(|| first_set(LEGACY_OAUTH_CLIENT_SECRET, &lookup))
            {
                cache.insert("oauth_client_secret".to_string(), secret.into());
            }
            if let Some(api_url) = &self.api_url {
                cache.insert("api_url".to_string(), api_url.clone().into());
            }
            if let Some(timeout) = self.request_timeout {
                cache.insert(
                    "request_timeout".to_string(),
                    humantime::format_duration(timeout).to_string().into(),
                );
            }
            if self.verbose {
                cache.insert("verbose".to_string(), true.into());
            }
            cache
        }
    }

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            Ok(self.collect_with(|name| std::env::var(name).ok()))
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();

    format!(
        "\
{version}

Authors: {author}

Config directory: {config_dir_path}",
        version = env!("CARGO_PKG_VERSION"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Value;
    use pretty_assertions::assert_eq;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "tailscale-exporter",
            "--listen-address",
            ":9999",
            "-t",
            "example.com",
            "--request-timeout",
            "1m 30s",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.listen_address.as_deref(), Some(":9999"));
        assert_eq!(args.tailnet.as_deref(), Some("example.com"));
        assert_eq!(args.request_timeout, Some(Duration::from_secs(90)));
        assert!(args.verbose);
        assert_eq!(args.command, None);
    }

    #[test]
    fn version_subcommand() {
        let args = Args::try_parse_from(["tailscale-exporter", "version"]).unwrap();
        assert_eq!(args.command, Some(Command::Version));
    }

    #[test]
    fn only_given_values_are_collected() {
        let args = Args {
            metrics_path: Some("/prom".to_string()),
            request_timeout: Some(Duration::from_secs(5)),
            ..Default::default()
        };

        let collected = args.collect_with(no_env);
        let mut keys: Vec<&str> = collected.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["metrics_path", "request_timeout"]);
        assert_eq!(
            collected["request_timeout"].clone().into_string().unwrap(),
            "5s"
        );
    }

    #[test]
    fn legacy_variables_are_fallbacks() {
        let env = |name: &str| match name {
            "TS_TAILNET" => Some("  ".to_string()),
            "TAILNET" => Some("legacy.example.com".to_string()),
            "TS_OAUTH_CLIENT_ID" => Some("legacy-id".to_string()),
            "TS_OAUTH_CLIENT_SECRET" => Some("legacy-secret".to_string()),
            _ => None,
        };

        let collected = Args::default().collect_with(env);
        let value = |key: &str| collected.get(key).cloned().map(Value::into_string).map(Result::unwrap);
        assert_eq!(value("tailnet").as_deref(), Some("legacy.example.com"));
        assert_eq!(value("oauth_client_id").as_deref(), Some("legacy-id"));
        assert_eq!(value("oauth_client_secret").as_deref(), Some("legacy-secret"));

        let explicit = Args {
            tailnet: Some("example.com".to_string()),
            ..Default::default()
        };
        let collected = explicit.collect_with(env);
        assert_eq!(
            collected["tailnet"].clone().into_string().unwrap(),
            "example.com"
        );
    }
}
