// Client-side defaults and env/YAML configuration.
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub(crate) const DEFAULT_IDENTITY_URL: &str = "http://127.0.0.1:9000";
pub(crate) const DEFAULT_LOGIN_ROUTE: &str = "/login";
pub(crate) const DEFAULT_HOME_ROUTE: &str = "/dashboard";
/// Tokens this close to expiry are refreshed before navigation proceeds.
pub(crate) const DEFAULT_REFRESH_LEEWAY_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub identity_url: String,
    /// Directory holding the session snapshot. `None` keeps it in memory.
    pub snapshot_dir: Option<PathBuf>,
    pub login_route: String,
    pub default_route: String,
    pub refresh_leeway_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            snapshot_dir: None,
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            default_route: DEFAULT_HOME_ROUTE.to_string(),
            refresh_leeway_secs: DEFAULT_REFRESH_LEEWAY_SECS,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
struct ClientConfigOverride {
    identity_url: Option<String>,
    snapshot_dir: Option<PathBuf>,
    login_route: Option<String>,
    default_route: Option<String>,
    refresh_leeway_secs: Option<u64>,
}

impl ClientConfig {
    pub fn from_env_or_yaml(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::from_env();
        let override_path = config_path
            .map(|value| value.to_string())
            .or_else(|| std::env::var("PERFDESK_CLIENT_CONFIG").ok());
        if let Some(path) = override_path.as_deref() {
            let contents =
                fs::read_to_string(path).with_context(|| format!("read client config: {path}"))?;
            let override_cfg: ClientConfigOverride =
                serde_yaml::from_str(&contents).context("parse client config yaml")?;
            override_cfg.apply(&mut config);
        }
        Ok(config)
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var("PERFDESK_IDENTITY_URL")
            && !value.trim().is_empty()
        {
            config.identity_url = value;
        }
        if let Ok(value) = std::env::var("PERFDESK_SNAPSHOT_DIR")
            && !value.trim().is_empty()
        {
            config.snapshot_dir = Some(PathBuf::from(value));
        }
        if let Ok(value) = std::env::var("PERFDESK_LOGIN_ROUTE") {
            config.login_route = value;
        }
        if let Ok(value) = std::env::var("PERFDESK_DEFAULT_ROUTE") {
            config.default_route = value;
        }
        if let Some(value) = std::env::var("PERFDESK_REFRESH_LEEWAY_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
        {
            config.refresh_leeway_secs = value;
        }
        config
    }
}

impl ClientConfigOverride {
    fn apply(self, config: &mut ClientConfig) {
        if let Some(value) = self.identity_url {
            config.identity_url = value;
        }
        if let Some(value) = self.snapshot_dir {
            config.snapshot_dir = Some(value);
        }
        if let Some(value) = self.login_route {
            config.login_route = value;
        }
        if let Some(value) = self.default_route {
            config.default_route = value;
        }
        if let Some(value) = self.refresh_leeway_secs {
            config.refresh_leeway_secs = value;
        }
    }
}
