use crate::error::{ActionError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

pub const CONFIG_ENV: &str = "COMPONENT_ADD_CONFIG";
pub const SERVER_ENV: &str = "FTRACK_SERVER";
pub const API_USER_ENV: &str = "FTRACK_API_USER";
pub const API_KEY_ENV: &str = "FTRACK_API_KEY";
pub const LISTEN_ENV: &str = "COMPONENT_ADD_LISTEN";

const USERNAME_ENVS: [&str; 3] = ["USER", "USERNAME", "LOGNAME"];

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub api_user: Option<String>,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Local user the hub subscriptions are scoped to.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8731))
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: None,
            api_user: None,
            api_key: None,
            username: None,
            listen: default_listen(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Connection settings for the remote directory, all present.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub server_url: String,
    pub api_user: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Config {
    pub fn load_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Resolve from the process environment: the YAML file named by
    /// `COMPONENT_ADD_CONFIG` (if any), then variable overrides.
    pub fn from_env() -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable lookup.
    pub fn resolve<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut cfg = match var(CONFIG_ENV) {
            Some(path) => Self::load_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(v) = var(SERVER_ENV) {
            cfg.server_url = Some(v);
        }
        if let Some(v) = var(API_USER_ENV) {
            cfg.api_user = Some(v);
        }
        if let Some(v) = var(API_KEY_ENV) {
            cfg.api_key = Some(v);
        }
        if let Some(v) = var(LISTEN_ENV) {
            cfg.listen = v
                .parse()
                .map_err(|e| ActionError::Config(format!("{LISTEN_ENV}='{v}': {e}")))?;
        }
        if cfg.username.is_none() {
            cfg.username = USERNAME_ENVS.iter().find_map(|&k| var(k));
        }
        Ok(cfg)
    }

    pub fn username(&self) -> Result<&str> {
        self.username
            .as_deref()
            .ok_or_else(|| ActionError::Config("cannot determine the local username".into()))
    }

    /// Check that everything needed to reach the remote directory is set.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let required = |value: &Option<String>, env: &str| {
            value
                .clone()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ActionError::Config(format!("missing {env}")))
        };
        if self.timeout_secs == 0 {
            return Err(ActionError::Config("timeout_secs must be positive".into()));
        }
        Ok(ClientConfig {
            server_url: required(&self.server_url, SERVER_ENV)?
                .trim_end_matches('/')
                .to_string(),
            api_user: required(&self.api_user, API_USER_ENV)?,
            api_key: required(&self.api_key, API_KEY_ENV)?,
            timeout_secs: self.timeout_secs,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
