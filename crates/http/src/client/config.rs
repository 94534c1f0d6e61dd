//! Client configuration

use carelink_core::{ValidateConfig, validators};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment prefix, e.g. `CARELINK__BASE_URL`
pub const ENV_PREFIX: &str = "CARELINK";

/// Files picked up from the working directory when present
const DEFAULT_CONFIG_FILES: [&str; 2] = ["carelink.toml", "config/carelink.toml"];

/// What to do when a request is made with no stored access token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTokenPolicy {
    /// Fail locally with `NotAuthenticated` before touching the network
    #[default]
    FailFast,
    /// Send without an `Authorization` header and let the backend decide
    PassThrough,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Whole-request timeout in seconds, 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Route handed to the session-expired hook
    #[serde(default = "default_login_route")]
    pub login_route: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default)]
    pub missing_token: MissingTokenPolicy,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("carelink/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_login_route() -> String {
    "/login".to_string()
}

fn default_refresh_path() -> String {
    "/api/users/refresh".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            login_route: default_login_route(),
            refresh_path: default_refresh_path(),
            missing_token: MissingTokenPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Load defaults, then the optional config files, then `CARELINK__*` variables.
    /// An explicit `path` must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        for candidate in DEFAULT_CONFIG_FILES {
            builder = builder.add_source(File::with_name(candidate).required(false));
        }

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl ValidateConfig for ClientConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validators::validate_url(&self.base_url, "base_url")?;
        validators::validate_range(self.timeout_secs, 0, 600, "timeout_secs")?;
        validators::validate_not_empty(&self.user_agent, "user_agent")?;
        validators::validate_path(&self.login_route, "login_route")?;
        validators::validate_path(&self.refresh_path, "refresh_path")?;
        Ok(())
    }
}
