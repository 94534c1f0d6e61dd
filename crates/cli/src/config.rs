//! CLI configuration utilities

use anyhow::{Context, Result};
use carelink_core::ValidateConfig;
use carelink_http::ClientConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve the client configuration.
///
/// An explicit `--config` file wins over the per-user file in the state
/// directory; `--base-url` is applied last.
pub fn load_client_config(
    explicit: Option<&Path>,
    user_file: &Path,
    base_url: Option<String>,
) -> Result<ClientConfig> {
    let file: Option<PathBuf> = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None if user_file.is_file() => Some(user_file.to_path_buf()),
        None => None,
    };
    debug!(config_file = ?file, "loading client configuration");

    let mut config = ClientConfig::load(file.as_deref())
        .with_context(|| format!("failed to load configuration from {file:?}"))?;

    if let Some(base_url) = base_url {
        config.base_url = base_url;
        config.validate().context("invalid --base-url")?;
    }

    Ok(config)
}
