//! Platform-specific state directory management

use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::warn;

/// Environment variable that relocates all local state
pub const STATE_DIR_ENV: &str = "CARELINK_STATE_DIR";

/// Where credentials, logs and the user config file live
pub struct StateDir {
    /// Project directories from the directories crate
    project_dirs: Option<ProjectDirs>,
    /// Override directory for testing or custom installations
    override_dir: Option<PathBuf>,
}

impl StateDir {
    pub fn new() -> Self {
        let project_dirs = ProjectDirs::from("com", "carelink", "carelink");
        if project_dirs.is_none() {
            warn!("Failed to determine platform-specific directories, will use fallback");
        }
        Self {
            project_dirs,
            override_dir: None,
        }
    }

    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        Self {
            project_dirs: None,
            override_dir: Some(path.into()),
        }
    }

    /// `--data-dir`, then `CARELINK_STATE_DIR`, then the platform default
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        match explicit.or_else(|| std::env::var_os(STATE_DIR_ENV).map(PathBuf::from)) {
            Some(dir) => Self::with_override(dir),
            None => Self::new(),
        }
    }

    pub fn config_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("config");
        }

        if let Some(project_dirs) = &self.project_dirs {
            project_dirs.config_dir().to_path_buf()
        } else {
            PathBuf::from("./config")
        }
    }

    /// Directory for persistent storage such as the credential file
    pub fn data_dir(&self) -> PathBuf {
        if let Some(override_dir) = &self.override_dir {
            return override_dir.join("data");
        }

        if let Some(project_dirs) = &self.project_dirs {
            project_dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from("./data")
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir().join("carelink.log")
    }

    /// Per-user config file, consulted when `--config` is not given
    pub fn user_config_file(&self) -> PathBuf {
        self.config_dir().join("carelink.toml")
    }
}

impl Default for StateDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_layout() {
        let state = StateDir::with_override("/tmp/carelink-test");
        assert_eq!(state.data_dir(), PathBuf::from("/tmp/carelink-test/data"));
        assert_eq!(
            state.user_config_file(),
            PathBuf::from("/tmp/carelink-test/config/carelink.toml")
        );
        assert_eq!(
            state.log_file(),
            PathBuf::from("/tmp/carelink-test/data/carelink.log")
        );
    }

    #[test]
    fn explicit_dir_wins() {
        let state = StateDir::resolve(Some(PathBuf::from("/srv/care")));
        assert_eq!(state.config_dir(), PathBuf::from("/srv/care/config"));
    }
}
