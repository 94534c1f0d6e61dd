//! JSON-file backed credential store

use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use crate::credentials::{CredentialPair, CredentialStore, StoredSession};
use crate::error::{CoreError, CoreResult};
use crate::types::UserProfile;

pub const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Persists the session to a single JSON document.
///
/// Every mutation rewrites the whole document through a temporary file and a
/// rename, so readers never observe half of a token pair. On unix the file is
/// readable by its owner only.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store using the standard file name inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(CREDENTIALS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_session(&self) -> CoreResult<StoredSession> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(StoredSession::default()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                CoreError::storage(format!(
                    "corrupt credentials file {}: {e}",
                    self.path.display()
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredSession::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_session(&self, session: &StoredSession) -> CoreResult<()> {
        let contents = serde_json::to_vec_pretty(session)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, &contents))
            .await
            .map_err(|e| CoreError::storage(format!("credential write task failed: {e}")))?
    }

    async fn update<F>(&self, apply: F) -> CoreResult<()>
    where
        F: FnOnce(&mut StoredSession) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut session = self.read_session().await?;
        apply(&mut session);
        self.write_session(&session).await
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> CoreResult<Option<CredentialPair>> {
        Ok(self.read_session().await?.pair())
    }

    async fn save(&self, pair: &CredentialPair) -> CoreResult<()> {
        self.update(|session| session.set_pair(pair)).await
    }

    async fn clear(&self) -> CoreResult<()> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn load_user(&self) -> CoreResult<Option<UserProfile>> {
        Ok(self.read_session().await?.user)
    }

    async fn save_user(&self, user: &UserProfile) -> CoreResult<()> {
        self.update(|session| session.user = Some(user.clone()))
            .await
    }
}

/// Write `contents` to a uniquely named sibling, then rename it over `path`.
///
/// The sibling is owner-only before any token bytes reach it, and its unique
/// name keeps concurrent writers from different processes apart.
fn replace_file(path: &Path, contents: &[u8]) -> CoreResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| CoreError::from(e.error))?;
    Ok(())
}
