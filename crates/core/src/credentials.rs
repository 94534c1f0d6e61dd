//! Credential storage capability
//!
//! The session is persisted under three fixed keys: `access_token`, `refresh_token`
//! and `user`. The token pair is always written and cleared as a unit.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::CoreResult;
use crate::types::UserProfile;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

/// Access token plus the refresh token it was issued with
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: Some(refresh_token.into()),
        }
    }

    /// A pair that cannot be refreshed
    pub fn access_only(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
        }
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Everything a session persists, laid out under the fixed key names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

impl StoredSession {
    /// The stored pair, present only when an access token is stored
    pub fn pair(&self) -> Option<CredentialPair> {
        self.access_token.as_ref().map(|access| CredentialPair {
            access_token: access.clone(),
            refresh_token: self.refresh_token.clone(),
        })
    }

    pub fn set_pair(&mut self, pair: &CredentialPair) {
        self.access_token = Some(pair.access_token.clone());
        self.refresh_token = pair.refresh_token.clone();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Durable storage for the session credentials and the cached user profile
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the current token pair
    async fn load(&self) -> CoreResult<Option<CredentialPair>>;

    /// Overwrite both tokens
    async fn save(&self, pair: &CredentialPair) -> CoreResult<()>;

    /// Remove both tokens and the cached user
    async fn clear(&self) -> CoreResult<()>;

    async fn load_user(&self) -> CoreResult<Option<UserProfile>>;

    async fn save_user(&self, user: &UserProfile) -> CoreResult<()>;
}

/// Process-local store, mainly for tests and short-lived tools
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    session: RwLock<StoredSession>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a pair
    pub fn with_pair(pair: CredentialPair) -> Self {
        let mut session = StoredSession::default();
        session.set_pair(&pair);
        Self {
            session: RwLock::new(session),
        }
    }

    /// Copy of everything currently stored
    pub async fn snapshot(&self) -> StoredSession {
        self.session.read().await.clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> CoreResult<Option<CredentialPair>> {
        Ok(self.session.read().await.pair())
    }

    async fn save(&self, pair: &CredentialPair) -> CoreResult<()> {
        self.session.write().await.set_pair(pair);
        Ok(())
    }

    async fn clear(&self) -> CoreResult<()> {
        self.session.write().await.clear();
        Ok(())
    }

    async fn load_user(&self) -> CoreResult<Option<UserProfile>> {
        Ok(self.session.read().await.user.clone())
    }

    async fn save_user(&self, user: &UserProfile) -> CoreResult<()> {
        self.session.write().await.user = Some(user.clone());
        Ok(())
    }
}
