//! Bearer-token request client with transparent refresh
//!
//! Every request carries the stored access token. A `401` triggers one
//! refresh-token exchange and exactly one retry; a rejected refresh wipes the
//! stored credentials and reports [`ClientError::SessionExpired`].

use carelink_core::{CredentialPair, CredentialStore, RefreshRequest, TokenResponse};
use reqwest::{Client, Response, StatusCode};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::config::MissingTokenPolicy;
use super::error::ClientError;
use super::request::RequestOptions;

/// Notified after a failed refresh has wiped the stored credentials
pub trait SessionExpiredHandler: Send + Sync {
    fn session_expired(&self, login_route: &str);
}

impl<F> SessionExpiredHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn session_expired(&self, login_route: &str) {
        self(login_route)
    }
}

/// Default hook: log where the user has to go next
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSessionExpired;

impl SessionExpiredHandler for LogSessionExpired {
    fn session_expired(&self, login_route: &str) {
        warn!(login_route, "session expired, sign in again");
    }
}

#[derive(Clone)]
pub struct AuthenticatedRequestClient {
    http: Client,
    base_url: String,
    refresh_url: Url,
    login_route: String,
    missing_token: MissingTokenPolicy,
    store: Arc<dyn CredentialStore>,
    on_expired: Arc<dyn SessionExpiredHandler>,
    refresh_guard: Arc<Mutex<()>>,
}

impl fmt::Debug for AuthenticatedRequestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedRequestClient")
            .field("base_url", &self.base_url)
            .field("refresh_url", &self.refresh_url.as_str())
            .field("login_route", &self.login_route)
            .field("missing_token", &self.missing_token)
            .finish_non_exhaustive()
    }
}

impl AuthenticatedRequestClient {
    pub(crate) fn new(
        http: Client,
        base_url: String,
        refresh_path: &str,
        login_route: String,
        missing_token: MissingTokenPolicy,
        store: Arc<dyn CredentialStore>,
        on_expired: Arc<dyn SessionExpiredHandler>,
    ) -> Result<Self, ClientError> {
        let refresh_url = Url::parse(&format!("{base_url}{refresh_path}"))
            .map_err(|e| ClientError::Configuration(format!("invalid refresh URL: {e}")))?;
        Ok(Self {
            http,
            base_url,
            refresh_url,
            login_route,
            missing_token,
            store,
            on_expired,
            refresh_guard: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Send `options` with the stored bearer token, refreshing once on `401`.
    ///
    /// Non-401 responses are returned untouched, application errors included.
    /// The response to the retried request is returned whatever its status.
    pub async fn request(&self, options: RequestOptions) -> Result<Response, ClientError> {
        let url = self.resolve(&options.url)?;

        let pair = match self.store.load().await? {
            Some(pair) => Some(pair),
            None => match self.missing_token {
                MissingTokenPolicy::FailFast => return Err(ClientError::NotAuthenticated),
                MissingTokenPolicy::PassThrough => None,
            },
        };

        let token = pair.as_ref().map(|p| p.access_token.as_str());
        let response = self.send(&url, &options, token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // Nothing to refresh when we never had credentials
        let Some(stale) = pair else {
            return Ok(response);
        };

        debug!(method = %options.method, url = %url, "access token rejected, refreshing");
        let access_token = self.renew(&stale, options.timeout).await?;
        self.send(&url, &options, Some(&access_token)).await
    }

    /// [`request`](Self::request) that gives up with `Cancelled` once `cancel` fires
    pub async fn request_with_cancel(
        &self,
        options: RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<Response, ClientError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            result = self.request(options) => result,
        }
    }

    /// Remove the stored credentials and cached profile
    pub async fn logout(&self) -> Result<(), ClientError> {
        let _guard = self.refresh_guard.lock().await;
        self.store.clear().await?;
        Ok(())
    }

    fn resolve(&self, target: &str) -> Result<Url, ClientError> {
        if let Ok(url) = Url::parse(target) {
            return Ok(url);
        }
        let joined = if target.starts_with('/') {
            format!("{}{target}", self.base_url)
        } else {
            format!("{}/{target}", self.base_url)
        };
        Url::parse(&joined)
            .map_err(|e| ClientError::Configuration(format!("invalid request URL {target}: {e}")))
    }

    async fn send(
        &self,
        url: &Url,
        options: &RequestOptions,
        access_token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let headers = options.outgoing_headers(access_token)?;
        let mut request = self
            .http
            .request(options.method.clone(), url.clone())
            .headers(headers);
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }
        Ok(request.send().await?)
    }

    /// Access token to retry with after `stale` was rejected.
    ///
    /// Only one caller exchanges the refresh token at a time. A caller that
    /// finds a different token in the store after taking the guard reuses it.
    async fn renew(
        &self,
        stale: &CredentialPair,
        timeout: Option<Duration>,
    ) -> Result<String, ClientError> {
        let _guard = self.refresh_guard.lock().await;

        let Some(current) = self.store.load().await? else {
            debug!("credentials were cleared while waiting to refresh");
            return Err(ClientError::SessionExpired);
        };

        if current.access_token != stale.access_token {
            debug!("access token already refreshed by another request");
            return Ok(current.access_token);
        }

        let Some(refresh_token) = current.refresh_token else {
            warn!("no refresh token stored, ending session");
            return Err(self.expire().await);
        };

        match self.exchange(&refresh_token, timeout).await? {
            Some(pair) => {
                self.store.save(&pair).await?;
                debug!("stored refreshed credentials");
                Ok(pair.access_token)
            }
            None => Err(self.expire().await),
        }
    }

    /// POST the refresh token. `Ok(None)` means the backend rejected it.
    async fn exchange(
        &self,
        refresh_token: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<CredentialPair>, ClientError> {
        let mut request = self
            .http
            .post(self.refresh_url.clone())
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            });
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "refresh token rejected");
            return Ok(None);
        }

        let tokens: TokenResponse = response.json().await?;
        let refresh_token = tokens
            .refresh_token
            .unwrap_or_else(|| refresh_token.to_string());
        Ok(Some(CredentialPair::new(tokens.access_token, refresh_token)))
    }

    /// Forced logout after a failed refresh
    async fn expire(&self) -> ClientError {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to clear credentials after session expiry");
        }
        self.on_expired.session_expired(&self.login_route);
        ClientError::SessionExpired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use carelink_core::{CoreError, CoreResult, MemoryCredentialStore, UserProfile};
    use mockall::mock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mock! {
        Store {}

        #[async_trait]
        impl CredentialStore for Store {
            async fn load(&self) -> CoreResult<Option<CredentialPair>>;
            async fn save(&self, pair: &CredentialPair) -> CoreResult<()>;
            async fn clear(&self) -> CoreResult<()>;
            async fn load_user(&self) -> CoreResult<Option<UserProfile>>;
            async fn save_user(&self, user: &UserProfile) -> CoreResult<()>;
        }
    }

    fn client(
        store: Arc<dyn CredentialStore>,
        policy: MissingTokenPolicy,
        on_expired: Arc<dyn SessionExpiredHandler>,
    ) -> AuthenticatedRequestClient {
        AuthenticatedRequestClient::new(
            Client::new(),
            "http://127.0.0.1:9".to_string(),
            "/api/users/refresh",
            "/login".to_string(),
            policy,
            store,
            on_expired,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn fail_fast_without_token_never_sends() {
        let mut store = MockStore::new();
        store.expect_load().times(1).returning(|| Ok(None));
        let client = client(
            Arc::new(store),
            MissingTokenPolicy::FailFast,
            Arc::new(LogSessionExpired),
        );

        let err = client
            .request(RequestOptions::get("/api/users/me"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_credentials_error() {
        let mut store = MockStore::new();
        store
            .expect_load()
            .returning(|| Err(CoreError::storage("disk unplugged")));
        let client = client(
            Arc::new(store),
            MissingTokenPolicy::FailFast,
            Arc::new(LogSessionExpired),
        );

        let err = client
            .request(RequestOptions::get("/api/users/me"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Credentials(_)));
    }

    #[tokio::test]
    async fn renew_reuses_token_refreshed_elsewhere() {
        let store = Arc::new(MemoryCredentialStore::with_pair(CredentialPair::new(
            "A2", "R2",
        )));
        let client = client(
            store,
            MissingTokenPolicy::FailFast,
            Arc::new(LogSessionExpired),
        );

        let token = client.renew(&CredentialPair::new("A1", "R1"), None).await.unwrap();
        assert_eq!(token, "A2");
    }

    #[tokio::test]
    async fn renew_after_logout_is_session_expired() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let client = client(
            Arc::new(MemoryCredentialStore::new()),
            MissingTokenPolicy::FailFast,
            Arc::new(move |_: &str| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let err = client.renew(&CredentialPair::new("A1", "R1"), None).await.unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired));
        // Whoever cleared the store already ran the hook
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_refresh_token_forces_logout() {
        let routes = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = routes.clone();
        let store = Arc::new(MemoryCredentialStore::with_pair(CredentialPair::access_only(
            "A1",
        )));
        let client = client(
            store.clone(),
            MissingTokenPolicy::FailFast,
            Arc::new(move |route: &str| seen.lock().unwrap().push(route.to_string())),
        );

        let err = client
            .renew(&CredentialPair::access_only("A1"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired));
        assert_eq!(store.load().await.unwrap(), None);
        assert_eq!(*routes.lock().unwrap(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn expire_still_notifies_when_clear_fails() {
        let mut store = MockStore::new();
        store
            .expect_clear()
            .times(1)
            .returning(|| Err(CoreError::io_error("read-only filesystem")));
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let client = client(
            Arc::new(store),
            MissingTokenPolicy::FailFast,
            Arc::new(move |_: &str| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let err = client.expire().await;
        assert!(matches!(err, ClientError::SessionExpired));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn resolves_relative_and_absolute_targets() {
        let client = client(
            Arc::new(MemoryCredentialStore::new()),
            MissingTokenPolicy::FailFast,
            Arc::new(LogSessionExpired),
        );
        assert_eq!(
            client.resolve("/api/users/me").unwrap().as_str(),
            "http://127.0.0.1:9/api/users/me"
        );
        assert_eq!(
            client.resolve("api/bookings/").unwrap().as_str(),
            "http://127.0.0.1:9/api/bookings/"
        );
        assert_eq!(
            client.resolve("https://other.example.com/x").unwrap().as_str(),
            "https://other.example.com/x"
        );
    }
}
