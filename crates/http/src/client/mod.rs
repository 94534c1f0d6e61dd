//! carelink HTTP client

pub mod bookings;
pub mod care;
pub mod config;
pub mod error;
pub mod intake;
pub mod providers;
pub mod request;
pub mod session;
pub mod users;

use carelink_core::{CredentialStore, MemoryCredentialStore};
use config::{ClientConfig, MissingTokenPolicy};
use error::ClientError;
use request::RequestOptions;
use reqwest::{Client, ClientBuilder, Response};
use session::{AuthenticatedRequestClient, LogSessionExpired, SessionExpiredHandler};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const DEFAULT_USER_AGENT: &str = concat!("carelink/", env!("CARGO_PKG_VERSION"));

/// Typed client for the care scheduling backend
#[derive(Clone, Debug)]
pub struct CareClient {
    client: Client,
    base_url: Url,
    session: AuthenticatedRequestClient,
}

impl CareClient {
    /// Create a client with an in-memory credential store
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> CareClientBuilder {
        CareClientBuilder::default()
    }

    /// Builder preloaded from configuration
    pub fn from_config(config: &ClientConfig) -> CareClientBuilder {
        let mut builder = Self::builder()
            .base_url(&config.base_url)
            .user_agent(&config.user_agent)
            .login_route(&config.login_route)
            .refresh_path(&config.refresh_path)
            .missing_token(config.missing_token);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        builder
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.session.base_url()
    }

    /// The bearer-token request client underneath the typed methods
    pub fn session(&self) -> &AuthenticatedRequestClient {
        &self.session
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        self.session.store()
    }

    /// Absolute endpoint URL; each segment is percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Configuration("base_url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Create a request builder for endpoints that need no token
    pub fn public(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client.request(method, url)
    }

    /// Send through the refreshing request client
    pub async fn authorized(&self, options: RequestOptions) -> Result<Response, ClientError> {
        self.session.request(options).await
    }

    /// Execute a request and handle common errors
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        Self::parse(response).await
    }

    /// Decode a success body, or map the failure status to an error
    pub async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Pass a success response through, map anything else to an error
    pub async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::from_body(status, &body))
    }
}

/// Builder for CareClient
pub struct CareClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    login_route: String,
    refresh_path: String,
    missing_token: MissingTokenPolicy,
    store: Option<Arc<dyn CredentialStore>>,
    on_expired: Option<Arc<dyn SessionExpiredHandler>>,
}

impl Default for CareClientBuilder {
    fn default() -> Self {
        let defaults = ClientConfig::default();
        Self {
            base_url: None,
            timeout: None,
            user_agent: None,
            login_route: defaults.login_route,
            refresh_path: defaults.refresh_path,
            missing_token: defaults.missing_token,
            store: None,
            on_expired: None,
        }
    }
}

impl CareClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the client-wide request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Route passed to the session-expired hook
    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    pub fn missing_token(mut self, policy: MissingTokenPolicy) -> Self {
        self.missing_token = policy;
        self
    }

    /// Where tokens and the user profile live; defaults to memory
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn on_session_expired(mut self, handler: Arc<dyn SessionExpiredHandler>) -> Self {
        self.on_expired = Some(handler);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<CareClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url: {e}")))?;

        let mut client_builder = ClientBuilder::new();
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        client_builder =
            client_builder.user_agent(self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT));
        let client = client_builder.build()?;

        let store: Arc<dyn CredentialStore> = match self.store {
            Some(store) => store,
            None => Arc::new(MemoryCredentialStore::new()),
        };
        let on_expired: Arc<dyn SessionExpiredHandler> = match self.on_expired {
            Some(handler) => handler,
            None => Arc::new(LogSessionExpired),
        };

        let session = AuthenticatedRequestClient::new(
            client.clone(),
            base_url,
            &self.refresh_path,
            self.login_route,
            self.missing_token,
            store,
            on_expired,
        )?;

        Ok(CareClient {
            client,
            base_url: parsed,
            session,
        })
    }
}
