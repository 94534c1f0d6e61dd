//! Account and session methods

use carelink_core::{CredentialPair, LoginRequest, RegisterRequest, TokenResponse, UserProfile};
use reqwest::Method;
use tracing::{info, warn};

use super::request::RequestOptions;
use super::{CareClient, ClientError};

impl CareClient {
    /// Create an account. A `400` naming the email becomes [`ClientError::EmailInUse`].
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserProfile, ClientError> {
        let url = self.endpoint(&["api", "users", "register"])?;
        let req = self.public(Method::POST, url).json(request);
        match self.execute(req).await {
            Err(ClientError::BadRequest(detail)) if detail.to_lowercase().contains("email") => {
                Err(ClientError::EmailInUse(detail))
            }
            other => other,
        }
    }

    /// Authenticate, store the token pair, then fetch and cache the profile.
    ///
    /// When the profile cannot be fetched the fresh tokens are discarded again.
    pub async fn login(&self, request: &LoginRequest) -> Result<UserProfile, ClientError> {
        let url = self.endpoint(&["api", "users", "login"])?;
        let req = self.public(Method::POST, url).json(request);
        let tokens: TokenResponse = self.execute(req).await?;

        let pair = match tokens.refresh_token {
            Some(refresh_token) => CredentialPair::new(tokens.access_token, refresh_token),
            None => {
                warn!("login returned no refresh token, session cannot be renewed");
                CredentialPair::access_only(tokens.access_token)
            }
        };
        self.store().save(&pair).await?;

        let user = match self.me().await {
            Ok(user) => user,
            Err(e) => {
                self.store().clear().await?;
                return Err(e);
            }
        };
        self.store().save_user(&user).await?;
        info!(user_id = %user.id, "logged in");
        Ok(user)
    }

    /// Forget tokens and the cached profile. Nothing is sent to the backend.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.session().logout().await?;
        info!("logged out");
        Ok(())
    }

    /// Current profile from the backend
    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        let url = self.endpoint(&["api", "users", "me"])?;
        let response = self.authorized(RequestOptions::get(url)).await?;
        Self::parse(response).await
    }

    /// Profile cached at login, without a network call
    pub async fn current_user(&self) -> Result<Option<UserProfile>, ClientError> {
        Ok(self.store().load_user().await?)
    }
}
