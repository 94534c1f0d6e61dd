//! Provider lookup methods

use carelink_core::{Provider, ProviderMatchQuery};
use reqwest::Method;
use tracing::debug;

use super::{CareClient, ClientError};

impl CareClient {
    /// Providers ranked by the backend for the given symptoms and filters
    pub async fn match_providers(
        &self,
        query: &ProviderMatchQuery,
    ) -> Result<Vec<Provider>, ClientError> {
        let mut url = self.endpoint(&["api", "providers", "match", ""])?;
        url.query_pairs_mut().extend_pairs(query.to_pairs());
        debug!(url = %url, "matching providers");
        self.execute(self.public(Method::GET, url)).await
    }

    /// Every provider the backend knows about
    pub async fn list_providers(&self) -> Result<Vec<Provider>, ClientError> {
        let url = self.endpoint(&["api", "providers", ""])?;
        self.execute(self.public(Method::GET, url)).await
    }

    pub async fn provider(&self, id: &str) -> Result<Provider, ClientError> {
        let url = self.endpoint(&["api", "providers", id])?;
        self.execute(self.public(Method::GET, url)).await
    }
}
