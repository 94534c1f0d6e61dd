//! AI care summary

use carelink_core::{CareSummary, CareTipsRequest, CareTipsResponse};
use reqwest::Method;

use super::{CareClient, ClientError};

impl CareClient {
    /// Ask the backend for a care narrative and split it into sections
    pub async fn care_tips(&self, request: &CareTipsRequest) -> Result<CareSummary, ClientError> {
        let url = self.endpoint(&["api", "ai", "gemini-care-tips", ""])?;
        let req = self.public(Method::POST, url).json(request);
        let response: CareTipsResponse = self.execute(req).await?;
        Ok(CareSummary::from_tips(&response.tips))
    }
}
