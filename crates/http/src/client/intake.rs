//! Symptom intake submission

use carelink_core::IntakeSubmission;
use serde_json::Value;

use super::request::RequestOptions;
use super::{CareClient, ClientError};

impl CareClient {
    /// Submit a completed intake form, returning the stored record
    pub async fn submit_intake(&self, submission: &IntakeSubmission) -> Result<Value, ClientError> {
        let url = self.endpoint(&["api", "intake", ""])?;
        let options = RequestOptions::post(url).json(submission)?;
        let response = self.authorized(options).await?;
        Self::parse(response).await
    }
}
