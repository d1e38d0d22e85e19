use super::{OnboardingConnector, UserProfile};
use crate::connectors::client::{expect_status, InterServiceClient};
use crate::connectors::errors::ConnectorError;
use async_trait::async_trait;
use reqwest::StatusCode;

pub const REGISTER_USER_ENDPOINT: &str = "internal/register_user";

/// HTTP-based onboarding service client
#[derive(Debug, Clone)]
pub struct OnboardingClient {
    isc: InterServiceClient,
}

impl OnboardingClient {
    pub fn new(isc: InterServiceClient) -> Self {
        Self { isc }
    }

    pub fn isc(&self) -> &InterServiceClient {
        &self.isc
    }
}

#[async_trait]
impl OnboardingConnector for OnboardingClient {
    #[tracing::instrument(name = "onboarding register user", skip_all)]
    async fn register_user(
        &self,
        payload: &serde_json::Value,
    ) -> Result<UserProfile, ConnectorError> {
        let resp = self.isc.post(REGISTER_USER_ENDPOINT, payload).await?;
        let text = expect_status(resp, StatusCode::OK, "register user failed").await?;

        serde_json::from_str::<UserProfile>(&text).map_err(|err| {
            tracing::error!("register user response could not be parsed: {}", err);
            ConnectorError::InvalidResponse(text)
        })
    }
}
