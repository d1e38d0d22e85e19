//! Onboarding service connector
//!
//! `OnboardingConnector` is the seam business code depends on;
//! `OnboardingClient` implements it over an [`InterServiceClient`]. The
//! `provisioning` and `roles` modules hold acceptance-test helpers that create
//! and tear down a well-known test user.
//!
//! [`InterServiceClient`]: crate::connectors::InterServiceClient

use crate::connectors::errors::ConnectorError;
use async_trait::async_trait;

pub mod client;
pub mod provisioning;
pub mod roles;
pub mod types;

pub use client::OnboardingClient;
pub use provisioning::TestUserProvisioner;
pub use types::{AuthCredentialResponse, BioData, OtpResponse, Role, UserProfile, UserResponse};

#[async_trait]
pub trait OnboardingConnector: Send + Sync {
    /// Register a user, returning the profile the onboarding service created
    async fn register_user(
        &self,
        payload: &serde_json::Value,
    ) -> Result<UserProfile, ConnectorError>;
}
