//! Creates, logs in and tears down the well-known acceptance-test user.
//!
//! Everything here talks to the onboarding service's `testing/*` endpoints,
//! which only exist in non-production deployments.

use super::roles::{assign_test_role, create_test_role, remove_test_role};
use super::{OtpResponse, UserResponse};
use crate::connectors::client::{expect_status, InterServiceClient};
use crate::connectors::errors::ConnectorError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;

pub const TEST_USER_PHONE_NUMBER: &str = "+254711223344";
pub const TEST_USER_PHONE_NUMBER_WITH_PIN: &str = "+254778990088";
pub const TEST_USER_PIN: &str = "1234";
pub const TEST_ROLE_NAME: &str = "Test Role";
pub const CONSUMER_FLAVOUR: &str = "CONSUMER";

/// Error code the onboarding service reports for an already registered phone
pub const PHONE_NUMBER_IN_USE_CODE: i64 = 2;

pub const VERIFY_PHONE_ENDPOINT: &str = "testing/verify_phone";
pub const CREATE_USER_BY_PHONE_ENDPOINT: &str = "testing/create_user_by_phone";
pub const LOGIN_BY_PHONE_ENDPOINT: &str = "testing/login_by_phone";
pub const REMOVE_USER_BY_PHONE_ENDPOINT: &str = "testing/remove_user";
pub const UPDATE_BIO_DATA_ENDPOINT: &str = "testing/update_user_profile";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PhonePayload<'a> {
    phone_number: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginPayload<'a> {
    phone_number: &'a str,
    pin: &'a str,
    flavour: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserPayload<'a> {
    phone_number: &'a str,
    pin: &'a str,
    flavour: &'a str,
    otp: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BioDataPayload<'a> {
    uid: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    gender: &'a str,
    date_of_birth: &'a str,
}

fn parse_user_response(body: &str) -> Result<UserResponse, ConnectorError> {
    serde_json::from_str(body).map_err(|err| {
        ConnectorError::InvalidResponse(format!("failed to unmarshal user response: {err}"))
    })
}

/// True when the onboarding service refused a phone number because a user
/// already owns it.
pub fn is_phone_number_in_use(err: &ConnectorError) -> bool {
    let ConnectorError::UnexpectedStatus { body, .. } = err else {
        return false;
    };

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return false;
    };

    match value.get("code") {
        Some(serde_json::Value::Number(code)) => code.as_i64() == Some(PHONE_NUMBER_IN_USE_CODE),
        Some(serde_json::Value::String(code)) => {
            code.trim().parse::<i64>().ok() == Some(PHONE_NUMBER_IN_USE_CODE)
        }
        _ => false,
    }
}

/// Provisions the test user against an onboarding service.
///
/// Inter-service calls go through `onboarding`; role calls are made with the
/// test user's own ID token over `http_client`.
#[derive(Debug, Clone)]
pub struct TestUserProvisioner {
    onboarding: InterServiceClient,
    http_client: reqwest::Client,
    scopes: Vec<String>,
}

impl TestUserProvisioner {
    /// `scopes` are the permissions the test role must carry
    pub fn new(onboarding: InterServiceClient, scopes: Vec<String>) -> Self {
        Self {
            onboarding,
            http_client: reqwest::Client::new(),
            scopes,
        }
    }

    pub fn onboarding(&self) -> &InterServiceClient {
        &self.onboarding
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Request an OTP for `phone`. Fails when the number is already taken.
    #[tracing::instrument(name = "verify test phone number", skip(self))]
    pub async fn verify_test_phone_number(&self, phone: &str) -> Result<String, ConnectorError> {
        let payload = PhonePayload {
            phone_number: phone,
        };
        let resp = self.onboarding.post(VERIFY_PHONE_ENDPOINT, &payload).await?;
        let body = expect_status(resp, StatusCode::OK, "unable to verify phone number").await?;

        let otp: OtpResponse = serde_json::from_str(&body).map_err(|err| {
            ConnectorError::InvalidResponse(format!("failed to unmarshal OTP: {err}"))
        })?;
        Ok(otp.otp)
    }

    #[tracing::instrument(name = "login test phone user", skip(self, pin))]
    pub async fn login_test_phone_user(
        &self,
        phone: &str,
        pin: &str,
        flavour: &str,
    ) -> Result<UserResponse, ConnectorError> {
        let payload = LoginPayload {
            phone_number: phone,
            pin,
            flavour,
        };
        let resp = self.onboarding.post(LOGIN_BY_PHONE_ENDPOINT, &payload).await?;
        let body = expect_status(resp, StatusCode::OK, &format!("unable to login: {phone}")).await?;

        parse_user_response(&body)
    }

    #[tracing::instrument(name = "update test user bio data", skip(self))]
    pub async fn update_bio_data(&self, uid: &str) -> Result<(), ConnectorError> {
        let payload = BioDataPayload {
            uid,
            first_name: "Dumbledore 'the'",
            last_name: "Greatest Test User",
            gender: "male",
            date_of_birth: "2000-01-01",
        };
        let resp = self.onboarding.post(UPDATE_BIO_DATA_ENDPOINT, &payload).await?;
        expect_status(resp, StatusCode::OK, "unable to update user profile").await?;
        Ok(())
    }

    /// Sign the test user up with an OTP from [`Self::verify_test_phone_number`]
    #[tracing::instrument(name = "create test phone number user", skip_all)]
    pub async fn create_test_phone_number_user(
        &self,
        otp: &str,
    ) -> Result<UserResponse, ConnectorError> {
        let payload = CreateUserPayload {
            phone_number: TEST_USER_PHONE_NUMBER,
            pin: TEST_USER_PIN,
            flavour: CONSUMER_FLAVOUR,
            otp,
        };
        let resp = self
            .onboarding
            .post(CREATE_USER_BY_PHONE_ENDPOINT, &payload)
            .await?;
        let context = format!("unable to sign up: {TEST_USER_PHONE_NUMBER}");
        let body = expect_status(resp, StatusCode::CREATED, &context).await?;

        let user = parse_user_response(&body)?;
        self.ensure_bio_data(&user).await?;
        Ok(user)
    }

    /// Create the test user, or log in when it already exists
    #[tracing::instrument(name = "create or login test phone number user", skip(self))]
    pub async fn create_or_login_test_phone_number_user(
        &self,
    ) -> Result<UserResponse, ConnectorError> {
        match self.verify_test_phone_number(TEST_USER_PHONE_NUMBER).await {
            Ok(otp) => self.create_test_phone_number_user(&otp).await,
            Err(err) if is_phone_number_in_use(&err) => {
                tracing::debug!("test user exists, logging in");
                let user = self
                    .login_test_phone_user(TEST_USER_PHONE_NUMBER, TEST_USER_PIN, CONSUMER_FLAVOUR)
                    .await?;
                self.ensure_bio_data(&user).await?;
                Ok(user)
            }
            Err(err) => Err(err),
        }
    }

    /// Like [`Self::create_or_login_test_phone_number_user`], then make sure
    /// the user holds the test role with every expected scope.
    #[tracing::instrument(name = "create or login test authorized user", skip(self))]
    pub async fn create_or_login_test_authorized_user(
        &self,
    ) -> Result<UserResponse, ConnectorError> {
        let user = self.create_or_login_test_phone_number_user().await?;
        if user.auth.scopes.len() == self.scopes.len() {
            return Ok(user);
        }

        let root_domain = self.onboarding.identity().root_domain();
        if !user.auth.scopes.is_empty() {
            remove_test_role(&self.http_client, &user, root_domain, TEST_ROLE_NAME).await?;
        }
        let role = create_test_role(
            &self.http_client,
            &user,
            root_domain,
            TEST_ROLE_NAME,
            &self.scopes,
        )
        .await?;
        assign_test_role(
            &self.http_client,
            &user,
            root_domain,
            &user.profile.id,
            &role.id,
        )
        .await?;

        Ok(user)
    }

    /// Delete the test user. A user that is already gone is not an error.
    #[tracing::instrument(name = "remove test phone number user", skip(self))]
    pub async fn remove_test_phone_number_user(&self) -> Result<(), ConnectorError> {
        let payload = PhonePayload {
            phone_number: TEST_USER_PHONE_NUMBER,
        };
        let resp = self
            .onboarding
            .post(REMOVE_USER_BY_PHONE_ENDPOINT, &payload)
            .await?;

        if resp.status() != StatusCode::OK {
            tracing::debug!(status = %resp.status(), "test user was not removed");
        }
        Ok(())
    }

    /// Best-effort teardown of the test role and user
    #[tracing::instrument(name = "remove test authorized user", skip(self))]
    pub async fn remove_test_authorized_user(&self) -> Result<(), ConnectorError> {
        let user = match self
            .login_test_phone_user(TEST_USER_PHONE_NUMBER, TEST_USER_PIN, CONSUMER_FLAVOUR)
            .await
        {
            Ok(user) => user,
            Err(err) => {
                tracing::debug!("test user not found: {}", err);
                return Ok(());
            }
        };

        let root_domain = self.onboarding.identity().root_domain();
        if let Err(err) = remove_test_role(&self.http_client, &user, root_domain, TEST_ROLE_NAME).await {
            tracing::debug!("test role not removed: {}", err);
            return Ok(());
        }

        self.remove_test_phone_number_user().await
    }

    /// `Bearer <id token>` of the test user
    pub async fn bearer_token_header(&self) -> Result<String, ConnectorError> {
        let user = self.create_or_login_test_phone_number_user().await?;
        let id_token = user.auth.id_token.ok_or_else(|| {
            ConnectorError::InvalidResponse("test user has no ID token".to_string())
        })?;
        Ok(format!("Bearer {}", id_token))
    }

    /// Headers for GraphQL acceptance tests run as the test user
    pub async fn graphql_headers(&self) -> Result<HeaderMap, ConnectorError> {
        let authorization = self.bearer_token_header().await?;
        let authorization = HeaderValue::from_str(&authorization)
            .map_err(|err| ConnectorError::InvalidInput(format!("invalid bearer header: {err}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, authorization);
        Ok(headers)
    }

    async fn ensure_bio_data(&self, user: &UserResponse) -> Result<(), ConnectorError> {
        if user.profile.user_bio_data.first_name.is_none() {
            self.update_bio_data(&user.auth.uid).await?;
        }
        Ok(())
    }
}
