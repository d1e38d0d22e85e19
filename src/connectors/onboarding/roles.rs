//! Role management calls made with the test user's own ID token rather than
//! an inter-service token.

use super::{Role, UserResponse};
use crate::connectors::client::expect_status;
use crate::connectors::errors::ConnectorError;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;

pub const CREATE_ROLE_ENDPOINT: &str = "roles/create_role";
pub const ASSIGN_ROLE_ENDPOINT: &str = "roles/assign_role";
pub const REMOVE_ROLE_ENDPOINT: &str = "roles/remove_role";

#[derive(Serialize)]
struct CreateRolePayload<'a> {
    name: &'a str,
    description: &'a str,
    scopes: &'a [String],
}

#[derive(Serialize)]
struct AssignRolePayload<'a> {
    #[serde(rename = "userID")]
    user_id: &'a str,
    #[serde(rename = "roleID")]
    role_id: &'a str,
}

#[derive(Serialize)]
struct RemoveRolePayload<'a> {
    name: &'a str,
}

async fn post_as_user<T: Serialize + ?Sized>(
    http_client: &reqwest::Client,
    user: &UserResponse,
    root_domain: &str,
    path: &str,
    payload: &T,
) -> Result<reqwest::Response, ConnectorError> {
    let id_token = user.auth.id_token.as_deref().ok_or_else(|| {
        ConnectorError::InvalidInput("test user has no ID token".to_string())
    })?;
    let url = format!("{}/{}", root_domain, path);

    http_client
        .post(&url)
        .header(ACCEPT, "application/json")
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {}", id_token))
        .json(payload)
        .send()
        .await
        .map_err(|source| ConnectorError::Transport { url, source })
}

#[tracing::instrument(name = "create test role", skip(http_client, user, scopes))]
pub async fn create_test_role(
    http_client: &reqwest::Client,
    user: &UserResponse,
    root_domain: &str,
    role_name: &str,
    scopes: &[String],
) -> Result<Role, ConnectorError> {
    let payload = CreateRolePayload {
        name: role_name,
        description: "A role for running tests",
        scopes,
    };

    let resp = post_as_user(http_client, user, root_domain, CREATE_ROLE_ENDPOINT, &payload).await?;
    let body = expect_status(resp, StatusCode::CREATED, "failed to create test role").await?;

    serde_json::from_str::<Role>(&body)
        .map_err(|err| ConnectorError::InvalidResponse(format!("unable to unmarshal role: {err}")))
}

#[tracing::instrument(name = "assign test role", skip(http_client, user))]
pub async fn assign_test_role(
    http_client: &reqwest::Client,
    user: &UserResponse,
    root_domain: &str,
    user_id: &str,
    role_id: &str,
) -> Result<(), ConnectorError> {
    let payload = AssignRolePayload { user_id, role_id };

    let resp = post_as_user(http_client, user, root_domain, ASSIGN_ROLE_ENDPOINT, &payload).await?;
    expect_status(resp, StatusCode::OK, "failed to assign test role").await?;
    Ok(())
}

#[tracing::instrument(name = "remove test role", skip(http_client, user))]
pub async fn remove_test_role(
    http_client: &reqwest::Client,
    user: &UserResponse,
    root_domain: &str,
    role_name: &str,
) -> Result<(), ConnectorError> {
    let payload = RemoveRolePayload { name: role_name };

    let resp = post_as_user(http_client, user, root_domain, REMOVE_ROLE_ENDPOINT, &payload).await?;
    expect_status(resp, StatusCode::OK, "failed to remove test role").await?;
    Ok(())
}
