use crate::auth::TokenCodec;
use crate::connectors::config::TokenConfig;
use crate::connectors::errors::ConnectorError;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::Instrument;

/// Upper bound for a single inter-service call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A downstream service: its name and the root URL every path is appended to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    name: String,
    root_domain: String,
}

impl ServiceIdentity {
    pub fn new(
        name: impl Into<String>,
        root_domain: impl Into<String>,
    ) -> Result<Self, ConnectorError> {
        let name = name.into();
        let root_domain = root_domain.into();
        if root_domain.trim().is_empty() {
            return Err(ConnectorError::InvalidInput(format!(
                "service `{name}` has an empty root domain"
            )));
        }

        Ok(Self { name, root_domain })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }
}

/// HTTP client for service-to-service calls.
///
/// Holds no token state: every request mints its own bearer token, so one
/// client can be shared freely between tasks.
#[derive(Debug, Clone)]
pub struct InterServiceClient {
    identity: ServiceIdentity,
    codec: TokenCodec,
    http_client: reqwest::Client,
}

impl InterServiceClient {
    pub fn new(identity: ServiceIdentity, config: TokenConfig) -> Result<Self, ConnectorError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ConnectorError::Client)?;

        Ok(Self {
            identity,
            codec: TokenCodec::new(config),
            http_client,
        })
    }

    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// `{root_domain}/{path}`
    pub fn request_url(&self, path: &str) -> String {
        format!("{}/{}", self.identity.root_domain, path)
    }

    pub fn create_auth_token(&self) -> Result<String, ConnectorError> {
        Ok(self.codec.mint()?)
    }

    /// `Bearer <fresh token>`, for tests that build requests by hand
    pub fn bearer_header(&self) -> Result<String, ConnectorError> {
        Ok(format!("Bearer {}", self.create_auth_token()?))
    }

    /// Headers an inter-service call carries, with a freshly minted token
    pub fn default_headers(&self) -> Result<HeaderMap, ConnectorError> {
        let mut headers = HeaderMap::new();
        let authorization = HeaderValue::from_str(&self.bearer_header()?)
            .map_err(|err| ConnectorError::InvalidInput(format!("invalid bearer header: {err}")))?;

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, authorization);
        Ok(headers)
    }

    /// Send an authenticated request and hand back the raw response.
    ///
    /// The status code is not interpreted. `body` is JSON-encoded for every
    /// method except GET, which never carries a body.
    pub async fn make_request<T>(
        &self,
        method: Method,
        path: &str,
        body: &T,
    ) -> Result<Response, ConnectorError>
    where
        T: Serialize + ?Sized,
    {
        let url = self.request_url(path);
        let span = tracing::info_span!(
            "inter_service_request",
            service = %self.identity.name,
            method = %method,
            url = %url
        );

        async move {
            let token = self.create_auth_token()?;

            let mut req = self
                .http_client
                .request(method.clone(), &url)
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .header(ACCEPT, "application/json")
                .header(CONTENT_TYPE, "application/json");

            // Some servers reject a GET carrying even `{}` as malformed
            if method != Method::GET {
                let encoded = serde_json::to_vec(body).map_err(ConnectorError::Encoding)?;
                tracing::debug!(
                    payload = %String::from_utf8_lossy(&encoded),
                    "inter-service request payload"
                );
                req = req.body(encoded);
            }

            req.send().await.map_err(|err| {
                tracing::error!("inter-service request to {} failed: {:?}", url, err);
                ConnectorError::Transport { url, source: err }
            })
        }
        .instrument(span)
        .await
    }

    pub async fn get(&self, path: &str) -> Result<Response, ConnectorError> {
        self.make_request(Method::GET, path, &()).await
    }

    pub async fn post<T>(&self, path: &str, body: &T) -> Result<Response, ConnectorError>
    where
        T: Serialize + ?Sized,
    {
        self.make_request(Method::POST, path, body).await
    }
}

/// Read the body of `resp`, failing with [`ConnectorError::UnexpectedStatus`]
/// when the status is not `expected`.
pub async fn expect_status(
    resp: Response,
    expected: StatusCode,
    context: &str,
) -> Result<String, ConnectorError> {
    let status = resp.status();
    let body = resp.text().await.map_err(|err| {
        ConnectorError::InvalidResponse(format!("{context}: unable to read response body: {err}"))
    })?;

    if status != expected {
        tracing::debug!(%status, %body, "{}", context);
        return Err(ConnectorError::UnexpectedStatus {
            context: context.to_string(),
            status,
            body,
        });
    }
    Ok(body)
}
