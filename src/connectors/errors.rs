use crate::auth::AuthError;
use reqwest::StatusCode;

/// Errors that can occur while calling another service
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// A bearer token could not be minted for the call
    #[error("unable to create auth token: {0}")]
    Token(#[from] AuthError),

    /// The request body could not be serialized
    #[error("unable to encode request body: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Network failure or timeout
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unable to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The service answered, but not with the status the caller expected
    #[error("{context}, with status code {status}")]
    UnexpectedStatus {
        context: String,
        status: StatusCode,
        body: String,
    },

    /// The service answered with a body that could not be understood
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Arguments rejected before any request was made
    #[error("{0}")]
    InvalidInput(String),
}

impl ConnectorError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }
}
