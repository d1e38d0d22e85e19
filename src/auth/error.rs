use jsonwebtoken::errors::ErrorKind;

/// Failures while extracting or validating a bearer token, or while minting one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The credential header is absent or empty
    #[error("expected an `{header}` request header")]
    MissingHeader { header: String },

    /// The credential header does not start with the expected prefix
    #[error("the `{header}` header contents should start with `{prefix}`")]
    WrongPrefix { header: String, prefix: String },

    /// The token could not be parsed
    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("signature is invalid")]
    InvalidSignature,

    #[error("token is expired")]
    Expired,

    /// The expiry window is set but is not a positive number of minutes
    #[error("misconfigured ENV: {0}")]
    MisconfiguredExpiry(String),

    /// No signing secret was configured
    #[error("misconfigured ENV: {0} must not be empty")]
    MissingSecret(&'static str),

    #[error("failed to create token with err: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed(err.to_string()),
        }
    }
}
