use crate::auth::AuthError;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Environment variable holding the shared JWT secret
pub const JWT_SECRET_KEY_ENV: &str = "JWT_KEY";

/// Environment variable holding the token lifetime in minutes
pub const TOKEN_EXPIRE_MINUTES_ENV: &str = "INTER_SERVICE_TOKEN_EXPIRE_MINUTES";

pub const DEFAULT_TOKEN_EXPIRE_MINUTES: i64 = 60;

/// Token settings shared by every service that calls, or is called by, another service.
///
/// The expiry window is kept as the raw configured value so that "not set"
/// (falls back to [`DEFAULT_TOKEN_EXPIRE_MINUTES`]) and "set to garbage"
/// (rejected when a token is minted) stay distinguishable.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Shared HMAC secret used to sign and verify tokens
    #[serde(default)]
    pub jwt_key: String,
    /// Token lifetime in minutes
    #[serde(default)]
    pub token_expire_minutes: Option<String>,
}

impl TokenConfig {
    pub fn new(jwt_key: impl Into<String>) -> Self {
        Self {
            jwt_key: jwt_key.into(),
            token_expire_minutes: None,
        }
    }

    pub fn with_expire_minutes(mut self, minutes: impl Into<String>) -> Self {
        self.token_expire_minutes = Some(minutes.into());
        self
    }

    /// Read `JWT_KEY` and `INTER_SERVICE_TOKEN_EXPIRE_MINUTES` from the process environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let jwt_key = std::env::var(JWT_SECRET_KEY_ENV)
            .map_err(|_| config::ConfigError::NotFound(JWT_SECRET_KEY_ENV.to_string()))?;
        let token_expire_minutes = std::env::var(TOKEN_EXPIRE_MINUTES_ENV).ok();

        Ok(Self {
            jwt_key,
            token_expire_minutes,
        })
    }

    /// Lifetime of a freshly minted token
    pub fn expiry_window(&self) -> Result<Duration, AuthError> {
        let raw = match self.token_expire_minutes.as_deref() {
            None => return Ok(Duration::minutes(DEFAULT_TOKEN_EXPIRE_MINUTES)),
            Some(raw) => raw,
        };

        let minutes = raw.trim().parse::<i64>().map_err(|err| {
            AuthError::MisconfiguredExpiry(format!("{TOKEN_EXPIRE_MINUTES_ENV}={raw:?}: {err}"))
        })?;
        if minutes <= 0 {
            return Err(AuthError::MisconfiguredExpiry(format!(
                "{TOKEN_EXPIRE_MINUTES_ENV} must be a positive number of minutes, got {minutes}"
            )));
        }

        Duration::try_minutes(minutes).ok_or_else(|| {
            AuthError::MisconfiguredExpiry(format!(
                "{TOKEN_EXPIRE_MINUTES_ENV}={minutes} is out of range"
            ))
        })
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("jwt_key", &"<redacted>")
            .field("token_expire_minutes", &self.token_expire_minutes)
            .finish()
    }
}
