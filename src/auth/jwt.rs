use crate::auth::AuthError;
use crate::connectors::config::{TokenConfig, JWT_SECRET_KEY_ENV};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an inter-service token. Only expiry is ever checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issued at, seconds since epoch
    pub iat: i64,
    /// Expires at, seconds since epoch
    pub exp: i64,
}

impl Claims {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Mints and validates HS256 bearer tokens with a single shared secret.
///
/// The configuration is read on every call, so a misconfigured expiry window
/// surfaces when a token is minted rather than when the codec is built.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    config: TokenConfig,
}

impl TokenCodec {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Mint a token valid from now for the configured window
    pub fn mint(&self) -> Result<String, AuthError> {
        self.mint_at(Utc::now())
    }

    pub fn mint_at(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        let key = self.secret()?;
        let window = self.config.expiry_window()?;
        let expires_at = now.checked_add_signed(window).ok_or_else(|| {
            AuthError::MisconfiguredExpiry(format!("expiry window {window} is out of range"))
        })?;

        let claims = Claims {
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key),
        )
        .map_err(|err| AuthError::Signing(err.to_string()))
    }

    /// Verify signature and expiry against the current time
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let key = self.secret()?;

        // exp is checked below against the caller's clock, without leeway
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(key),
            &validation,
        )?;

        if data.claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }

        Ok(data.claims)
    }

    // An empty HMAC key would sign and accept anything signed with ""
    fn secret(&self) -> Result<&[u8], AuthError> {
        if self.config.jwt_key.is_empty() {
            return Err(AuthError::MissingSecret(JWT_SECRET_KEY_ENV));
        }
        Ok(self.config.jwt_key.as_bytes())
    }
}
