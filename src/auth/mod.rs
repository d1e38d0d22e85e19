//! Shared-secret bearer tokens for inter-service calls.
//!
//! Tokens are HS256 JWTs carrying only `iat` and `exp`. They are minted per
//! outbound request and validated once per inbound request; nothing is cached.

pub mod error;
pub mod jwt;

pub use error::AuthError;
pub use jwt::{Claims, TokenCodec};
