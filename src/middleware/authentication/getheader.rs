use crate::auth::AuthError;
use actix_web::http::header::HeaderMap;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer";

/// Pull a token out of `header_name`, stripping `prefix` and surrounding whitespace.
///
/// The prefix match is exact and case-sensitive.
pub fn extract_token(headers: &HeaderMap, header_name: &str, prefix: &str) -> Result<String, AuthError> {
    let missing = || AuthError::MissingHeader {
        header: header_name.to_string(),
    };

    let value = headers.get(header_name).ok_or_else(missing)?;
    if value.is_empty() {
        return Err(missing());
    }

    // a value that is not visible ASCII cannot start with the prefix
    let value = value.to_str().map_err(|_| AuthError::WrongPrefix {
        header: header_name.to_string(),
        prefix: prefix.to_string(),
    })?;

    value
        .strip_prefix(prefix)
        .map(|token| token.trim().to_string())
        .ok_or_else(|| AuthError::WrongPrefix {
            header: header_name.to_string(),
            prefix: prefix.to_string(),
        })
}

/// `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    extract_token(headers, AUTHORIZATION_HEADER, BEARER_PREFIX)
}
