use super::CheckFn;
use crate::auth::{Claims, TokenCodec};
use crate::helpers::{error_map, ErrorMap};
use crate::middleware::authentication::extract_bearer_token;
use actix_web::{dev::ServiceRequest, HttpMessage};
use std::sync::Arc;

/// Accepts the request when it carries an `Authorization: Bearer` token
/// signed with the codec's secret and not yet expired.
///
/// On success the validated [`Claims`] are stored in the request extensions.
#[tracing::instrument(name = "check inter-service bearer token", skip_all)]
pub fn has_valid_jwt_bearer_token(
    req: &ServiceRequest,
    codec: &TokenCodec,
) -> Result<Claims, ErrorMap> {
    let token = extract_bearer_token(req.headers()).map_err(|err| {
        tracing::debug!("bearer token extraction failed: {}", err);
        error_map(err)
    })?;

    let claims = codec.validate(&token).map_err(|err| {
        tracing::debug!("bearer token validation failed: {}", err);
        error_map(err)
    })?;

    req.extensions_mut().insert(claims);
    Ok(claims)
}

pub fn jwt_check(codec: TokenCodec) -> CheckFn {
    Arc::new(move |req: &ServiceRequest| has_valid_jwt_bearer_token(req, &codec).map(|_| ()))
}
