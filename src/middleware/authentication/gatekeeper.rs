use crate::auth::TokenCodec;
use crate::helpers::ErrorMap;
use crate::middleware::authentication::*;

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

/// Middleware admitting only requests that pass at least one check.
///
/// Checks run in the order they were added. The first success hands the
/// request to the wrapped service untouched; if every check fails the request
/// is answered with `401 Unauthorized` and the collected error maps.
#[derive(Clone)]
pub struct Gatekeeper {
    checks: Vec<method::CheckFn>,
}

impl Gatekeeper {
    /// Gatekeeper validating inter-service bearer tokens
    pub fn new(codec: TokenCodec) -> Self {
        Self {
            checks: vec![method::jwt_check(codec)],
        }
    }

    /// Gatekeeper without any check; rejects everything until one is added
    pub fn empty() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&ServiceRequest) -> Result<(), ErrorMap> + Send + Sync + 'static,
    {
        self.checks.push(Arc::new(check));
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for Gatekeeper
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = GatekeeperMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GatekeeperMiddleware {
            service: Rc::new(service),
            checks: Rc::new(self.checks.clone()),
        }))
    }
}
