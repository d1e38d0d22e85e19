use crate::helpers::rejection_body;
use crate::middleware::authentication::*;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse},
    Error, HttpResponse,
};
use futures::future::{FutureExt, LocalBoxFuture};
use std::rc::Rc;

pub struct GatekeeperMiddleware<S> {
    pub(super) service: Rc<S>,
    pub(super) checks: Rc<Vec<method::CheckFn>>,
}

impl<S, B> Service<ServiceRequest> for GatekeeperMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let mut errors = Vec::with_capacity(self.checks.len());

        for check in self.checks.iter() {
            match check(&req) {
                Ok(()) => {
                    tracing::debug!(path = %req.path(), "inter-service request authorized");
                    return self
                        .service
                        .call(req)
                        .map(|res| res.map(ServiceResponse::map_into_left_body))
                        .boxed_local();
                }
                Err(err) => errors.push(err),
            }
        }

        tracing::warn!(path = %req.path(), errors = ?errors, "inter-service request rejected");
        let response = req
            .into_response(HttpResponse::Unauthorized().json(rejection_body(errors)))
            .map_into_right_body();

        async move { Ok(response) }.boxed_local()
    }
}
