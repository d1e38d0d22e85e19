use crate::auth::Claims;
use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Pong {
    message: &'static str,
    issued_at: i64,
    expires_at: i64,
}

/// Answers callers that got past the gatekeeper with their token's claims
#[tracing::instrument(name = "Inter-service ping.")]
#[get("/ping")]
pub async fn ping_handler(claims: web::ReqData<Claims>) -> impl Responder {
    let claims = claims.into_inner();

    HttpResponse::Ok().json(Pong {
        message: "pong",
        issued_at: claims.iat,
        expires_at: claims.exp,
    })
}
