use crate::auth::TokenCodec;
use crate::configuration::Settings;
use crate::middleware::Gatekeeper;
use crate::routes;
use actix_web::{dev::Server, web, App, HttpServer};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub async fn run(listener: TcpListener, settings: &Settings) -> Result<Server, std::io::Error> {
    let codec = TokenCodec::new(settings.inter_service.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .service(web::scope("/health_check").service(routes::health_check))
            .service(
                web::scope("/internal")
                    .wrap(Gatekeeper::new(codec.clone()))
                    .service(routes::ping_handler),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
