use interservice::configuration::get_configuration;
use interservice::startup::run;
use interservice::telemetry::{get_subscriber, init_subscriber};
use std::net::TcpListener;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("interservice".into(), "info".into());
    init_subscriber(subscriber);

    let settings = get_configuration()?;
    let address = settings.address();
    let environment = settings.environment()?;

    tracing::info!(
        environment = %environment,
        token = ?settings.inter_service,
        "Start server at {:?}",
        &address
    );
    let listener = TcpListener::bind(&address)
        .map_err(|err| anyhow::anyhow!("failed to bind to {}: {}", address, err))?;

    run(listener, &settings).await?.await?;
    Ok(())
}
