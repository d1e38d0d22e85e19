#![allow(dead_code)]

use interservice::configuration::Settings;
use interservice::connectors::{InterServiceClient, ServiceIdentity, TokenConfig};
use std::net::TcpListener;
use wiremock::MockServer;

pub const SECRET: &str = "a shared secret for tests";

pub fn token_config() -> TokenConfig {
    TokenConfig::new(SECRET)
}

/// Client for a service named `name` served by `server`
pub fn isc_for(server: &MockServer, name: &str) -> InterServiceClient {
    let identity = ServiceIdentity::new(name, server.uri()).expect("Failed to build identity");
    InterServiceClient::new(identity, token_config()).expect("Failed to build client")
}

pub struct TestApp {
    pub address: String,
}

/// Start the server binary's app on a random port
pub async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let settings = Settings {
        app_host: "127.0.0.1".to_string(),
        app_port: port,
        environment: "testing".to_string(),
        deps_file: None,
        inter_service: token_config(),
    };

    let server = interservice::startup::run(listener, &settings)
        .await
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
    }
}
