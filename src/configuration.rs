use crate::connectors::config::{TokenConfig, JWT_SECRET_KEY_ENV};
use crate::connectors::client::InterServiceClient;
use crate::connectors::registry::{
    load_deps_from_yaml, setup_client, DepsConfig, Environment, RegistryError,
};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub app_host: String,
    pub app_port: u16,
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Explicit path to `deps.yaml`; searched for upwards from the working
    /// directory when unset
    #[serde(default)]
    pub deps_file: Option<String>,
    #[serde(default)]
    pub inter_service: TokenConfig,
}

fn default_environment() -> String {
    Environment::Staging.as_str().to_string()
}

impl Settings {
    pub fn environment(&self) -> Result<Environment, RegistryError> {
        self.environment.parse()
    }

    /// `deps_file` when set, otherwise the nearest `deps.yaml` above the working directory
    pub fn deps(&self) -> Result<DepsConfig, RegistryError> {
        match self.deps_file.as_deref() {
            Some(path) => load_deps_from_yaml(path),
            None => DepsConfig::load(),
        }
    }

    /// Client for the dependency `name` in the configured environment
    pub fn client_for(&self, name: &str) -> Result<InterServiceClient, RegistryError> {
        setup_client(
            &self.deps()?,
            self.environment()?,
            name,
            self.inter_service.clone(),
        )
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.app_host, self.app_port)
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // `configuration.yaml` first, then APP__INTER_SERVICE__JWT_KEY style overrides
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let mut config: Settings = settings.try_deserialize()?;

    // The legacy variables still win when present
    if let Ok(from_env) = TokenConfig::from_env() {
        config.inter_service.jwt_key = from_env.jwt_key;
        if from_env.token_expire_minutes.is_some() {
            config.inter_service.token_expire_minutes = from_env.token_expire_minutes;
        }
    }
    if config.inter_service.jwt_key.is_empty() {
        return Err(config::ConfigError::NotFound(JWT_SECRET_KEY_ENV.to_string()));
    }

    Ok(config)
}
